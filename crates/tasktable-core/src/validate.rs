use std::collections::BTreeMap;

use crate::datetime::parse_iso_date;
use crate::task::{
  Status,
  TaskField
};

pub const DESCRIPTION_REQUIRED: &str =
  "description required";
pub const STATUS_REQUIRED: &str =
  "status required";
pub const STATUS_UNKNOWN: &str =
  "unknown status";
pub const DEADLINE_REQUIRED: &str =
  "deadline required";
pub const DEADLINE_MALFORMED: &str =
  "deadline must be a YYYY-MM-DD date";

/// One message per offending field. Empty
/// means the candidate is valid.
pub type FieldErrors =
  BTreeMap<TaskField, String>;

/// Raw add-form values, exactly as typed.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
)]
pub struct TaskDraft {
  pub description: String,
  pub status:      String,
  pub deadline:    String
}

impl TaskDraft {
  pub fn new(
    description: impl Into<String>,
    status: impl Into<String>,
    deadline: impl Into<String>
  ) -> Self {
    Self {
      description: description.into(),
      status:      status.into(),
      deadline:    deadline.into()
    }
  }

  pub fn get(
    &self,
    field: TaskField
  ) -> &str {
    match field {
      | TaskField::Description => {
        &self.description
      }
      | TaskField::Status => &self.status,
      | TaskField::Deadline => {
        &self.deadline
      }
    }
  }

  pub fn set(
    &mut self,
    field: TaskField,
    value: impl Into<String>
  ) {
    let value = value.into();
    match field {
      | TaskField::Description => {
        self.description = value;
      }
      | TaskField::Status => {
        self.status = value;
      }
      | TaskField::Deadline => {
        self.deadline = value;
      }
    }
  }
}

#[tracing::instrument(skip(candidate))]
pub fn validate(
  candidate: &TaskDraft
) -> FieldErrors {
  let mut errors = FieldErrors::new();

  if candidate
    .description
    .trim()
    .is_empty()
  {
    errors.insert(
      TaskField::Description,
      DESCRIPTION_REQUIRED.to_string()
    );
  }

  let status = candidate.status.trim();
  if status.is_empty() {
    errors.insert(
      TaskField::Status,
      STATUS_REQUIRED.to_string()
    );
  } else if status
    .parse::<Status>()
    .is_err()
  {
    errors.insert(
      TaskField::Status,
      STATUS_UNKNOWN.to_string()
    );
  }

  let deadline =
    candidate.deadline.trim();
  if deadline.is_empty() {
    errors.insert(
      TaskField::Deadline,
      DEADLINE_REQUIRED.to_string()
    );
  } else if parse_iso_date(deadline)
    .is_err()
  {
    errors.insert(
      TaskField::Deadline,
      DEADLINE_MALFORMED.to_string()
    );
  }

  tracing::debug!(
    errors = errors.len(),
    "validated task draft"
  );
  errors
}
