use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::task::{
  Status,
  Task
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum FilterMode {
  #[default]
  All,
  Active,
  Completed
}

impl FilterMode {
  pub const ALL: [FilterMode; 3] = [
    FilterMode::All,
    FilterMode::Active,
    FilterMode::Completed
  ];

  #[must_use]
  pub fn matches(
    self,
    status: Status
  ) -> bool {
    match self {
      | FilterMode::All => true,
      | FilterMode::Active => {
        status == Status::Active
      }
      | FilterMode::Completed => {
        matches!(
          status,
          Status::Done | Status::Canceled
        )
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | FilterMode::All => "all",
      | FilterMode::Active => "active",
      | FilterMode::Completed => {
        "completed"
      }
    }
  }
}

impl fmt::Display for FilterMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FilterMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(FilterMode::All),
      | "active" => {
        Ok(FilterMode::Active)
      }
      | "completed" | "done" => {
        Ok(FilterMode::Completed)
      }
      | other => {
        Err(anyhow!(
          "unknown filter mode: {other}"
        ))
      }
    }
  }
}

/// Tasks shown under `mode`, in their
/// original relative order.
#[must_use]
pub fn visible(
  tasks: &[Task],
  mode: FilterMode
) -> Vec<&Task> {
  tasks
    .iter()
    .filter(|task| {
      mode.matches(task.status)
    })
    .collect()
}
