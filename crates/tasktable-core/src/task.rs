use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datetime::iso_date_serde;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "Активная задача")]
    Active,
    #[serde(alias = "Задача выполнена")]
    Done,
    #[serde(alias = "cancelled", alias = "Задача отменена")]
    Canceled,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Done, Status::Canceled];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Done => "done",
            Status::Canceled => "canceled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Done => "Done",
            Status::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "active" | "активная задача" => Ok(Status::Active),
            "done" | "задача выполнена" => Ok(Status::Done),
            "canceled" | "cancelled" | "задача отменена" => Ok(Status::Canceled),
            _ => Err(anyhow!("unknown status: {trimmed:?}")),
        }
    }
}

/// The editable columns of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskField {
    Description,
    Status,
    Deadline,
}

impl TaskField {
    pub const ALL: [TaskField; 3] = [
        TaskField::Description,
        TaskField::Status,
        TaskField::Deadline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskField::Description => "description",
            TaskField::Status => "status",
            TaskField::Deadline => "deadline",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "description" | "desc" => Ok(TaskField::Description),
            "status" => Ok(TaskField::Status),
            "deadline" | "due" => Ok(TaskField::Deadline),
            other => Err(anyhow!("unknown task field: {other}")),
        }
    }
}

/// A typed replacement value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Description(String),
    Status(Status),
    Deadline(NaiveDate),
}

impl FieldValue {
    pub fn field(&self) -> TaskField {
        match self {
            FieldValue::Description(_) => TaskField::Description,
            FieldValue::Status(_) => TaskField::Status,
            FieldValue::Deadline(_) => TaskField::Deadline,
        }
    }

    /// Converts raw editor text into the typed value for `field`.
    pub fn parse(field: TaskField, raw: &str) -> anyhow::Result<Self> {
        match field {
            TaskField::Description => Ok(FieldValue::Description(raw.trim().to_string())),
            TaskField::Status => Ok(FieldValue::Status(raw.parse()?)),
            TaskField::Deadline => Ok(FieldValue::Deadline(
                crate::datetime::parse_iso_date(raw)?,
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub description: String,

    pub status: Status,

    #[serde(with = "iso_date_serde")]
    pub deadline: NaiveDate,
}

impl Task {
    /// Current value of `field` as editor text.
    pub fn field_text(&self, field: TaskField) -> String {
        match field {
            TaskField::Description => self.description.clone(),
            TaskField::Status => self.status.as_str().to_string(),
            TaskField::Deadline => crate::datetime::format_iso_date(self.deadline),
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.deadline < today
    }
}
