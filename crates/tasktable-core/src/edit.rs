use tracing::{debug, info, warn};

use crate::store::TaskStore;
use crate::task::{FieldValue, TaskField};

/// The cell currently being edited and its unsaved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub task_id: u64,
    pub field: TaskField,
    pub value: String,
}

/// Result of a commit attempt. Every variant leaves the controller idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was being edited.
    Idle,
    Saved { task_id: u64, field: TaskField },
    /// The value was empty after trimming; nothing was saved.
    Empty,
    /// The value could not be read as the field's type; nothing was saved.
    Invalid(String),
    /// The edited task no longer exists.
    Missing { task_id: u64 },
}

impl CommitOutcome {
    pub fn message(&self) -> Option<String> {
        match self {
            CommitOutcome::Empty => Some("cannot save empty value".to_string()),
            CommitOutcome::Invalid(reason) => Some(format!("cannot save value: {reason}")),
            CommitOutcome::Missing { task_id } => Some(format!("task {task_id} no longer exists")),
            CommitOutcome::Idle | CommitOutcome::Saved { .. } => None,
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct EditController {
    session: Option<EditSession>,
}

impl EditController {
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    pub fn is_editing(&self, task_id: u64, field: TaskField) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.task_id == task_id && s.field == field)
    }

    /// Starts editing a cell. Any previous session is dropped unsaved.
    pub fn start_editing(&mut self, task_id: u64, field: TaskField, current: impl Into<String>) {
        if let Some(previous) = self.session.take() {
            debug!(
                task_id = previous.task_id,
                field = %previous.field,
                "discarding previous edit session"
            );
        }
        self.session = Some(EditSession {
            task_id,
            field,
            value: current.into(),
        });
        debug!(task_id, field = %field, "editing started");
    }

    pub fn change_value(&mut self, value: impl Into<String>) {
        if let Some(session) = self.session.as_mut() {
            session.value = value.into();
        }
    }

    #[tracing::instrument(skip(self, store))]
    pub fn commit(&mut self, store: &mut TaskStore) -> CommitOutcome {
        let Some(session) = self.session.take() else {
            return CommitOutcome::Idle;
        };

        let value = match session.field {
            TaskField::Description => session.value.trim(),
            TaskField::Status | TaskField::Deadline => session.value.as_str(),
        };
        if value.is_empty() {
            warn!(task_id = session.task_id, field = %session.field, "empty value not saved");
            return CommitOutcome::Empty;
        }

        let typed = match FieldValue::parse(session.field, value) {
            Ok(typed) => typed,
            Err(err) => {
                warn!(task_id = session.task_id, field = %session.field, error = %err, "invalid value not saved");
                return CommitOutcome::Invalid(err.to_string());
            }
        };

        if store.update(session.task_id, typed) {
            info!(task_id = session.task_id, field = %session.field, "edit committed");
            CommitOutcome::Saved {
                task_id: session.task_id,
                field: session.field,
            }
        } else {
            CommitOutcome::Missing {
                task_id: session.task_id,
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            debug!("edit cancelled");
        }
    }

    pub fn handle_key(&mut self, key: EditKey, store: &mut TaskStore) -> CommitOutcome {
        match key {
            EditKey::Confirm => self.commit(store),
            EditKey::Cancel => {
                self.cancel();
                CommitOutcome::Idle
            }
        }
    }

    /// Focus left the editor; saves like a confirm.
    pub fn blur(&mut self, store: &mut TaskStore) -> CommitOutcome {
        self.commit(store)
    }

    /// Drops the session if it targets `task_id`.
    pub(crate) fn forget_task(&mut self, task_id: u64) {
        if self.session.as_ref().is_some_and(|s| s.task_id == task_id) {
            self.session = None;
        }
    }
}
