use anyhow::Context;
use tracing::{debug, info};

use crate::datetime::parse_iso_date;
use crate::store::TaskStore;
use crate::task::{Status, Task, TaskField};
use crate::validate::{FieldErrors, TaskDraft, validate};

/// State of the modal "add task" form.
#[derive(Debug, Clone, Default)]
pub struct AddForm {
    open: bool,
    draft: TaskDraft,
    errors: FieldErrors,
}

impl AddForm {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Opens with a fresh draft: empty text, status preset to active.
    pub fn open(&mut self) {
        self.draft = TaskDraft::new("", Status::Active.as_str(), "");
        self.errors.clear();
        self.open = true;
        debug!("add form opened");
    }

    pub fn close(&mut self) {
        self.open = false;
        debug!("add form closed");
    }

    /// Edits one draft field and clears that field's error only.
    pub fn change(&mut self, field: TaskField, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.remove(&field);
    }

    /// Validates the draft and, when clean, adds it to `store` and closes.
    ///
    /// Returns `Ok(None)` when validation failed; the errors are kept on the
    /// form and the store is untouched.
    #[tracing::instrument(skip(self, store))]
    pub fn submit(&mut self, store: &mut TaskStore) -> anyhow::Result<Option<Task>> {
        let errors = validate(&self.draft);
        if !errors.is_empty() {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "add form rejected");
            self.errors = errors;
            return Ok(None);
        }

        let status: Status = self
            .draft
            .status
            .parse()
            .context("validated status failed to parse")?;
        let deadline = parse_iso_date(&self.draft.deadline)
            .context("validated deadline failed to parse")?;

        let task = store.add(&self.draft.description, status, deadline)?;
        self.errors.clear();
        self.open = false;

        info!(id = task.id, "task created from add form");
        Ok(Some(task))
    }
}
