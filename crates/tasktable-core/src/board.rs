use tracing::{debug, info};

use crate::edit::{CommitOutcome, EditController, EditKey};
use crate::filter::{FilterMode, visible};
use crate::form::AddForm;
use crate::store::TaskStore;
use crate::task::{Task, TaskField};

/// All UI state of the task board, owned in one place and handed to the view.
#[derive(Debug, Default)]
pub struct Board {
    store: TaskStore,
    filter: FilterMode,
    form: AddForm,
    edit: EditController,
}

impl Board {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            filter: FilterMode::default(),
            form: AddForm::default(),
            edit: EditController::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.list()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn visible(&self) -> Vec<&Task> {
        visible(self.store.list(), self.filter)
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        debug!(from = %self.filter, to = %mode, "filter changed");
        self.filter = mode;
    }

    pub fn form(&self) -> &AddForm {
        &self.form
    }

    pub fn open_form(&mut self) {
        self.form.open();
    }

    pub fn close_form(&mut self) {
        self.form.close();
    }

    pub fn change_form(&mut self, field: TaskField, value: impl Into<String>) {
        self.form.change(field, value);
    }

    pub fn submit_form(&mut self) -> anyhow::Result<Option<Task>> {
        self.form.submit(&mut self.store)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> Option<Task> {
        self.edit.forget_task(id);
        let removed = self.store.remove(id);
        if removed.is_none() {
            debug!("delete for unknown task ignored");
        }
        removed
    }

    pub fn edit(&self) -> &EditController {
        &self.edit
    }

    /// Begins editing a cell with the task's current value. Unknown ids are
    /// ignored and return `false`.
    pub fn start_editing(&mut self, id: u64, field: TaskField) -> bool {
        let Some(current) = self.store.get(id).map(|task| task.field_text(field)) else {
            debug!(id, "edit requested for unknown task");
            return false;
        };
        self.edit.start_editing(id, field, current);
        true
    }

    pub fn change_value(&mut self, value: impl Into<String>) {
        self.edit.change_value(value);
    }

    pub fn commit(&mut self) -> CommitOutcome {
        let outcome = self.edit.commit(&mut self.store);
        if let CommitOutcome::Saved { task_id, field } = &outcome {
            info!(task_id, field = %field, "cell saved");
        }
        outcome
    }

    pub fn cancel(&mut self) {
        self.edit.cancel();
    }

    pub fn handle_key(&mut self, key: EditKey) -> CommitOutcome {
        self.edit.handle_key(key, &mut self.store)
    }

    pub fn blur(&mut self) -> CommitOutcome {
        self.edit.blur(&mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::edit::{CommitOutcome, EditKey};
    use crate::filter::FilterMode;
    use crate::task::{Status, TaskField};

    fn board_with(entries: &[(&str, &str)]) -> Board {
        let mut board = Board::default();
        for (description, status) in entries {
            board.open_form();
            board.change_form(TaskField::Description, *description);
            board.change_form(TaskField::Status, *status);
            board.change_form(TaskField::Deadline, "2024-05-01");
            board
                .submit_form()
                .expect("submit")
                .expect("task created");
        }
        board
    }

    #[test]
    fn filter_follows_status_edits() {
        let mut board = board_with(&[("a", "active"), ("b", "active")]);
        board.set_filter(FilterMode::Completed);
        assert!(board.visible().is_empty());

        let id = board.tasks()[1].id;
        assert!(board.start_editing(id, TaskField::Status));
        assert_eq!(board.edit().session().map(|s| s.value.as_str()), Some("active"));
        board.change_value("canceled");
        assert!(matches!(board.handle_key(EditKey::Confirm), CommitOutcome::Saved { .. }));

        let shown: Vec<u64> = board.visible().iter().map(|t| t.id).collect();
        assert_eq!(shown, vec![id]);
        assert_eq!(board.tasks()[1].status, Status::Canceled);
    }

    #[test]
    fn deleting_edited_task_ends_the_session() {
        let mut board = board_with(&[("a", "active")]);
        let id = board.tasks()[0].id;

        board.start_editing(id, TaskField::Description);
        board.change_value("changed");
        assert!(board.delete(id).is_some());

        assert!(board.edit().is_idle());
        assert_eq!(board.blur(), CommitOutcome::Idle);
        assert!(board.delete(id).is_none());
    }

    #[test]
    fn start_editing_unknown_task_stays_idle() {
        let mut board = board_with(&[("a", "done")]);
        assert!(!board.start_editing(404, TaskField::Description));
        assert!(board.edit().is_idle());
    }
}
