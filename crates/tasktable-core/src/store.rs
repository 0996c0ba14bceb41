use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, ensure};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::task::{FieldValue, Status, Task};

/// Hands out task ids. Implementations never return the same id twice.
pub trait IdSource: std::fmt::Debug {
    /// Fails once the id space is exhausted.
    fn next_id(&mut self) -> anyhow::Result<u64>;

    /// Guarantees every later id is strictly greater than `id`.
    fn observe(&mut self, id: u64);
}

#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: u64,
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> anyhow::Result<u64> {
        let next = self
            .last
            .checked_add(1)
            .ok_or_else(|| anyhow!("task id space exhausted after {}", self.last))?;
        self.last = next;
        Ok(next)
    }

    fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}

/// Millisecond timestamps, bumped when two ids land on the same tick.
#[derive(Debug, Clone, Default)]
pub struct ClockIds {
    last: u64,
}

impl IdSource for ClockIds {
    fn next_id(&mut self) -> anyhow::Result<u64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let bumped = self
            .last
            .checked_add(1)
            .ok_or_else(|| anyhow!("task id space exhausted after {}", self.last))?;
        self.last = now.max(bumped);
        Ok(self.last)
    }

    fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Sequential,
    Clock,
}

impl IdStrategy {
    pub fn build(self) -> Box<dyn IdSource> {
        match self {
            IdStrategy::Sequential => Box::new(SequentialIds::default()),
            IdStrategy::Clock => Box::new(ClockIds::default()),
        }
    }
}

impl std::str::FromStr for IdStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(IdStrategy::Sequential),
            "clock" | "time" => Ok(IdStrategy::Clock),
            other => Err(anyhow!("invalid id strategy: {other}")),
        }
    }
}

/// Ordered, in-memory task list. Insertion order is the display order.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    ids: Box<dyn IdSource>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl TaskStore {
    pub fn new(strategy: IdStrategy) -> Self {
        Self::with_id_source(strategy.build())
    }

    pub fn with_id_source(ids: Box<dyn IdSource>) -> Self {
        Self { tasks: Vec::new(), ids }
    }

    /// Seeds the store with an initial sequence, keeping its order.
    #[tracing::instrument(skip(tasks, strategy), fields(count = tasks.len()))]
    pub fn from_tasks(tasks: Vec<Task>, strategy: IdStrategy) -> anyhow::Result<Self> {
        let mut store = Self::new(strategy);
        let mut seen = HashSet::with_capacity(tasks.len());

        for mut task in tasks {
            ensure!(seen.insert(task.id), "duplicate task id {}", task.id);
            task.description = task.description.trim().to_string();
            ensure!(
                !task.description.is_empty(),
                "task {} has an empty description",
                task.id
            );
            store.ids.observe(task.id);
            store.tasks.push(task);
        }

        info!(count = store.tasks.len(), "seeded task store");
        Ok(store)
    }

    #[tracing::instrument(
        skip(self, description, status, deadline),
        fields(status = %status, deadline = %deadline)
    )]
    pub fn add(
        &mut self,
        description: &str,
        status: Status,
        deadline: NaiveDate,
    ) -> anyhow::Result<Task> {
        let description = description.trim();
        ensure!(!description.is_empty(), "task description cannot be empty");

        let task = Task {
            id: self.ids.next_id()?,
            description: description.to_string(),
            status,
            deadline,
        };
        self.tasks.push(task.clone());

        info!(id = task.id, "added task");
        Ok(task)
    }

    /// Replaces one field of the task with `id`. Unknown ids are ignored.
    #[tracing::instrument(skip(self, value), fields(field = %value.field()))]
    pub fn update(&mut self, id: u64, value: FieldValue) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("update for unknown task ignored");
            return false;
        };

        match value {
            FieldValue::Description(text) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!("empty description update ignored");
                    return false;
                }
                task.description = text.to_string();
            }
            FieldValue::Status(status) => task.status = status,
            FieldValue::Deadline(deadline) => task.deadline = deadline,
        }

        info!("updated task");
        true
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        info!("removed task");
        Some(removed)
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ClockIds, IdSource, IdStrategy, SequentialIds, TaskStore};
    use crate::task::{FieldValue, Status, Task};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn seeded() -> TaskStore {
        let mut store = TaskStore::default();
        store
            .add("Write report", Status::Active, date(2024, 3, 1))
            .expect("add first");
        store
            .add("Call bank", Status::Done, date(2024, 3, 2))
            .expect("add second");
        store
            .add("Renew passport", Status::Canceled, date(2024, 3, 3))
            .expect("add third");
        store
    }

    #[test]
    fn add_appends_trimmed_task_with_fresh_id() {
        let mut store = seeded();
        let before = store.len();

        let task = store
            .add("  Buy milk \n", Status::Active, date(2024, 1, 1))
            .expect("add");

        assert_eq!(store.len(), before + 1);
        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.status, Status::Active);
        assert_eq!(task.deadline, date(2024, 1, 1));
        assert_eq!(store.list().last(), Some(&task));
        assert!(store.list()[..before].iter().all(|t| t.id != task.id));
    }

    #[test]
    fn add_rejects_blank_description() {
        let mut store = TaskStore::default();
        assert!(store.add("   ", Status::Active, date(2024, 1, 1)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn update_touches_only_the_named_field() {
        let mut store = seeded();
        let before: Vec<Task> = store.list().to_vec();
        let target = before[1].id;

        assert!(store.update(target, FieldValue::Status(Status::Active)));

        let after = store.list();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(after[1].id, before[1].id);
        assert_eq!(after[1].description, before[1].description);
        assert_eq!(after[1].deadline, before[1].deadline);
        assert_eq!(after[1].status, Status::Active);
    }

    #[test]
    fn update_unknown_id_leaves_store_unchanged() {
        let mut store = seeded();
        let before: Vec<Task> = store.list().to_vec();

        assert!(!store.update(999, FieldValue::Description("ghost".to_string())));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn update_never_stores_blank_description() {
        let mut store = seeded();
        let id = store.list()[0].id;
        assert!(!store.update(id, FieldValue::Description("  ".to_string())));
        assert_eq!(store.list()[0].description, "Write report");
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = seeded();
        let id = store.list()[1].id;

        let removed = store.remove(id).expect("first remove");
        assert_eq!(removed.description, "Call bank");
        assert_eq!(store.len(), 2);

        assert!(store.remove(id).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut store = seeded();
        let last = store.list()[2].id;
        store.remove(last);

        let fresh = store
            .add("Another", Status::Active, date(2024, 4, 1))
            .expect("add");
        assert!(fresh.id > last);
    }

    #[test]
    fn from_tasks_keeps_order_and_advances_ids() {
        let tasks = vec![
            Task {
                id: 40,
                description: "b".to_string(),
                status: Status::Done,
                deadline: date(2024, 1, 2),
            },
            Task {
                id: 12,
                description: "a".to_string(),
                status: Status::Active,
                deadline: date(2024, 1, 1),
            },
        ];

        let mut store = TaskStore::from_tasks(tasks, IdStrategy::Sequential).expect("seed");
        assert_eq!(store.list()[0].id, 40);
        assert_eq!(store.list()[1].id, 12);

        let added = store
            .add("c", Status::Active, date(2024, 1, 3))
            .expect("add");
        assert_eq!(added.id, 41);
    }

    #[test]
    fn from_tasks_rejects_duplicate_ids() {
        let task = Task {
            id: 1,
            description: "dup".to_string(),
            status: Status::Active,
            deadline: date(2024, 1, 1),
        };
        let err = TaskStore::from_tasks(vec![task.clone(), task], IdStrategy::Sequential)
            .expect_err("duplicates must fail");
        assert!(err.to_string().contains("duplicate task id 1"));
    }

    #[test]
    fn clock_ids_are_strictly_increasing() {
        let mut ids = ClockIds::default();
        ids.observe(u64::MAX / 2);
        let first = ids.next_id().expect("first id");
        let second = ids.next_id().expect("second id");
        assert!(first > u64::MAX / 2);
        assert!(second > first);
    }

    #[test]
    fn add_fails_instead_of_wrapping_when_ids_run_out() {
        let tasks = vec![
            Task {
                id: 0,
                description: "zero".to_string(),
                status: Status::Active,
                deadline: date(2024, 1, 1),
            },
            Task {
                id: u64::MAX,
                description: "max".to_string(),
                status: Status::Active,
                deadline: date(2024, 1, 1),
            },
        ];

        for strategy in [IdStrategy::Sequential, IdStrategy::Clock] {
            let mut store = TaskStore::from_tasks(tasks.clone(), strategy).expect("seed");
            let err = store
                .add("y", Status::Active, date(2024, 1, 2))
                .expect_err("id overflow must fail");
            assert!(err.to_string().contains("id space exhausted"));
            assert_eq!(store.len(), 2);
        }
    }

    #[test]
    fn exhausted_sequential_ids_keep_failing() {
        let mut ids = SequentialIds::default();
        ids.observe(u64::MAX - 1);
        assert_eq!(ids.next_id().expect("last id"), u64::MAX);
        assert!(ids.next_id().is_err());
        assert!(ids.next_id().is_err());
    }
}
