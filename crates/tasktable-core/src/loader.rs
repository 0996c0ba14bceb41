use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::task::Task;

/// Reads the initial task list: a JSON array of task records, in display
/// order.
#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<Task>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tasks = parse_tasks(&raw).with_context(|| format!("failed parsing {}", path.display()))?;
    info!(count = tasks.len(), "loaded initial tasks");
    Ok(tasks)
}

pub fn parse_tasks(raw: &str) -> anyhow::Result<Vec<Task>> {
    if raw.trim().is_empty() {
        debug!("empty task source");
        return Ok(vec![]);
    }
    let tasks: Vec<Task> = serde_json::from_str(raw)?;
    Ok(tasks)
}
