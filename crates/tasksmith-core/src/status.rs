//! The task status table.
//!
//! Mutated concurrently by the caller-supplied `exec_fn` (see
//! `tasksmith_scheduler::Scheduler::run`); the scheduler itself never reads
//! or writes it. A task transitions `Waiting -> Running -> (Done | Failed)`
//! and no other transition is valid.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Waiting,
    Running,
    Done,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Default)]
pub struct StatusTable {
    inner: Arc<Mutex<HashMap<String, TaskStatus>>>,
}

impl StatusTable {
    /// Build a table with every task in `names` starting as `Waiting`.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let map = names.into_iter().map(|n| (n, TaskStatus::Waiting)).collect();
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn set(&self, name: &str, status: TaskStatus) {
        if let Some(slot) = self.inner.lock().expect("status table lock poisoned").get_mut(name) {
            *slot = status;
        }
    }

    pub fn get(&self, name: &str) -> Option<TaskStatus> {
        self.inner.lock().expect("status table lock poisoned").get(name).copied()
    }

    /// Snapshot sorted by task name, for the final report.
    pub fn snapshot(&self) -> Vec<(String, TaskStatus)> {
        let mut entries: Vec<_> = self
            .inner
            .lock()
            .expect("status table lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_all_waiting() {
        let table = StatusTable::new(["a".to_string(), "b".to_string()]);
        assert_eq!(table.get("a"), Some(TaskStatus::Waiting));
        assert_eq!(table.get("b"), Some(TaskStatus::Waiting));
    }

    #[test]
    fn set_transitions_are_observed_by_clones() {
        let table = StatusTable::new(["a".to_string()]);
        let clone = table.clone();
        clone.set("a", TaskStatus::Running);
        assert_eq!(table.get("a"), Some(TaskStatus::Running));
    }

    #[test]
    fn snapshot_is_sorted_by_name() {
        let table = StatusTable::new(["b".to_string(), "a".to_string()]);
        let snap = table.snapshot();
        assert_eq!(snap[0].0, "a");
        assert_eq!(snap[1].0, "b");
    }
}
