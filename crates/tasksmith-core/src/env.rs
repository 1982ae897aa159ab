//! The shared, process-wide environment map that accumulates `save_as`
//! captures across all tasks in a run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// `name -> value` map mutated by the command runner under a single mutex.
/// Append-only within a run: commands overwrite existing keys but nothing
/// ever removes one. Cheap to clone; all clones share the same backing map.
#[derive(Clone, Default)]
pub struct SharedEnv {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl SharedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a point-in-time copy of the map, for overlaying onto a child
    /// process's environment.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner.lock().expect("env map lock poisoned").clone()
    }

    /// Bind `name` to `value`, last-writer-wins.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .lock()
            .expect("env map lock poisoned")
            .insert(name.into(), value.into());
    }

    /// Look up a single binding, for tests and diagnostics.
    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.lock().expect("env map lock poisoned").get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let env = SharedEnv::new();
        env.set("X", "42");
        assert_eq!(env.get("X").as_deref(), Some("42"));
    }

    #[test]
    fn later_write_wins() {
        let env = SharedEnv::new();
        env.set("X", "first");
        env.set("X", "second");
        assert_eq!(env.get("X").as_deref(), Some("second"));
    }

    #[test]
    fn clones_share_state() {
        let env = SharedEnv::new();
        let clone = env.clone();
        clone.set("X", "1");
        assert_eq!(env.get("X").as_deref(), Some("1"));
    }

    #[test]
    fn snapshot_is_a_point_in_time_copy() {
        let env = SharedEnv::new();
        env.set("X", "1");
        let snap = env.snapshot();
        env.set("X", "2");
        assert_eq!(snap.get("X").map(String::as_str), Some("1"));
        assert_eq!(env.get("X").as_deref(), Some("2"));
    }
}
