//! Dependency-ordered task scheduling for the tasksmith task runner.
//!
//! Drives the task-level DAG (`tasksmith_config::ValidatedManifest::graph`)
//! through a bounded pool of workers, dispatching each task's `exec_fn`
//! only once every predecessor has completed, and cancelling the whole run
//! on the first failure (§4.4).

mod scheduler;
mod worker;

pub use scheduler::{RunOutcome, Scheduler};
