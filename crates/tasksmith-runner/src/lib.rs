//! Command execution and per-task workflow orchestration for the tasksmith
//! task runner.
//!
//! This crate contains:
//! - The command runner (§4.2): spawns `sh -c <cmd>` for a single command,
//!   streams its stdout/stderr, and optionally captures stdout for
//!   `save_as` variable passing.
//! - The workflow executor (§4.3): for a single task, topologically orders
//!   its workflow's stages, runs each stage's commands in order, and runs
//!   finalizers in reverse stage order once every stage has succeeded.

pub mod command;
pub mod workflow;

pub use command::run_command;
pub use workflow::run_workflow;
