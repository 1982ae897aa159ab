//! Core domain types and shared primitives for the tasksmith task runner.
//!
//! This crate contains:
//! - The manifest data model (tasks, workflows, stages, commands, and the
//!   inert helper/output/trigger metadata carried alongside them)
//! - The runtime error type shared by the scheduler and workflow executor
//! - A generic topological sort + cycle detector used by both dependency
//!   levels (task graph and stage graph)
//! - The shared environment map, status table, cancellation token, and log
//!   channel types that tie the scheduler and executor together

pub mod cancel;
pub mod env;
pub mod error;
pub mod log;
pub mod model;
pub mod status;
pub mod toposort;

pub use cancel::CancellationToken;
pub use env::SharedEnv;
pub use error::{Error, Result};
pub use log::{LogLine, LogReceiver, LogSender};
pub use model::{
    Argument, Command, Helper, Manifest, Output, Stage, Task, Temporary, Trigger, Workflow,
};
pub use status::{StatusTable, TaskStatus};
