//! Runtime error types for the scheduler and workflow executor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("workflow {0:?} not found")]
    UnknownWorkflow(String),

    #[error("unknown task {0:?}")]
    UnknownTask(String),

    #[error("cycle detected in dependency graph")]
    CycleDetected,

    #[error("could not sort stages for task {path}: cycle detected")]
    StageCycle { path: String },

    #[error("command {cmd:?} failed with exit status {status}")]
    CommandFailed { cmd: String, status: i32 },

    #[error("task {task} stage {stage} run failed: {source}")]
    StageFailed {
        task: String,
        stage: String,
        #[source]
        source: Box<Error>,
    },

    #[error("task {task} stage {stage} finalize failed: {source}")]
    FinalizeFailed {
        task: String,
        stage: String,
        #[source]
        source: Box<Error>,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("not all tasks completed: {completed}/{total}")]
    Incomplete { completed: usize, total: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
