//! Manifest load and validation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest {path:?}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("task {0:?} has an empty name and its path has no usable basename")]
    EmptyTaskName(String),

    #[error("duplicate task name {0:?}")]
    DuplicateTask(String),

    #[error("task {task:?} requires unknown task {requires:?}")]
    UnknownTask { task: String, requires: String },

    #[error("task {task:?} references unknown workflow {workflow:?}")]
    UnknownWorkflow { task: String, workflow: String },

    #[error("workflow {workflow:?} stage {stage:?} requires unknown stage {requires:?}")]
    InvalidReference {
        workflow: String,
        stage: String,
        requires: String,
    },

    #[error("task {task:?} references unknown helper {helper:?}")]
    UnknownHelper { task: String, helper: String },

    #[error("helper {helper:?} requires unknown helper {requires:?}")]
    InvalidHelperReference { helper: String, requires: String },

    #[error("cycle detected in task dependency graph")]
    CycleDetected,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
