//! The manifest data model: tasks, workflows, stages, and commands, plus the
//! inert helper/output/trigger metadata carried alongside them.
//!
//! These types mirror the YAML grammar in the manifest file verbatim (field
//! names match YAML keys) so that `tasksmith-config` can deserialize a
//! manifest directly into them with no intermediate representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of a parsed manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Informational version string; not interpreted by the engine.
    #[serde(default)]
    pub version: String,
    /// Named helpers (tunnels, credential fetchers, ...). Carried through
    /// validation but not executed by the core.
    #[serde(default)]
    pub helpers: BTreeMap<String, Helper>,
    /// Named, reusable workflows.
    #[serde(default)]
    pub workflows: BTreeMap<String, Workflow>,
    /// The tasks to run.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A unit of execution bound to a working directory and a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    /// Working directory the task's workflow runs in.
    pub path: String,
    /// Task identity. Defaulted to `basename(path)` when empty (see
    /// `tasksmith_config::validate`).
    #[serde(default)]
    pub name: String,
    /// Name of the workflow this task runs. Defaulted to `"default"` when
    /// empty.
    #[serde(default)]
    pub workflow: String,
    /// Names of tasks that must complete before this one starts.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Names of helpers this task depends on. Inert: validated for
    /// referential integrity only, never started by the core.
    #[serde(default)]
    pub helpers: Vec<String>,
    /// Files to write on task completion. Inert.
    #[serde(default)]
    pub outputs: Vec<Output>,
    /// Triggers that would imply this task should be re-run. Inert.
    #[serde(default)]
    pub redeploy_on: Vec<Trigger>,
}

/// A named, DAG-structured collection of stages reusable across tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    /// Scratch resources the workflow expects to have available. Inert.
    #[serde(default)]
    pub temporaries: Vec<Temporary>,
    /// Other manifests/fragments to load before this workflow runs. Inert.
    #[serde(default, rename = "load")]
    pub sources: Vec<String>,
    /// Stage name -> Stage. Stage names appear as inline sibling keys of
    /// `temporaries`/`load` in the YAML, so they're captured with
    /// `#[serde(flatten)]` rather than a dedicated `stages:` key.
    #[serde(flatten)]
    pub stages: BTreeMap<String, Stage>,
}

/// An ordered pair of command sequences, with declared prerequisite stages
/// within its workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stage {
    /// Label -> required-stage-name. Only the values matter to ordering;
    /// labels are a manifest-authoring affordance the engine ignores.
    #[serde(default)]
    pub requires: BTreeMap<String, String>,
    /// Commands run, in declared order, once this stage's dependencies have
    /// completed.
    #[serde(default)]
    pub run: Vec<Command>,
    /// Commands run after every stage's `run` block has completed, in
    /// reverse stage order (see `tasksmith_runner::workflow`).
    #[serde(default)]
    pub finalize: Vec<Command>,
}

/// A shell string possibly annotated with a capture-variable name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Shell-interpretable command string, run as `sh -c <cmd>`.
    pub cmd: String,
    /// If set, the command's captured stdout (trimmed) is stored under this
    /// name in the shared environment map for subsequent commands in the
    /// same task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_as: Option<String>,
}

/// A set of commands used to manage a tunnel, fetch credentials, or
/// otherwise prepare something a workflow needs. Carried through the data
/// model for fidelity; the core does not start or stop helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Helper {
    #[serde(rename = "type")]
    pub helper_type: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default, rename = "run")]
    pub commands: Vec<Command>,
    /// Time, in seconds, after which the helper's output is considered
    /// stale. `None` means no expiry.
    #[serde(default, rename = "ttl")]
    pub ttl_seconds: Option<u64>,
}

/// A value a helper expects to be available, optionally exposed to its
/// commands via an environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default, rename = "env")]
    pub variable: Option<String>,
}

/// Something to be written to a configuration file upon completion of a
/// task's run. Inert: the core validates it structurally but does not act
/// on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub path: String,
    pub action: String,
    #[serde(default)]
    pub field: Option<String>,
}

/// A location in an `Output` that, when changed, implies a task should be
/// re-run. Inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub path: String,
    pub field: String,
}

/// A scratch resource (e.g. a temp file) a workflow expects to have
/// available. Inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temporary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}
