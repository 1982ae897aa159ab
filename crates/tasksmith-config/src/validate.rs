//! Manifest validation and task-graph construction.
//!
//! Turns a raw parsed [`Manifest`] into a [`ValidatedManifest`] the
//! scheduler and workflow executor can run directly: task names are
//! resolved and checked for uniqueness, every `requires`/`workflow`
//! reference is checked against what actually exists, every workflow's
//! stage `requires` values are checked for dangling references, and the
//! task-level dependency graph is built and given an early toposort pass so
//! cycles are reported before any task starts.

use std::collections::HashMap;
use std::path::Path;

use tasksmith_core::toposort::topological_sort;
use tasksmith_core::{Manifest, Task, Workflow};

use crate::{ConfigError, ConfigResult};

/// A manifest that has passed all referential-integrity and acyclicity
/// checks, ready to hand to `tasksmith_scheduler::Scheduler`.
#[derive(Debug, Clone)]
pub struct ValidatedManifest {
    /// Task name -> Task, with names normalized (see `normalize_task`).
    pub tasks: HashMap<String, Task>,
    /// Task dependency graph: `dependency name -> [dependent names]`.
    pub graph: HashMap<String, Vec<String>>,
    /// Workflow name -> Workflow, as declared.
    pub workflows: HashMap<String, Workflow>,
}

/// Validate `manifest` and build its task graph.
pub fn validate(manifest: Manifest) -> ConfigResult<ValidatedManifest> {
    let Manifest {
        workflows,
        tasks,
        helpers,
        ..
    } = manifest;

    let mut named_tasks: HashMap<String, Task> = HashMap::with_capacity(tasks.len());
    for mut task in tasks {
        normalize_task(&mut task)?;
        if named_tasks.contains_key(&task.name) {
            return Err(ConfigError::DuplicateTask(task.name));
        }
        named_tasks.insert(task.name.clone(), task);
    }

    for task in named_tasks.values() {
        if !workflows.contains_key(&task.workflow) {
            return Err(ConfigError::UnknownWorkflow {
                task: task.name.clone(),
                workflow: task.workflow.clone(),
            });
        }
        for dep in &task.requires {
            if !named_tasks.contains_key(dep) {
                return Err(ConfigError::UnknownTask {
                    task: task.name.clone(),
                    requires: dep.clone(),
                });
            }
        }
        for helper in &task.helpers {
            if !helpers.contains_key(helper) {
                return Err(ConfigError::UnknownHelper {
                    task: task.name.clone(),
                    helper: helper.clone(),
                });
            }
        }
    }

    for (helper_name, helper) in &helpers {
        for required in &helper.requires {
            if !helpers.contains_key(required) {
                return Err(ConfigError::InvalidHelperReference {
                    helper: helper_name.clone(),
                    requires: required.clone(),
                });
            }
        }
    }

    for (workflow_name, workflow) in &workflows {
        for (stage_name, stage) in &workflow.stages {
            for required in stage.requires.values() {
                if !workflow.stages.contains_key(required) {
                    return Err(ConfigError::InvalidReference {
                        workflow: workflow_name.clone(),
                        stage: stage_name.clone(),
                        requires: required.clone(),
                    });
                }
            }
        }
    }

    let graph = build_task_graph(&named_tasks);
    topological_sort(&graph).map_err(|_| ConfigError::CycleDetected)?;

    Ok(ValidatedManifest {
        tasks: named_tasks,
        graph,
        workflows: workflows.into_iter().collect(),
    })
}

/// Derive a task's final `name` and `workflow`, per §3/§9 of the spec:
/// an empty `workflow` defaults to `"default"`; an empty `name` is derived
/// from `basename(path)`, and if that basename would be empty, `"."`, or
/// `"/"`, the name is left empty and reported as a validation error rather
/// than guessed at.
fn normalize_task(task: &mut Task) -> ConfigResult<()> {
    if task.workflow.is_empty() {
        task.workflow = "default".to_string();
    }
    if task.name.is_empty() {
        match Path::new(&task.path).file_name().and_then(|s| s.to_str()) {
            Some(base) if !base.is_empty() => task.name = base.to_string(),
            _ => return Err(ConfigError::EmptyTaskName(task.path.clone())),
        }
    }
    Ok(())
}

/// Invert each task's `requires` list into a `dependency -> [dependents]`
/// adjacency map. Every task name is present as a key, even with no
/// dependents.
fn build_task_graph(tasks: &HashMap<String, Task>) -> HashMap<String, Vec<String>> {
    let mut graph: HashMap<String, Vec<String>> =
        tasks.keys().cloned().map(|name| (name, Vec::new())).collect();
    for task in tasks.values() {
        for dep in &task.requires {
            graph.entry(dep.clone()).or_default().push(task.name.clone());
        }
    }
    graph
}
