//! The workflow executor: for a single task, orders that task's workflow
//! stages, runs each stage's commands through the command runner, then
//! unwinds the finalizer stack in reverse stage order.

use std::collections::HashMap;

use tasksmith_core::toposort::topological_sort;
use tasksmith_core::{CancellationToken, Error, LogSender, Result, SharedEnv, Task, Workflow};
use tracing::{debug, info, warn};

use crate::command::run_command;

/// Run `task`'s workflow to completion, or abort with the error of the
/// first command/stage/finalizer that fails. See `SPEC_FULL.md` §4.3.
pub async fn run_workflow(
    task: &Task,
    workflows: &HashMap<String, Workflow>,
    dry_run: bool,
    env: &SharedEnv,
    log: Option<&LogSender>,
    cancel: &CancellationToken,
) -> Result<()> {
    let workflow = workflows
        .get(&task.workflow)
        .ok_or_else(|| Error::UnknownWorkflow(task.workflow.clone()))?;

    let stage_order = stage_order(workflow, &task.path)?;

    let mut finalizers: Vec<(&str, &[tasksmith_core::Command])> = Vec::new();

    for stage_name in &stage_order {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let stage = workflow
            .stages
            .get(stage_name)
            .expect("stage_order only contains keys of workflow.stages");

        info!(task = %task.name, stage = %stage_name, "running stage");
        for command in &stage.run {
            run_command(command, &task.path, dry_run, env, log, &task.name, cancel)
                .await
                .map_err(|source| Error::StageFailed {
                    task: task.name.clone(),
                    stage: stage_name.clone(),
                    source: Box::new(source),
                })?;
        }

        if !stage.finalize.is_empty() {
            finalizers.push((stage_name.as_str(), stage.finalize.as_slice()));
        }
    }

    while let Some((stage_name, commands)) = finalizers.pop() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        debug!(task = %task.name, stage = %stage_name, "running finalizer");
        for command in commands {
            run_command(command, &task.path, dry_run, env, log, &task.name, cancel)
                .await
                .map_err(|source| Error::FinalizeFailed {
                    task: task.name.clone(),
                    stage: stage_name.to_string(),
                    source: Box::new(source),
                })?;
        }
    }

    Ok(())
}

/// Build and topologically sort a workflow's stage graph: keys are stage
/// names, edges point from each stage named in another stage's `requires`
/// values to that other stage. Every stage appears as a key, even one with
/// no dependencies and no dependents.
fn stage_order(workflow: &Workflow, task_path: &str) -> Result<Vec<String>> {
    let mut graph: HashMap<String, Vec<String>> =
        workflow.stages.keys().cloned().map(|name| (name, Vec::new())).collect();
    for (stage_name, stage) in &workflow.stages {
        for required in stage.requires.values() {
            graph.entry(required.clone()).or_default().push(stage_name.clone());
        }
    }

    topological_sort(&graph).map_err(|_| {
        warn!(task = %task_path, "stage cycle detected");
        Error::StageCycle {
            path: task_path.to_string(),
        }
    })
}
