//! `tasksmith run` (the default command): load, validate, and execute a
//! manifest, wiring together the scheduler, the workflow executor, and the
//! log channel.

use std::sync::Arc;

use anyhow::Context;
use tasksmith_core::log::DEFAULT_CAPACITY;
use tasksmith_core::{log, CancellationToken, Error, SharedEnv, StatusTable, TaskStatus};
use tasksmith_scheduler::Scheduler;
use tracing::info;

pub async fn run(config_path: &str, workers: i64, dry_run: bool) -> anyhow::Result<i32> {
    let validated = tasksmith_config::load_and_validate(config_path)
        .with_context(|| format!("failed to load manifest {config_path:?}"))?;

    if validated.tasks.is_empty() {
        eprintln!("nothing to execute");
        return Ok(0);
    }

    let env = SharedEnv::new();
    let status = StatusTable::new(validated.tasks.keys().cloned());
    let (log_tx, mut log_rx) = log::channel(DEFAULT_CAPACITY);
    let cancel = CancellationToken::new();

    let log_task = tokio::spawn(async move {
        while let Some(line) = log_rx.recv().await {
            println!("[{}] {}", line.task, line.line);
        }
    });

    let tasks = Arc::new(validated.tasks);
    let workflows = Arc::new(validated.workflows);
    let scheduler = Scheduler::new(validated.graph);

    let outcome = {
        let tasks = tasks.clone();
        let workflows = workflows.clone();
        let env = env.clone();
        let status = status.clone();
        let log_tx = log_tx.clone();
        scheduler
            .run(workers, cancel, move |name, cancel| {
                let tasks = tasks.clone();
                let workflows = workflows.clone();
                let env = env.clone();
                let status = status.clone();
                let log_tx = log_tx.clone();
                async move {
                    let task = tasks
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| Error::UnknownTask(name.clone()))?;

                    status.set(&name, TaskStatus::Running);
                    info!(task = %name, workflow = %task.workflow, "task started");

                    let result = tasksmith_runner::run_workflow(
                        &task,
                        &workflows,
                        dry_run,
                        &env,
                        Some(&log_tx),
                        &cancel,
                    )
                    .await;

                    match &result {
                        Ok(()) => {
                            status.set(&name, TaskStatus::Done);
                            info!(task = %name, "task completed");
                        }
                        Err(err) => {
                            status.set(&name, TaskStatus::Failed);
                            tracing::warn!(task = %name, error = %err, "task failed");
                        }
                    }
                    result
                }
            })
            .await
    };

    // Dropping our clone (plus the one moved into the exec_fn closure,
    // which is dropped along with the closure once the run returns) lets
    // the log consumer task observe EOF once every producer is gone.
    drop(log_tx);
    let _ = log_task.await;

    println!("final status:");
    for (name, task_status) in status.snapshot() {
        println!("  {name}: {task_status}");
    }

    match outcome.error {
        Some(err) => {
            eprintln!("error: {err}");
            Ok(1)
        }
        None => Ok(0),
    }
}
