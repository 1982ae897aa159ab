//! A single worker: pulls ready task names off the shared queue and drives
//! them through the caller-supplied `exec_fn`.

use std::sync::Arc;

use tasksmith_core::{CancellationToken, Result};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::debug;

pub type TaskQueue = Arc<AsyncMutex<mpsc::UnboundedReceiver<String>>>;
pub type CompletionSender = mpsc::UnboundedSender<(String, Result<()>)>;

/// Pull task names from `queue` until it closes or `cancel` fires, running
/// each through `exec_fn` and posting its result on `completions`.
///
/// A worker that observes an error from `exec_fn` publishes it and exits
/// immediately without pulling further work (§4.4): the dispatcher is the
/// one that decides whether that error cancels the run.
pub async fn run<F, Fut>(
    id: usize,
    queue: TaskQueue,
    completions: CompletionSender,
    exec_fn: F,
    cancel: CancellationToken,
) where
    F: Fn(String, CancellationToken) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    loop {
        let next = {
            let mut queue = queue.lock().await;
            tokio::select! {
                item = queue.recv() => item,
                () = cancel.cancelled() => None,
            }
        };
        let Some(task_name) = next else {
            debug!(worker = id, "worker exiting: no more work");
            break;
        };

        debug!(worker = id, task = %task_name, "worker picked up task");
        let result = exec_fn(task_name.clone(), cancel.clone()).await;
        let failed = result.is_err();
        if completions.send((task_name, result)).is_err() {
            break;
        }
        if failed {
            break;
        }
    }
}
