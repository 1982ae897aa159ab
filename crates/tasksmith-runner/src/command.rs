//! The command runner: executes a single `Command` as a `sh -c` child
//! process, streaming its output and optionally capturing its stdout for
//! `save_as`.

use std::process::Stdio;
use std::sync::Arc;

use tasksmith_core::{CancellationToken, Command, Error, LogLine, LogSender, Result, SharedEnv};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as ChildCommand;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

/// Run `command` in `workdir` (inherits the caller's working directory when
/// empty). See `SPEC_FULL.md` §4.2 for the full contract.
pub async fn run_command(
    command: &Command,
    workdir: &str,
    dry_run: bool,
    env: &SharedEnv,
    log: Option<&LogSender>,
    task_name: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    if dry_run {
        if let Some(name) = &command.save_as {
            env.set(name.clone(), "");
        }
        return Ok(());
    }

    let mut cmd = ChildCommand::new("sh");
    cmd.arg("-c").arg(&command.cmd);
    if !workdir.is_empty() {
        cmd.current_dir(workdir);
    }
    // `envs` overlays onto the inherited parent environment, overriding any
    // key present in both — exactly the "(a) union (b), (b) wins" contract.
    cmd.envs(env.snapshot());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let capture = Arc::new(AsyncMutex::new(String::new()));
    let stdout_task = tokio::spawn(stream_lines(
        stdout,
        Some(capture.clone()),
        log.cloned(),
        task_name.to_string(),
        Stream::Stdout,
    ));
    let stderr_task = tokio::spawn(stream_lines(
        stderr,
        None,
        log.cloned(),
        task_name.to_string(),
        Stream::Stderr,
    ));

    let status = tokio::select! {
        status = child.wait() => status?,
        () = cancel.cancelled() => {
            debug!(task = task_name, cmd = %command.cmd, "cancelling in-flight command");
            let _ = child.start_kill();
            let _ = child.wait().await;
            stdout_task.abort();
            stderr_task.abort();
            return Err(Error::Cancelled);
        }
    };

    // Readers observe EOF once the child exits; let them drain.
    let _ = stdout_task.await;
    let _ = stderr_task.await;

    if !status.success() {
        return Err(Error::CommandFailed {
            cmd: command.cmd.clone(),
            status: status.code().unwrap_or(-1),
        });
    }

    if let Some(name) = &command.save_as {
        let trimmed = capture.lock().await.trim().to_string();
        env.set(name.clone(), trimmed);
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Read `reader` line by line. Every line is sent on `log` (tagged with
/// `task`) when present, or written through to the process's own stdout /
/// stderr when not. Lines read from `Stream::Stdout` are additionally
/// appended to `capture`, serialized behind its mutex, for later use by
/// `save_as`; stderr is streamed but never captured.
async fn stream_lines(
    reader: impl AsyncRead + Unpin,
    capture: Option<Arc<AsyncMutex<String>>>,
    log: Option<LogSender>,
    task: String,
    stream: Stream,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(task = %task, error = %err, "error reading command output");
                break;
            }
        };

        if let Some(capture) = &capture {
            let mut buf = capture.lock().await;
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(&line);
        }

        match &log {
            Some(sender) => {
                let _ = sender
                    .send(LogLine {
                        task: task.clone(),
                        line,
                    })
                    .await;
            }
            None => match stream {
                Stream::Stdout => println!("{line}"),
                Stream::Stderr => eprintln!("{line}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasksmith_core::log::channel;

    fn cmd(s: &str) -> Command {
        Command {
            cmd: s.to_string(),
            save_as: None,
        }
    }

    fn cmd_save(s: &str, save_as: &str) -> Command {
        Command {
            cmd: s.to_string(),
            save_as: Some(save_as.to_string()),
        }
    }

    #[tokio::test]
    async fn dry_run_never_spawns_and_binds_empty_string() {
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        run_command(
            &cmd_save("echo should-not-run", "X"),
            "",
            true,
            &env,
            None,
            "t",
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(env.get("X").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn successful_command_with_save_as_trims_stdout() {
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        run_command(
            &cmd_save("echo 42", "X"),
            "",
            false,
            &env,
            None,
            "t",
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(env.get("X").as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        let err = run_command(&cmd("exit 3"), "", false, &env, None, "t", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { status: 3, .. }));
    }

    #[tokio::test]
    async fn stdout_lines_are_published_to_the_log_channel() {
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = channel(8);
        run_command(
            &cmd("echo hi"),
            "",
            false,
            &env,
            Some(&tx),
            "mytask",
            &cancel,
        )
        .await
        .unwrap();
        drop(tx);
        let line = rx.recv().await.unwrap();
        assert_eq!(line.task, "mytask");
        assert_eq!(line.line, "hi");
    }

    #[tokio::test]
    async fn cancellation_terminates_the_child_and_fails_with_cancelled() {
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        let cancel_trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            cancel_trigger.cancel();
        });
        let err = run_command(&cmd("sleep 5"), "", false, &env, None, "t", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn workdir_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let env = SharedEnv::new();
        let cancel = CancellationToken::new();
        let (tx, mut rx) = channel(8);
        run_command(
            &cmd("ls"),
            dir.path().to_str().unwrap(),
            false,
            &env,
            Some(&tx),
            "t",
            &cancel,
        )
        .await
        .unwrap();
        drop(tx);
        let line = rx.recv().await.unwrap();
        assert_eq!(line.line, "marker");
    }
}
