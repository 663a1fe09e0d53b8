//! One-shot process execution — spawn, capture, timeout, kill.

use crate::{
    error::{ExecError, Result},
    truncate,
    types::{ExecOutput, RunOptions},
};
use botones_core::config::DIAGNOSTIC_TAIL_CHARS;
use std::ffi::OsStr;
use std::path::PathBuf;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Locate `tool` on PATH.
///
/// Handlers call this before committing any resources so a missing binary
/// surfaces as a "dependency unavailable" reply instead of a late spawn
/// failure halfway through a job.
pub fn probe(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|_| ExecError::ToolMissing {
        tool: tool.to_string(),
    })
}

/// Run `program` with `args`, capture both output streams, and enforce the
/// timeout. Arguments are passed argv-style; no shell is ever involved, so
/// user-supplied values cannot be interpreted as shell syntax.
///
/// A non-zero exit is NOT an error here — callers that branch on tool
/// failure (the merge pipeline's fast path) inspect [`ExecOutput`]
/// themselves. Use [`run_checked`] when non-zero should be an error.
///
/// # Errors
///
/// - `Spawn`   — child could not be spawned.
/// - `Timeout` — child exceeded `options.timeout_secs` (it is SIGKILLed).
/// - `Io`      — underlying I/O failure while waiting.
pub async fn run<I, S>(program: &str, args: I, options: RunOptions) -> Result<ExecOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!("run: {program}");

    let timeout_secs = options.effective_timeout_secs();
    let timeout_duration = std::time::Duration::from_secs(timeout_secs);

    let child = AsyncCommand::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| ExecError::Spawn(format!("{program}: {e}")))?;

    // `wait_with_output` takes the child by value, so we drive it on a
    // spawned task and communicate back via a oneshot channel. The PID is
    // captured first so the timeout path can SIGKILL the process.
    let pid = child.id();
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let _ = tx.send(child.wait_with_output().await);
    });

    match tokio::time::timeout(timeout_duration, rx).await {
        // The task completed within the deadline and sent a result.
        Ok(Ok(Ok(output))) => {
            let exit_code = output.status.code().unwrap_or(-1);
            let stdout =
                truncate::truncate_output(&strip_text(&output.stdout), options.max_output_chars);
            let stderr =
                truncate::truncate_output(&strip_text(&output.stderr), options.max_output_chars);
            Ok(ExecOutput {
                exit_code,
                stdout,
                stderr,
            })
        }

        // wait_with_output() returned an I/O error.
        Ok(Ok(Err(e))) => Err(ExecError::Io(e)),

        // The oneshot channel was dropped — the spawned task panicked.
        Ok(Err(_recv_err)) => Err(ExecError::Spawn(
            "wait task panicked unexpectedly".to_string(),
        )),

        // Deadline expired — kill the child via its PID.
        Err(_elapsed) => {
            if let Some(raw_pid) = pid {
                // Safety: raw_pid is our direct child, still running.
                #[cfg(unix)]
                unsafe {
                    libc::kill(raw_pid as libc::pid_t, libc::SIGKILL);
                }
            }
            Err(ExecError::Timeout {
                ms: timeout_secs * 1_000,
            })
        }
    }
}

/// Run and require a zero exit code.
///
/// A non-zero exit maps to [`ExecError::NonZero`] carrying a bounded tail of
/// stderr (or stdout when stderr is empty), ready for direct display.
pub async fn run_checked<I, S>(program: &str, args: I, options: RunOptions) -> Result<ExecOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(program, args, options).await?;
    if output.success() {
        return Ok(output);
    }

    let source = if output.stderr.trim().is_empty() {
        &output.stdout
    } else {
        &output.stderr
    };
    Err(ExecError::NonZero {
        code: output.exit_code,
        detail: truncate::tail_chars(source.trim(), DIAGNOSTIC_TAIL_CHARS),
    })
}

/// Strip ANSI escape codes and convert bytes to a UTF-8 string.
fn strip_text(raw: &[u8]) -> String {
    let clean = strip_ansi_escapes::strip(raw);
    String::from_utf8_lossy(&clean).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_round_trips() {
        let out = run("echo", ["hola"], RunOptions::default()).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hola");
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_an_error_for_run() {
        let out = run("false", std::iter::empty::<&str>(), RunOptions::default())
            .await
            .unwrap();
        assert!(!out.success());
    }

    #[tokio::test]
    async fn run_checked_maps_nonzero_to_error() {
        let err = run_checked("false", std::iter::empty::<&str>(), RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::NonZero { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = run(
            "definitely-not-a-real-binary-xyz",
            std::iter::empty::<&str>(),
            RunOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Spawn(_)));
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let err = run(
            "sleep",
            ["5"],
            RunOptions {
                timeout_secs: 1,
                ..RunOptions::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { ms: 1_000 }));
    }

    #[test]
    fn probe_finds_sh_but_not_nonsense() {
        assert!(probe("sh").is_ok());
        assert!(matches!(
            probe("definitely-not-a-real-binary-xyz"),
            Err(ExecError::ToolMissing { .. })
        ));
    }
}
