//! Synchronous child-process execution with hard timeouts.
//!
//! A command that outlives its budget is killed and reported as
//! `ClaraError::CommandTimedOut`, which callers treat exactly like a
//! non-zero exit.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use clara_common::error::{ClaraError, Result};

const POLL_INTERVAL_MS: u64 = 50;

/// Runs external programs on behalf of the prober and the deployment driver.
pub trait CommandRunner {
    /// Runs `program` with captured output and returns its trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, exits non-zero,
    /// or does not finish within `timeout`.
    fn capture(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String>;

    /// Runs `program` with stdio attached to the operator's terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, exits non-zero,
    /// or does not finish within `timeout`.
    fn stream(&self, program: &str, args: &[&str], timeout: Duration) -> Result<()>;
}

/// [`CommandRunner`] backed by real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn capture(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String> {
        tracing::debug!(program, ?args, "running captured command");

        let deadline = Instant::now() + timeout;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_with_timeout(&mut child, program, timeout)?;

        if !status.success() {
            let stderr = collect_output(stderr.as_ref(), deadline).unwrap_or_default();
            tracing::debug!(program, stderr = %stderr.trim(), "command failed");
            return Err(ClaraError::CommandFailed {
                program: program.into(),
                code: status.code(),
            });
        }

        // A background process spawned by the command can keep the pipe open
        // after the command itself exited.
        let Some(stdout) = collect_output(stdout.as_ref(), deadline) else {
            tracing::warn!(program, "command output still open after timeout");
            return Err(timed_out(program, timeout));
        };
        Ok(stdout.trim().to_owned())
    }

    fn stream(&self, program: &str, args: &[&str], timeout: Duration) -> Result<()> {
        tracing::info!(program, ?args, "running streamed command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let status = wait_with_timeout(&mut child, program, timeout)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClaraError::CommandFailed {
                program: program.into(),
                code: status.code(),
            })
        }
    }
}

fn spawn_error(program: &str, source: std::io::Error) -> ClaraError {
    ClaraError::Spawn {
        program: program.into(),
        source,
    }
}

fn timed_out(program: &str, timeout: Duration) -> ClaraError {
    ClaraError::CommandTimedOut {
        program: program.into(),
        timeout_secs: timeout.as_secs(),
    }
}

/// Reads a pipe to completion on a helper thread so the child never blocks
/// on a full pipe buffer while we poll for its exit.
///
/// The thread is detached: if something else still holds the pipe open it
/// finishes whenever that process does, and its result is dropped.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        let _ = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Waits for a drained pipe until `deadline`.
///
/// Returns `None` if the pipe is still open at the deadline. A missing pipe
/// or a reader that died reads as empty output.
fn collect_output(output: Option<&Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(rx) = output else {
        return Some(String::new());
    };
    // Short grace so a command finishing right at the deadline keeps its output.
    let remaining = deadline
        .saturating_duration_since(Instant::now())
        .max(Duration::from_millis(POLL_INTERVAL_MS));
    match rx.recv_timeout(remaining) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
    }
}

fn wait_with_timeout(child: &mut Child, program: &str, timeout: Duration) -> Result<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program, timeout_secs = timeout.as_secs(), "command timed out");
                return Err(timed_out(program, timeout));
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS)),
            Err(e) => {
                let _ = child.kill();
                return Err(spawn_error(program, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_names_program() {
        let err = SystemRunner
            .capture("clara-no-such-binary", &[], Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ClaraError::Spawn { ref program, .. } if program == "clara-no-such-binary"));
    }

    #[test]
    fn stream_reports_spawn_error() {
        let err = SystemRunner
            .stream("clara-no-such-binary", &[], Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ClaraError::Spawn { .. }));
    }

    #[test]
    fn missing_pipe_collects_as_empty() {
        assert_eq!(collect_output(None, Instant::now()).as_deref(), Some(""));
    }

    #[test]
    fn open_pipe_past_deadline_collects_nothing() {
        let (tx, rx) = mpsc::channel::<String>();
        let start = Instant::now();
        assert_eq!(collect_output(Some(&rx), start + Duration::from_millis(100)), None);
        assert!(start.elapsed() < Duration::from_secs(2));
        drop(tx);
    }

    #[test]
    fn finished_reader_collects_its_text() {
        let rx = drain(Some(&b"clara\n"[..])).unwrap();
        let text = collect_output(Some(&rx), Instant::now() + Duration::from_secs(5));
        assert_eq!(text.as_deref(), Some("clara\n"));
    }
}
