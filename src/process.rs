//! External process handling.
//!
//! Thin wrapper over `tokio::process` exposing exactly the three operations
//! the media probe needs: start, wait-with-timeout, and forced kill. A probe
//! process that outlives its deadline is killed, not abandoned, so a hung
//! ffprobe cannot leak sockets or child processes across a long run.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

#[derive(Error, Debug)]
pub enum SpawnError {
    /// The binary is not installed or not on PATH.
    #[error("binary not found: {0}")]
    NotFound(String),

    #[error("failed to spawn {0}: {1}")]
    Io(String, std::io::Error),
}

/// Output of a process that ran to completion within its deadline.
pub struct ProcessOutput {
    pub status_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// A spawned child with piped stdout/stderr.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    program: String,
}

/// Spawns `program` with `args`, stdout and stderr piped, stdin closed.
pub fn spawn(program: &str, args: &[&str]) -> Result<ProcessHandle, SpawnError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpawnError::NotFound(program.to_string())
            } else {
                SpawnError::Io(program.to_string(), e)
            }
        })?;

    Ok(ProcessHandle {
        child,
        program: program.to_string(),
    })
}

impl ProcessHandle {
    /// Waits for the process to finish, collecting its output. If `deadline`
    /// elapses first, the process is forcibly killed and `None` is returned.
    pub async fn wait_with_timeout(
        mut self,
        deadline: Duration,
    ) -> std::io::Result<Option<ProcessOutput>> {
        // Drain the pipes on separate tasks; waiting on the child while its
        // stdout fills the pipe buffer would deadlock.
        let stdout_pipe = self.child.stdout.take();
        let stderr_pipe = self.child.stderr.take();
        let stdout_task = tokio::spawn(read_pipe(stdout_pipe));
        let stderr_task = tokio::spawn(read_pipe(stderr_pipe));

        match tokio::time::timeout(deadline, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                let stdout = stdout_task.await.unwrap_or_default();
                let stderr = stderr_task.await.unwrap_or_default();
                Ok(Some(ProcessOutput {
                    status_code: status.code(),
                    stdout,
                    stderr,
                }))
            }
            Err(_) => {
                log::debug!(
                    "{} exceeded {}s deadline, killing",
                    self.program,
                    deadline.as_secs()
                );
                self.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                Ok(None)
            }
        }
    }

    /// Forcibly terminates the process and reaps it.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            log::debug!("kill of {} failed: {e}", self.program);
        }
        let _ = self.child.wait().await;
    }
}

async fn read_pipe<R: tokio::io::AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reports_not_found() {
        let err = spawn("definitely-not-a-real-binary-xyz", &[]).unwrap_err();
        assert!(matches!(err, SpawnError::NotFound(_)));
    }

    #[tokio::test]
    async fn completed_process_returns_output() {
        let handle = spawn("echo", &["hello"]).expect("echo should exist");
        let output = handle
            .wait_with_timeout(Duration::from_secs(5))
            .await
            .expect("wait should not error")
            .expect("echo should finish in time");
        assert!(output.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn hung_process_is_killed_on_deadline() {
        let handle = spawn("sleep", &["30"]).expect("sleep should exist");
        let start = std::time::Instant::now();
        let output = handle
            .wait_with_timeout(Duration::from_millis(200))
            .await
            .expect("wait should not error");
        assert!(output.is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
