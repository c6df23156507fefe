//! Sequential process runner.
//!
//! Spawns each command with piped stdout/stderr, drains both pipes into the
//! runner's sinks until EOF, then waits for exit. Draining before waiting
//! keeps a chatty child from blocking on a full pipe.
//!
//! A cancellable command runs in its own process group. Cancellation
//! terminates the whole group, whether the command is still writing output
//! or has already closed its pipes.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::ConsoleSink;
use crate::domain::errors::{RunnerError, RunnerResult};
use crate::domain::models::CommandSpec;
use crate::domain::ports::{CommandRunner, OutputSink};

const COPY_BUFFER_SIZE: usize = 8 * 1024;
const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_secs(5);

/// Runs commands one at a time, multiplexing their output into two sinks.
pub struct ProcessRunner {
    stdout: Arc<dyn OutputSink>,
    stderr: Arc<dyn OutputSink>,
    termination_grace: Duration,
}

impl ProcessRunner {
    pub fn new(stdout: Arc<dyn OutputSink>, stderr: Arc<dyn OutputSink>) -> Self {
        Self {
            stdout,
            stderr,
            termination_grace: DEFAULT_TERMINATION_GRACE,
        }
    }

    /// Runner writing to this process's own stdout and stderr.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink::stdout()), Arc::new(ConsoleSink::stderr()))
    }

    /// How long a cancelled command gets after SIGTERM before it is killed.
    pub const fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    async fn execute(
        &self,
        command: &CommandSpec,
        token: Option<&CancellationToken>,
    ) -> RunnerResult<()> {
        let label = command.to_string();
        debug!(command = %label, "Running command");

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Cancellable commands get their own process group so termination
        // reaches every descendant holding the pipes.
        #[cfg(unix)]
        if token.is_some() {
            process.process_group(0);
        }

        let mut child = process.spawn().map_err(|source| RunnerError::Start {
            command: label.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| RunnerError::MissingPipe {
            command: label.clone(),
            stream: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or_else(|| RunnerError::MissingPipe {
            command: label.clone(),
            stream: "stderr",
        })?;

        let pumps = futures::future::join(
            copy_into(stdout, self.stdout.clone()),
            copy_into(stderr, self.stderr.clone()),
        );
        tokio::pin!(pumps);

        let Some(token) = token else {
            let copies = (&mut pumps).await;
            let status = child.wait().await;
            return completion(label, copies, status);
        };

        // Drain then wait, both under the token.
        let finished = tokio::select! {
            done = async {
                let copies = (&mut pumps).await;
                (copies, child.wait().await)
            } => Some(done),
            () = token.cancelled() => None,
        };

        if let Some((copies, status)) = finished {
            return completion(label, copies, status);
        }

        debug!(command = %label, "Cancellation requested, terminating command");
        self.terminate(&mut child, &label).await;

        match tokio::time::timeout(self.termination_grace, &mut pumps).await {
            Ok((stdout_copy, stderr_copy)) => {
                copy_results(&label, stdout_copy, stderr_copy)?;
            }
            Err(_) => {
                warn!(
                    command = %label,
                    "Output pipes still open after termination, abandoning them"
                );
            }
        }

        debug!(command = %label, "Command ended by cancellation");
        Ok(())
    }

    /// SIGTERM to the command's process group, SIGKILL once the grace
    /// period runs out. Stragglers left in the group are killed as well.
    async fn terminate(&self, child: &mut Child, label: &str) {
        #[cfg(unix)]
        let group = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .map(nix::unistd::Pid::from_raw);

        #[cfg(unix)]
        if let Some(group) = group {
            use nix::sys::signal::{killpg, Signal};

            if let Err(e) = killpg(group, Signal::SIGTERM) {
                warn!(command = %label, error = %e, "Failed to send SIGTERM");
            }
        }

        #[cfg(not(unix))]
        if let Err(e) = child.start_kill() {
            warn!(command = %label, error = %e, "Failed to send kill signal");
        }

        match tokio::time::timeout(self.termination_grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(command = %label, %status, "Command exited after termination request");
            }
            Ok(Err(e)) => {
                warn!(command = %label, error = %e, "Error waiting for command to exit");
            }
            Err(_) => {
                warn!(command = %label, "Termination grace period expired, forcing kill");
                if let Err(e) = child.kill().await {
                    warn!(command = %label, error = %e, "Failed to kill command");
                }
            }
        }

        // The group id cannot be reused while any member is alive, so this
        // only reaches descendants of the command. ESRCH means none are left.
        #[cfg(unix)]
        if let Some(group) = group {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};

            match killpg(group, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!(command = %label, error = %e, "Failed to kill process group"),
            }
        }
    }
}

fn copy_results(
    label: &str,
    stdout_copy: io::Result<u64>,
    stderr_copy: io::Result<u64>,
) -> RunnerResult<()> {
    stdout_copy.map_err(|source| RunnerError::CopyStdout {
        command: label.to_string(),
        source,
    })?;
    stderr_copy.map_err(|source| RunnerError::CopyStderr {
        command: label.to_string(),
        source,
    })?;
    Ok(())
}

/// Outcome of a command that ran to exit, in error precedence order.
fn completion(
    label: String,
    (stdout_copy, stderr_copy): (io::Result<u64>, io::Result<u64>),
    status: io::Result<ExitStatus>,
) -> RunnerResult<()> {
    copy_results(&label, stdout_copy, stderr_copy)?;

    let status = status.map_err(|source| RunnerError::Wait {
        command: label.clone(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::ExitStatus {
            command: label,
            status,
        })
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> RunnerResult<()> {
        self.execute(command, None).await
    }

    async fn run_in_sequence(&self, commands: &[CommandSpec]) -> RunnerResult<()> {
        for command in commands {
            self.execute(command, None).await?;
        }
        Ok(())
    }

    async fn run_in_sequence_with_context(
        &self,
        token: &CancellationToken,
        commands: &[CommandSpec],
    ) -> RunnerResult<()> {
        for command in commands {
            if token.is_cancelled() {
                debug!(command = %command, "Sequence cancelled, skipping command");
                return Ok(());
            }
            self.execute(command, Some(token)).await?;
        }
        Ok(())
    }
}

async fn copy_into<R>(mut reader: R, sink: Arc<dyn OutputSink>) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(copied);
        }
        sink.write_all(&buf[..n])?;
        copied += n as u64;
    }
}
