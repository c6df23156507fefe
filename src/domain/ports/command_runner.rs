//! Command runner port - sequential execution of external processes.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::RunnerResult;
use crate::domain::models::CommandSpec;

/// Destination for a child's stdout or stderr.
///
/// Sinks are shared between concurrently running commands, so writes must be
/// safe from several tasks at once.
pub trait OutputSink: Send + Sync {
    fn write_all(&self, bytes: &[u8]) -> std::io::Result<()>;
}

/// Runs external commands, streaming their output into the runner's sinks.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Start `command`, drain its output and wait for it to exit.
    ///
    /// A non-zero exit status is an error.
    async fn run(&self, command: &CommandSpec) -> RunnerResult<()>;

    /// Run each command in order, stopping at the first failure.
    async fn run_in_sequence(&self, commands: &[CommandSpec]) -> RunnerResult<()>;

    /// Like [`run_in_sequence`](Self::run_in_sequence), but every command is
    /// tied to `token`.
    ///
    /// Cancelling the token terminates the running command and skips the rest
    /// of the sequence. A command cut short by the token is not an error.
    async fn run_in_sequence_with_context(
        &self,
        token: &CancellationToken,
        commands: &[CommandSpec],
    ) -> RunnerResult<()>;
}
