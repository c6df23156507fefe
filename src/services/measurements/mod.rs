//! The measurement variants a run can schedule.
//!
//! HTTP and TCP measurements talk to the pushed apps directly. The rest drive the
//! platform CLI through a [`CommandRunner`] whose output lands in a private
//! [`CapturedOutput`], read and reset after every sample.

pub mod app_pushability;
pub mod app_stats;
pub mod http_availability;
pub mod recent_logs;
pub mod streaming_logs;
pub mod syslog_availability;
pub mod tcp_availability;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::errors::RunnerResult;
use crate::domain::models::{CommandSpec, SampleOutcome};
use crate::domain::ports::CommandRunner;
use crate::infrastructure::process::CapturedOutput;

pub use app_pushability::AppPushability;
pub use app_stats::AppStats;
pub use http_availability::HttpAvailability;
pub use recent_logs::RecentLogs;
pub use streaming_logs::{deadline_token, StreamingLogs};
pub use syslog_availability::AppSyslogAvailability;
pub use tcp_availability::TcpAvailability;

/// Produces a fresh command sequence for each sample.
pub type CommandSource = Arc<dyn Fn() -> Vec<CommandSpec> + Send + Sync>;

/// Produces the commands of one streaming sample together with the token
/// that bounds it.
pub type StreamSource = Arc<dyn Fn() -> (CancellationToken, Vec<CommandSpec>) + Send + Sync>;

/// Result of one command sequence plus whatever it printed.
pub(crate) struct CommandRun {
    pub result: RunnerResult<()>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandRun {
    /// Success, or the runner error with both captured streams.
    pub fn into_outcome(self) -> SampleOutcome {
        match self.result {
            Ok(()) => SampleOutcome::success(),
            Err(e) => SampleOutcome::failure_with_output(e.to_string(), self.stdout, self.stderr),
        }
    }
}

/// A runner paired with the buffers its sinks write into.
pub(crate) struct CapturedRunner {
    runner: Arc<dyn CommandRunner>,
    output: CapturedOutput,
}

impl CapturedRunner {
    pub fn new(runner: Arc<dyn CommandRunner>, output: CapturedOutput) -> Self {
        Self { runner, output }
    }

    /// Run `commands`, snapshot the buffers, then reset them.
    pub async fn run(
        &self,
        commands: &[CommandSpec],
        token: Option<&CancellationToken>,
    ) -> CommandRun {
        let result = match token {
            Some(token) => self.runner.run_in_sequence_with_context(token, commands).await,
            None => self.runner.run_in_sequence(commands).await,
        };
        let run = CommandRun {
            result,
            stdout: self.output.stdout(),
            stderr: self.output.stderr(),
        };
        self.output.reset();
        run
    }
}
