use std::sync::Arc;

use async_trait::async_trait;

use super::{CapturedRunner, CommandSource};
use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::{BaseMeasurement, CommandRunner};
use crate::infrastructure::process::CapturedOutput;

/// Printed by `cf app` when the stats backend is down, with exit status 0.
pub const STATS_UNAVAILABLE: &str = "Stats server temporarily unavailable.";

/// Retrieves per-instance stats of the app.
pub struct AppStats {
    commands: CommandSource,
    runner: CapturedRunner,
}

impl AppStats {
    pub fn new(
        commands: CommandSource,
        runner: Arc<dyn CommandRunner>,
        output: CapturedOutput,
    ) -> Self {
        Self {
            commands,
            runner: CapturedRunner::new(runner, output),
        }
    }
}

#[async_trait]
impl BaseMeasurement for AppStats {
    fn name(&self) -> &str {
        MeasurementKind::AppStats.display_name()
    }

    fn summary_phrase(&self) -> String {
        "retrieve stats for app".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        let commands = (self.commands)();
        let run = self.runner.run(&commands, None).await;

        if run.result.is_ok() && run.stderr.contains(STATS_UNAVAILABLE) {
            return SampleOutcome::failure_with_output(
                "Stats server was unavailable",
                run.stdout,
                run.stderr,
            );
        }
        run.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::OutputSink;
    use crate::services::measurements::test_support::{commands, start_error, MockRunner};

    fn stats_writing_stderr(text: &'static str, ok: bool) -> AppStats {
        let output = CapturedOutput::new();
        let stderr = output.stderr_sink();
        let mut runner = MockRunner::new();
        runner.expect_run_in_sequence().returning(move |_| {
            stderr.write_all(text.as_bytes()).unwrap();
            if ok {
                Ok(())
            } else {
                Err(start_error("cf app"))
            }
        });
        AppStats::new(commands(&["app"]), Arc::new(runner), output)
    }

    #[tokio::test]
    async fn test_unavailable_stats_server_fails_successful_run() {
        let measurement = stats_writing_stderr("Stats server temporarily unavailable.\n", true);
        let outcome = measurement.perform_measurement().await;

        assert!(!outcome.ok);
        assert_eq!(outcome.message, "Stats server was unavailable");
        assert!(outcome.stderr.contains(STATS_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_clean_run_succeeds() {
        let measurement = stats_writing_stderr("", true);
        assert!(measurement.perform_measurement().await.ok);
    }

    #[tokio::test]
    async fn test_runner_error_takes_precedence() {
        let measurement = stats_writing_stderr("Stats server temporarily unavailable.", false);
        let outcome = measurement.perform_measurement().await;

        assert!(!outcome.ok);
        assert!(outcome.message.starts_with("failed to start `cf app`"));
    }
}
