use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{CapturedRunner, CommandSource};
use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::{BaseMeasurement, CommandRunner};
use crate::infrastructure::process::CapturedOutput;
use crate::services::app_log_validator::AppLogValidator;

/// Reads what the syslog sink app received through the drain.
///
/// The sink prints every drained message, so its own recent logs carry the
/// main app's epoch lines.
pub struct AppSyslogAvailability {
    commands: CommandSource,
    runner: CapturedRunner,
    validator: Mutex<AppLogValidator>,
}

impl AppSyslogAvailability {
    pub fn new(
        commands: CommandSource,
        runner: Arc<dyn CommandRunner>,
        output: CapturedOutput,
        validator: AppLogValidator,
    ) -> Self {
        Self {
            commands,
            runner: CapturedRunner::new(runner, output),
            validator: Mutex::new(validator),
        }
    }
}

#[async_trait]
impl BaseMeasurement for AppSyslogAvailability {
    fn name(&self) -> &str {
        MeasurementKind::AppSyslogAvailability.display_name()
    }

    fn summary_phrase(&self) -> String {
        "get logs from syslog drain".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        let commands = (self.commands)();
        let run = self.runner.run(&commands, None).await;
        if run.result.is_err() {
            return run.into_outcome();
        }

        let verdict = self
            .validator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_newer(&run.stdout);

        match verdict {
            Ok(true) => SampleOutcome::success(),
            Ok(false) => SampleOutcome::failure_with_output(
                "App syslog fetched was not newer than previous app syslog fetched",
                run.stdout,
                run.stderr,
            ),
            Err(e) => SampleOutcome::failure_with_output(
                format!("App syslog validation failed with: {e}"),
                run.stdout,
                run.stderr,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::OutputSink;
    use crate::services::measurements::test_support::{commands, MockRunner};

    #[tokio::test]
    async fn test_drained_epochs_must_advance() {
        let output = CapturedOutput::new();
        let stdout = output.stdout_sink();
        let mut epoch = 1_500_000_000u64;
        let mut runner = MockRunner::new();
        runner.expect_run_in_sequence().returning(move |_| {
            let line = format!("2017-01-01T00:00:00.00+0000 [APP/PROC/WEB/0] OUT {epoch}\n");
            stdout.write_all(line.as_bytes()).unwrap();
            epoch += u64::from(epoch < 1_500_000_002);
            Ok(())
        });

        let measurement = AppSyslogAvailability::new(
            commands(&["logs"]),
            Arc::new(runner),
            output,
            AppLogValidator::new(),
        );

        assert!(measurement.perform_measurement().await.ok);
        assert!(measurement.perform_measurement().await.ok);
        assert!(measurement.perform_measurement().await.ok);
        // Epoch stopped moving: the drain is stale.
        let outcome = measurement.perform_measurement().await;
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            "App syslog fetched was not newer than previous app syslog fetched"
        );
    }

    #[tokio::test]
    async fn test_no_drained_lines() {
        let mut runner = MockRunner::new();
        runner.expect_run_in_sequence().returning(|_| Ok(()));

        let measurement = AppSyslogAvailability::new(
            commands(&["logs"]),
            Arc::new(runner),
            CapturedOutput::new(),
            AppLogValidator::new(),
        );
        let outcome = measurement.perform_measurement().await;

        assert_eq!(
            outcome.message,
            "App syslog validation failed with: cannot find any app logs"
        );
        assert_eq!(measurement.summary_phrase(), "get logs from syslog drain");
    }
}
