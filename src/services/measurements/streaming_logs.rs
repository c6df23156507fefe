use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{CapturedRunner, StreamSource};
use crate::domain::models::{MeasurementKind, SampleOutcome};
use crate::domain::ports::{BaseMeasurement, CommandRunner};
use crate::infrastructure::process::CapturedOutput;
use crate::services::app_log_validator::AppLogValidator;

/// A token that cancels itself once `window` has passed.
///
/// The timer task exits early if the token is cancelled by someone else.
pub fn deadline_token(window: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let deadline = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(window) => deadline.cancel(),
            () = deadline.cancelled() => {}
        }
    });
    token
}

/// Tails the app's logs for a bounded window and checks they advanced.
pub struct StreamingLogs {
    source: StreamSource,
    runner: CapturedRunner,
    validator: Mutex<AppLogValidator>,
}

impl StreamingLogs {
    pub fn new(
        source: StreamSource,
        runner: Arc<dyn CommandRunner>,
        output: CapturedOutput,
        validator: AppLogValidator,
    ) -> Self {
        Self {
            source,
            runner: CapturedRunner::new(runner, output),
            validator: Mutex::new(validator),
        }
    }
}

#[async_trait]
impl BaseMeasurement for StreamingLogs {
    fn name(&self) -> &str {
        MeasurementKind::StreamingLogs.display_name()
    }

    fn summary_phrase(&self) -> String {
        "stream logs".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        let (token, commands) = (self.source)();
        // The stream must never outlive the sample.
        let _cancel_on_exit = token.clone().drop_guard();

        let run = self.runner.run(&commands, Some(&token)).await;
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
                "App log fetched was not newer than previous app log fetched",
                run.stdout,
                run.stderr,
            ),
            Err(e) => SampleOutcome::failure_with_output(
                format!("App log validation failed with: {e}"),
                run.stdout,
                run.stderr,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CommandSpec;
    use crate::domain::ports::OutputSink;
    use crate::services::measurements::test_support::{start_error, MockRunner};

    fn source(captured: Arc<Mutex<Option<CancellationToken>>>) -> StreamSource {
        Arc::new(move || {
            let token = CancellationToken::new();
            *captured.lock().unwrap() = Some(token.clone());
            (token, vec![CommandSpec::new("cf").arg("logs")])
        })
    }

    fn runner_printing(lines: &'static [&'static str], output: &CapturedOutput) -> MockRunner {
        let stdout = output.stdout_sink();
        let mut next = 0;
        let mut runner = MockRunner::new();
        runner
            .expect_run_in_sequence_with_context()
            .returning(move |_, _| {
                stdout.write_all(lines[next].as_bytes()).unwrap();
                next += 1;
                Ok(())
            });
        runner
    }

    #[tokio::test]
    async fn test_stale_logs_fail_with_exact_message() {
        let output = CapturedOutput::new();
        let runner = runner_printing(&["[APP OUT 20\n", "[APP OUT 20\n"], &output);
        let measurement = StreamingLogs::new(
            source(Arc::default()),
            Arc::new(runner),
            output.clone(),
            AppLogValidator::new(),
        );

        assert!(measurement.perform_measurement().await.ok);
        let outcome = measurement.perform_measurement().await;
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            "App log fetched was not newer than previous app log fetched"
        );
        assert_eq!(output.stdout(), "", "buffers reset after every sample");
    }

    #[tokio::test]
    async fn test_validator_error_is_wrapped() {
        let output = CapturedOutput::new();
        let runner = runner_printing(&["Connected, tailing logs...\n"], &output);
        let measurement = StreamingLogs::new(
            source(Arc::default()),
            Arc::new(runner),
            output,
            AppLogValidator::new(),
        );

        let outcome = measurement.perform_measurement().await;
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            "App log validation failed with: cannot find any app logs"
        );
    }

    #[tokio::test]
    async fn test_token_cancelled_when_sample_ends() {
        let captured = Arc::new(Mutex::new(None));
        let mut runner = MockRunner::new();
        runner
            .expect_run_in_sequence_with_context()
            .withf(|token, _| !token.is_cancelled())
            .returning(|_, _| Err(start_error("cf logs")));

        let measurement = StreamingLogs::new(
            source(captured.clone()),
            Arc::new(runner),
            CapturedOutput::new(),
            AppLogValidator::new(),
        );
        let outcome = measurement.perform_measurement().await;

        assert!(!outcome.ok);
        let token = captured.lock().unwrap().clone().unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_deadline_token_fires_after_window() {
        let token = deadline_token(Duration::from_millis(20));
        assert!(!token.is_cancelled());
        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .unwrap();
    }
}
