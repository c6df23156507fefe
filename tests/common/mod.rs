//! Common test utilities for integration tests
//!
//! Provides shared fixtures, a mock command runner and scripted measurements used
//! across multiple integration test files.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use platform_uptime::domain::errors::{RunnerError, RunnerResult};
use platform_uptime::{BaseMeasurement, CommandRunner, CommandSpec, SampleOutcome};
use tokio_util::sync::CancellationToken;

mock! {
    pub Runner {}

    #[async_trait]
    impl CommandRunner for Runner {
        async fn run(&self, command: &CommandSpec) -> RunnerResult<()>;
        async fn run_in_sequence(&self, commands: &[CommandSpec]) -> RunnerResult<()>;
        async fn run_in_sequence_with_context(
            &self,
            token: &CancellationToken,
            commands: &[CommandSpec],
        ) -> RunnerResult<()>;
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 10ms until it returns true or timeout is reached.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    predicate()
}

/// A runner error as produced by a missing executable.
pub fn start_error(command: &str) -> RunnerError {
    RunnerError::Start {
        command: command.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
    }
}

/// Measurement that replays a fixed list of verdicts, then keeps succeeding.
pub struct ScriptedMeasurement {
    name: String,
    script: Vec<bool>,
    calls: AtomicUsize,
}

impl ScriptedMeasurement {
    pub fn new(name: &str, script: Vec<bool>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseMeasurement for ScriptedMeasurement {
    fn name(&self) -> &str {
        &self.name
    }

    fn summary_phrase(&self) -> String {
        "run the script".to_string()
    }

    async fn perform_measurement(&self) -> SampleOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.script.get(call).copied().unwrap_or(true) {
            SampleOutcome::success()
        } else {
            SampleOutcome::failure(format!("scripted failure #{call}"))
        }
    }
}
