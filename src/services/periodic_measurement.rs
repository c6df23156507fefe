//! Drives one measurement at a fixed period.
//!
//! The first sample runs as soon as the measurement starts, then one sample
//! per tick. Samples of one measurement never overlap: the loop only waits
//! for the next tick (or the stop signal) once the current sample is done.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::models::{AllowedFailures, MeasurementReport, ResultSet};
use crate::domain::ports::{BaseMeasurement, Clock, Ticker};

enum Lifecycle {
    Idle,
    Running {
        stop_tx: mpsc::Sender<()>,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// A measurement plus its ticker, result set and stop signal.
pub struct PeriodicMeasurement {
    clock: Arc<dyn Clock>,
    period: Duration,
    base: Arc<dyn BaseMeasurement>,
    result_set: Arc<ResultSet>,
    lifecycle: Mutex<Lifecycle>,
}

impl PeriodicMeasurement {
    pub fn new(
        clock: Arc<dyn Clock>,
        period: Duration,
        base: Arc<dyn BaseMeasurement>,
        result_set: ResultSet,
    ) -> Self {
        Self {
            clock,
            period,
            base,
            result_set: Arc::new(result_set),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn result_set(&self) -> &ResultSet {
        &self.result_set
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the sampling task. Only the first call has any effect.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle();
        if !matches!(*lifecycle, Lifecycle::Idle) {
            warn!(measurement = self.name(), "Measurement already started");
            return;
        }

        // Registered before spawning so no tick can be missed.
        let ticker = self.clock.ticker(self.period);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let handle = tokio::spawn(sample_loop(
            self.base.clone(),
            self.result_set.clone(),
            ticker,
            stop_rx,
        ));

        debug!(measurement = self.name(), period = ?self.period, "Measurement started");
        *lifecycle = Lifecycle::Running { stop_tx, handle };
    }

    /// Signal the sampling task and wait for it to finish.
    ///
    /// A sample already in progress runs to completion first.
    pub async fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle(), Lifecycle::Stopped);
        let Lifecycle::Running { stop_tx, handle } = previous else {
            return;
        };

        // A closed channel means the task already ended.
        let _ = stop_tx.send(()).await;
        if let Err(e) = handle.await {
            error!(measurement = self.name(), error = %e, "Measurement task ended abnormally");
        }
        debug!(measurement = self.name(), "Measurement stopped");
    }

    pub fn failed(&self) -> bool {
        self.result_set.failed() > 0
    }

    pub fn summary(&self) -> String {
        let total = self.result_set.total();
        let failed = self.result_set.failed();
        let phrase = self.base.summary_phrase();

        if failed > 0 {
            format!(
                "FAILED({}): {failed} of {total} attempts to {phrase} failed",
                self.name()
            )
        } else {
            format!(
                "SUCCESS({}): All {total} attempts to {phrase} succeeded",
                self.name()
            )
        }
    }

    /// Counters and verdict against this measurement's failure budget.
    pub fn report(&self, allowed_failures: &AllowedFailures) -> MeasurementReport {
        let failed = self.result_set.failed();
        MeasurementReport {
            name: self.name().to_string(),
            summary: self.summary(),
            total: self.result_set.total(),
            successful: self.result_set.successful(),
            failed,
            allowed_failures: allowed_failures.for_measurement(self.name()),
            within_budget: allowed_failures.is_within(self.name(), failed),
        }
    }
}

async fn sample_loop(
    base: Arc<dyn BaseMeasurement>,
    result_set: Arc<ResultSet>,
    mut ticker: Box<dyn Ticker>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    take_sample(base.as_ref(), &result_set).await;

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.recv() => break,
            tick = ticker.tick() => {
                if tick.is_some() {
                    take_sample(base.as_ref(), &result_set).await;
                } else {
                    // The ticker is exhausted; idle until told to stop.
                    let _ = stop_rx.recv().await;
                    break;
                }
            }
        }
    }
}

async fn take_sample(base: &dyn BaseMeasurement, result_set: &ResultSet) {
    let outcome = base.perform_measurement().await;
    if outcome.ok {
        result_set.record_success();
        return;
    }

    result_set.record_failure();
    let name = base.name();
    error!(
        measurement = name,
        "{name}: failed to {}: {}",
        base.summary_phrase(),
        outcome.message
    );
    if !outcome.stdout.is_empty() {
        error!(measurement = name, "stdout:\n```\n{}\n```", outcome.stdout.trim_end());
    }
    if !outcome.stderr.is_empty() {
        error!(measurement = name, "stderr:\n```\n{}\n```", outcome.stderr.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SampleOutcome;
    use crate::infrastructure::clock::ManualClock;
    use async_trait::async_trait;

    struct Fixed(bool);

    #[async_trait]
    impl BaseMeasurement for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn summary_phrase(&self) -> String {
            "do the thing".to_string()
        }

        async fn perform_measurement(&self) -> SampleOutcome {
            if self.0 {
                SampleOutcome::success()
            } else {
                SampleOutcome::failure_with_output("nope", "out", "err")
            }
        }
    }

    fn measurement(ok: bool) -> PeriodicMeasurement {
        let clock = Arc::new(ManualClock::new());
        PeriodicMeasurement::new(
            clock.clone(),
            Duration::from_secs(10),
            Arc::new(Fixed(ok)),
            ResultSet::new(clock),
        )
    }

    #[test]
    fn test_summary_success() {
        let m = measurement(true);
        m.result_set().record_success();
        m.result_set().record_success();

        assert!(!m.failed());
        assert_eq!(m.summary(), "SUCCESS(Fixed): All 2 attempts to do the thing succeeded");
    }

    #[test]
    fn test_summary_failure() {
        let m = measurement(true);
        m.result_set().record_success();
        m.result_set().record_failure();

        assert!(m.failed());
        assert_eq!(m.summary(), "FAILED(Fixed): 1 of 2 attempts to do the thing failed");
    }

    #[test]
    fn test_report_uses_budget() {
        let m = measurement(true);
        m.result_set().record_failure();
        m.result_set().record_failure();

        let tight = m.report(&AllowedFailures::new().with("Fixed", 1));
        assert!(!tight.within_budget);
        assert_eq!(tight.allowed_failures, 1);

        let loose = m.report(&AllowedFailures::new().with("Fixed", 2));
        assert!(loose.within_budget);
        assert_eq!(loose.failed, 2);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let m = measurement(true);
        m.stop().await;
        m.start();
        assert_eq!(m.result_set().total(), 0, "a stopped measurement never starts");
    }

    #[tokio::test]
    async fn test_failed_sample_recorded() {
        let m = measurement(false);
        m.start();
        m.stop().await;

        assert_eq!(m.result_set().failed(), 1);
        assert_eq!(m.result_set().successful(), 0);
    }
}
