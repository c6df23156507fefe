use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::domain::ports::Clock;

#[derive(Debug, Default)]
struct Samples {
    successes: Vec<DateTime<Utc>>,
    failures: Vec<DateTime<Utc>>,
}

/// Append-only record of sample outcomes for one measurement.
///
/// Every operation takes a short lock, so a reader can call the counters
/// while the owning measurement task appends.
pub struct ResultSet {
    clock: Arc<dyn Clock>,
    samples: Mutex<Samples>,
}

impl ResultSet {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            samples: Mutex::new(Samples::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Samples> {
        // Appends never leave the vectors half-written, so a poisoned lock is
        // still consistent.
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_success(&self) {
        let now = self.clock.now();
        self.lock().successes.push(now);
    }

    pub fn record_failure(&self) {
        let now = self.clock.now();
        self.lock().failures.push(now);
    }

    pub fn successful(&self) -> usize {
        self.lock().successes.len()
    }

    pub fn failed(&self) -> usize {
        self.lock().failures.len()
    }

    pub fn total(&self) -> usize {
        let samples = self.lock();
        samples.successes.len() + samples.failures.len()
    }

    pub fn last_failure(&self) -> Option<DateTime<Utc>> {
        self.lock().failures.last().copied()
    }

    /// Successes strictly after the most recent failure; 0 with no failures.
    pub fn successes_since_last_failure(&self) -> usize {
        let samples = self.lock();
        let Some(last_failure) = samples.failures.last() else {
            return 0;
        };
        samples
            .successes
            .iter()
            .filter(|success| *success > last_failure)
            .count()
    }
}

impl std::fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let samples = self.lock();
        f.debug_struct("ResultSet")
            .field("successful", &samples.successes.len())
            .field("failed", &samples.failures.len())
            .finish()
    }
}
