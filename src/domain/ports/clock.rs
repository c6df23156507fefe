//! Clock port - the single time source behind all scheduling.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of the current time and of periodic tickers.
///
/// Production code uses the wall clock; tests use a manually advanced clock
/// so timing behaviour is deterministic.
pub trait Clock: Send + Sync {
    /// Current instant, in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Create a ticker whose first tick is one `period` from now.
    ///
    /// Must be called from within a tokio runtime.
    fn ticker(&self, period: Duration) -> Box<dyn Ticker>;
}

/// Periodic tick source created by a [`Clock`].
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick.
    ///
    /// Returns `None` once the ticker can never fire again.
    async fn tick(&mut self) -> Option<DateTime<Utc>>;
}
