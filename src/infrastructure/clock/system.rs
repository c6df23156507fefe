use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::domain::ports::{Clock, Ticker};

/// Real clock: UTC read once at construction, advanced by a monotonic timer.
///
/// Timestamps never go backwards, even when the system wall clock is stepped.
/// Tickers skip missed ticks: a sample that overruns its period is followed
/// by at most one immediate sample, never a burst of catch-up samples.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    anchor_utc: DateTime<Utc>,
    anchor: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor_utc: Utc::now(),
            anchor: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.anchor.elapsed()).unwrap_or(TimeDelta::MAX);
        self.anchor_utc
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn ticker(&self, period: Duration) -> Box<dyn Ticker> {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Box::new(IntervalTicker {
            clock: *self,
            interval,
        })
    }
}

struct IntervalTicker {
    clock: SystemClock,
    interval: Interval,
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> Option<DateTime<Utc>> {
        self.interval.tick().await;
        Some(self.clock.now())
    }
}
