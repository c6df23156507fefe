use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio::sync::mpsc;

use crate::domain::ports::{Clock, Ticker};

struct RegisteredTicker {
    period: TimeDelta,
    next: DateTime<Utc>,
    tx: mpsc::UnboundedSender<DateTime<Utc>>,
}

struct ManualState {
    now: DateTime<Utc>,
    tickers: Vec<RegisteredTicker>,
}

/// Virtual clock for deterministic tests.
///
/// Time only moves on [`advance`](Self::advance). Tickers fire for every
/// period boundary crossed, so advancing by `k` periods queues `k` ticks.
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl ManualClock {
    /// A clock frozen at 2017-01-01T00:00:00Z.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now,
                tickers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move time forward, delivering every tick that falls due.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.now += TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let now = state.now;

        state.tickers.retain_mut(|ticker| {
            while ticker.next <= now {
                if ticker.tx.send(ticker.next).is_err() {
                    return false;
                }
                ticker.next += ticker.period;
            }
            true
        });
    }

    /// Number of tickers still listening.
    pub fn ticker_count(&self) -> usize {
        self.lock()
            .tickers
            .iter()
            .filter(|ticker| !ticker.tx.is_closed())
            .count()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    fn ticker(&self, period: Duration) -> Box<dyn Ticker> {
        let (tx, rx) = mpsc::unbounded_channel();
        let period = TimeDelta::from_std(period).unwrap_or(TimeDelta::MAX);

        // A zero period would fire forever; such a ticker simply never ticks.
        if period > TimeDelta::zero() {
            let mut state = self.lock();
            let next = state.now + period;
            state.tickers.push(RegisteredTicker { period, next, tx });
        }

        Box::new(ManualTicker { rx })
    }
}

struct ManualTicker {
    rx: mpsc::UnboundedReceiver<DateTime<Utc>>,
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> Option<DateTime<Utc>> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_only_moves_on_advance() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now(), start + TimeDelta::seconds(90));
    }

    #[tokio::test]
    async fn test_ticker_fires_once_per_period_crossed() {
        let clock = ManualClock::new();
        let start = clock.now();
        let mut ticker = clock.ticker(Duration::from_secs(10));

        clock.advance(Duration::from_secs(9));
        clock.advance(Duration::from_secs(21));

        assert_eq!(ticker.tick().await, Some(start + TimeDelta::seconds(10)));
        assert_eq!(ticker.tick().await, Some(start + TimeDelta::seconds(20)));
        assert_eq!(ticker.tick().await, Some(start + TimeDelta::seconds(30)));

        let pending = tokio::time::timeout(Duration::from_millis(20), ticker.tick()).await;
        assert!(pending.is_err(), "no tick should be due yet");
    }

    #[tokio::test]
    async fn test_dropped_tickers_are_forgotten() {
        let clock = ManualClock::new();
        let ticker = clock.ticker(Duration::from_secs(1));
        assert_eq!(clock.ticker_count(), 1);

        drop(ticker);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.ticker_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_period_ticker_never_fires() {
        let clock = ManualClock::new();
        let mut ticker = clock.ticker(Duration::ZERO);
        clock.advance(Duration::from_secs(5));

        assert_eq!(ticker.tick().await, None);
    }
}
