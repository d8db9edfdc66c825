//! Tick schedule
//!
//! Produces the stream of ticks the engine runs on: the first tick on the
//! next wall-clock multiple of the interval (the next minute boundary for
//! the default 60 s), then one tick per interval for as long as the stream
//! is polled.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;

use crate::config::ScheduleConfig;

/// Time from `now` to the next instant that is a whole multiple of
/// `interval` since the Unix epoch.
///
/// An instant exactly on a boundary waits a full interval, matching cron's
/// "next strictly after now" rule.
pub fn delay_until_next_boundary(now: DateTime<Utc>, interval: Duration) -> Duration {
    let period_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX).max(1);
    let into_period = now.timestamp_millis().rem_euclid(period_ms);

    Duration::from_millis((period_ms - into_period) as u64)
}

/// Tick schedule built from [`ScheduleConfig`]
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    align_to_boundary: bool,
}

impl Schedule {
    /// Create a schedule from configuration
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            interval: config.interval(),
            align_to_boundary: config.align_to_boundary,
        }
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay before the first tick when starting at `now`
    pub fn first_delay(&self, now: DateTime<Utc>) -> Duration {
        if self.align_to_boundary {
            delay_until_next_boundary(now, self.interval)
        } else {
            Duration::ZERO
        }
    }

    /// Start the tick stream
    ///
    /// A tick that is late because the previous one ran long is delayed, not
    /// replayed, so ticks never burst.
    pub fn ticks(&self) -> IntervalStream {
        let start = Instant::now() + self.first_delay(Utc::now());
        let mut interval = tokio::time::interval_at(start, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        IntervalStream::new(interval)
    }
}
