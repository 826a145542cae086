//! Clock Source
//!
//! Keeps [`ClockState`] current on a fixed cadence and renders it in one
//! fixed timezone, whatever timezone the engine itself runs in.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::ClockConfig;
use crate::host::WallClock;
use crate::subscription::TaskGuard;

/// Latest instant observed by the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Instant of the last tick
    pub now: DateTime<Utc>,
}

/// Fixed display zone for [`format_time`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockFormat {
    offset: FixedOffset,
    label: String,
}

impl ClockFormat {
    /// Build a format from an offset in seconds east of UTC and a label.
    ///
    /// Offsets of a day or more fall back to UTC.
    #[must_use]
    pub fn new(utc_offset_secs: i32, label: impl Into<String>) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| {
            tracing::warn!(utc_offset_secs, "UTC offset out of range, using UTC");
            Utc.fix()
        });
        Self {
            offset,
            label: label.into(),
        }
    }

    /// Build from the clock section of the engine config
    #[must_use]
    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(config.utc_offset_secs, config.zone_label.clone())
    }

    /// Zone label appended to formatted times
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for ClockFormat {
    fn default() -> Self {
        Self::from_config(&ClockConfig::default())
    }
}

/// Render `hh:mm AM` in the format's zone, followed by its label.
///
/// Total over every representable instant.
#[must_use]
pub fn format_time(instant: DateTime<Utc>, format: &ClockFormat) -> String {
    let local = instant.with_timezone(&format.offset);
    format!("{} {}", local.format("%I:%M %p"), format.label)
}

/// Periodic clock producer
pub struct ClockSource {
    clock: Arc<dyn WallClock>,
    period: Duration,
}

impl ClockSource {
    /// Create a clock source ticking every `period`
    pub fn new(clock: Arc<dyn WallClock>, period: Duration) -> Self {
        Self { clock, period }
    }

    /// Current state without waiting for a tick
    #[must_use]
    pub fn sample(&self) -> ClockState {
        ClockState {
            now: self.clock.now(),
        }
    }

    /// Spawn the tick task.
    ///
    /// The state is refreshed immediately and then once per period. Dropping
    /// the returned guard stops the timer. Must be called inside a tokio
    /// runtime.
    pub fn spawn(&self, state: Arc<watch::Sender<ClockState>>) -> TaskGuard {
        let clock = Arc::clone(&self.clock);
        let period = self.period;

        tracing::debug!(period_ms = period.as_millis() as u64, "Starting clock");

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let now = clock.now();
                state.send_replace(ClockState { now });
                tracing::trace!(%now, "Clock tick");
            }
        });

        TaskGuard::new("clock", handle)
    }
}

impl std::fmt::Debug for ClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockSource")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualClock;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_format_in_fixed_zone() {
        let format = ClockFormat::default();
        // 11:05 UTC is 21:05 in UTC+10
        assert_eq!(format_time(utc(11, 5), &format), "09:05 PM AEST");
        // 22:30 UTC rolls over to 08:30 the next morning
        assert_eq!(format_time(utc(22, 30), &format), "08:30 AM AEST");
    }

    #[test]
    fn test_format_midnight_and_noon() {
        let format = ClockFormat::new(0, "UTC");
        assert_eq!(format_time(utc(0, 0), &format), "12:00 AM UTC");
        assert_eq!(format_time(utc(12, 0), &format), "12:00 PM UTC");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let format = ClockFormat::new(90_000, "X");
        assert_eq!(format_time(utc(3, 15), &format), "03:15 AM X");
    }

    #[test]
    fn test_every_minute_of_the_day_formats() {
        let format = ClockFormat::default();
        for minute in 0..24 * 60 {
            let text = format_time(utc(0, 0) + chrono::Duration::minutes(minute), &format);
            assert_eq!(text.len(), "hh:mm AM AEST".len(), "{text}");
            assert!(text.ends_with(" AEST"));
        }
    }

    #[test]
    fn test_state_serializes_as_rfc3339() {
        let state = ClockState { now: utc(11, 5) };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["now"], "2025-01-01T11:05:00Z");

        let back: ClockState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticks_every_period() {
        let manual = Arc::new(ManualClock::new(utc(0, 0)));
        let source = ClockSource::new(manual.clone(), Duration::from_secs(1));
        let (tx, mut rx) = watch::channel(source.sample());

        let guard = source.spawn(Arc::new(tx));

        // First tick fires immediately
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().now, utc(0, 0));

        manual.advance(chrono::Duration::minutes(1));
        tokio::time::sleep(Duration::from_millis(1_010)).await;
        assert_eq!(rx.borrow_and_update().now, utc(0, 1));

        drop(guard);
        manual.advance(chrono::Duration::minutes(1));
        tokio::time::sleep(Duration::from_secs(5)).await;
        // Stopped: no tick observed the second advance
        assert_eq!(rx.borrow().now, utc(0, 1));
    }
}
