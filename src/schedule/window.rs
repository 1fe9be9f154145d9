//! Polling windows: aligned slices of the host day.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};

use crate::constants::{DEFAULT_WINDOW_MINUTES, MINUTES_PER_DAY};
use crate::error::{Error, Result};

/// A slice width that evenly partitions the day.
///
/// With a 60-minute width the slices are `[00:00, 01:00)`, `[01:00, 02:00)`
/// and so on; an entry is due when it falls in the slice containing "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingWindow {
    minutes: u32,
}

impl PollingWindow {
    /// Create a window `minutes` wide.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `minutes` is positive and
    /// divides a day.
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 || MINUTES_PER_DAY % minutes != 0 {
            return Err(Error::Config(format!(
                "polling window of {minutes} minutes does not evenly divide a day"
            )));
        }
        Ok(Self { minutes })
    }

    pub fn hourly() -> Self {
        Self { minutes: 60 }
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn width(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes) * 60)
    }

    /// Index of the slice containing `time`.
    pub fn slice_of(self, time: NaiveTime) -> u32 {
        (time.hour() * 60 + time.minute()) / self.minutes
    }

    /// Start of the slice containing `time`.
    pub fn slice_start(self, time: NaiveTime) -> NaiveTime {
        let start = self.slice_of(time) * self.minutes;
        NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Whether `candidate` falls in the same slice as `now`.
    pub fn contains(self, now: NaiveTime, candidate: NaiveTime) -> bool {
        self.slice_of(now) == self.slice_of(candidate)
    }
}

impl Default for PollingWindow {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_WINDOW_MINUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_hourly_window() {
        let window = PollingWindow::hourly();
        assert!(window.contains(t(18, 5), t(18, 30)));
        assert!(window.contains(t(18, 59), t(18, 0)));
        assert!(!window.contains(t(18, 30), t(19, 0)));
        assert_eq!(window.slice_start(t(18, 42)), t(18, 0));
    }

    #[test]
    fn test_half_hour_window() {
        let window = PollingWindow::new(30).unwrap();
        assert!(window.contains(t(18, 30), t(18, 45)));
        assert!(!window.contains(t(18, 10), t(18, 30)));
        assert_eq!(window.slice_start(t(18, 42)), t(18, 30));
        assert_eq!(window.width(), Duration::from_secs(1800));
    }

    #[test]
    fn test_rejects_uneven_widths() {
        assert!(PollingWindow::new(0).is_err());
        assert!(PollingWindow::new(7).is_err());
        assert!(PollingWindow::new(1440).is_ok());
        assert!(PollingWindow::new(15).is_ok());
    }

    #[test]
    fn test_default_is_hourly() {
        assert_eq!(PollingWindow::default(), PollingWindow::hourly());
    }
}
