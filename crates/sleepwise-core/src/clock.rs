//! Clock-of-day arithmetic.
//!
//! Bedtimes cluster around midnight, so averaging raw minutes-past-midnight
//! would put `23:30` and `00:30` at noon. The nocturnal clock shifts early
//! morning hours (up to 06:59) past 24:00 before averaging, then folds the
//! result back into the day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: i64 = 1440;

/// Rendered in place of a time-of-day average that has no samples.
pub const MISSING_CLOCK: &str = "--:--";

/// Hours at or below this are treated as "late night" by the nocturnal clock.
pub const NOCTURNAL_SHIFT_MAX_HOUR: u32 = 6;

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: (hour * 60 + minute) as u16,
            })
        } else {
            None
        }
    }

    /// Build from any minute count, wrapping into a single day.
    pub fn from_minutes(minutes: i64) -> Self {
        Self {
            minutes: minutes.rem_euclid(MINUTES_PER_DAY) as u16,
        }
    }

    /// Local clock of an instant, in the instant's own offset.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            minutes: (instant.hour() * 60 + instant.minute()) as u16,
        }
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes) / 60
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes) % 60
    }

    pub fn minutes_since_midnight(&self) -> i64 {
        i64::from(self.minutes)
    }

    /// Minutes on the nocturnal clock: early-morning times land after 24:00.
    pub fn nocturnal_minutes(&self) -> i64 {
        if self.hour() <= NOCTURNAL_SHIFT_MAX_HOUR {
            self.minutes_since_midnight() + MINUTES_PER_DAY
        } else {
            self.minutes_since_midnight()
        }
    }

    /// Forward elapsed minutes from `self` to `later`, rolling over to the
    /// next day when `later` is not after `self` on the clock.
    pub fn minutes_until(&self, later: ClockTime) -> i64 {
        let diff = later.minutes_since_midnight() - self.minutes_since_midnight();
        if diff <= 0 {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }

    /// Shortest distance around the clock face, in minutes.
    pub fn circular_distance(&self, other: ClockTime) -> i64 {
        let diff = (self.minutes_since_midnight() - other.minutes_since_midnight()).abs();
        diff.min(MINUTES_PER_DAY - diff)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Error for strings that are not `H:MM`, `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct ClockParseError(pub String);

impl FromStr for ClockTime {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ClockParseError(s.to_string());

        let mut parts = trimmed.split(':');
        let hour_str = parts.next().ok_or_else(err)?;
        let minute_str = parts.next().ok_or_else(err)?;
        if let Some(seconds) = parts.next() {
            if seconds.len() != 2 || !seconds.chars().all(|c| c.is_ascii_digit()) {
                return Err(err());
            }
        }
        if parts.next().is_some() {
            return Err(err());
        }

        let digits = |p: &str, max_len: usize| {
            !p.is_empty() && p.len() <= max_len && p.chars().all(|c| c.is_ascii_digit())
        };
        if !digits(hour_str, 2) || minute_str.len() != 2 || !digits(minute_str, 2) {
            return Err(err());
        }

        let hour: u32 = hour_str.parse().map_err(|_| err())?;
        let minute: u32 = minute_str.parse().map_err(|_| err())?;
        ClockTime::from_hm(hour, minute).ok_or_else(err)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Average on the nocturnal clock (bedtimes).
pub fn average_nocturnal(samples: &[ClockTime]) -> Option<ClockTime> {
    mean_minutes(samples.iter().map(ClockTime::nocturnal_minutes)).map(ClockTime::from_minutes)
}

/// Average on the plain day clock (wake times).
pub fn average_day(samples: &[ClockTime]) -> Option<ClockTime> {
    mean_minutes(samples.iter().map(ClockTime::minutes_since_midnight)).map(ClockTime::from_minutes)
}

/// Population standard deviation of day-clock minutes. Needs two samples.
pub fn std_dev_day_minutes(samples: &[ClockTime]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let values: Vec<f64> = samples
        .iter()
        .map(|c| c.minutes_since_midnight() as f64)
        .collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// `"HH:MM"` for a value, [`MISSING_CLOCK`] otherwise.
pub fn format_or_missing(clock: Option<ClockTime>) -> String {
    clock
        .map(|c| c.to_string())
        .unwrap_or_else(|| MISSING_CLOCK.to_string())
}

fn mean_minutes(values: impl Iterator<Item = i64>) -> Option<i64> {
    let (sum, count) = values.fold((0i64, 0i64), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some((sum as f64 / count as f64).round() as i64)
    }
}
