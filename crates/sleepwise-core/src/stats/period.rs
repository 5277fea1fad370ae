//! Period-level sleep statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::daily::DailyTotal;
use super::samples::SleepSamples;
use super::round1;
use crate::clock::{self, MISSING_CLOCK};
use crate::events::Event;

/// Aggregate over an event list and a date range.
///
/// Time-of-day averages use `"--:--"` and numeric averages use `0` when
/// there is nothing to average; the `*_samples` counts tell a measured zero
/// apart from an absent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatistics {
    pub period_start: Option<DateTime<FixedOffset>>,
    pub period_end: Option<DateTime<FixedOffset>>,

    /// Average bedtime on the nocturnal clock
    pub avg_bedtime: String,
    /// Average wake time on the plain day clock; only bedtimes take the
    /// nocturnal shift.
    pub avg_wake_time: String,
    /// Average night sleep in minutes
    pub avg_sleep_duration: f64,
    /// Average nap length in minutes
    pub avg_nap_duration: f64,
    pub avg_naps_per_day: f64,
    pub total_wakeups: u32,
    pub avg_wakeups_per_night: f64,
    pub total_sleep_hours: f64,
    /// Population standard deviation of wake times, minutes
    pub wake_time_std_dev_minutes: f64,

    /// Distinct calendar days with at least one event in range
    pub days_with_data: u32,
    pub total_events: u32,
    pub night_sessions: u32,
    pub bedtime_samples: u32,
    pub wake_samples: u32,
    pub night_sleep_samples: u32,
    pub nap_samples: u32,
    pub nap_days: u32,

    pub dominant_mood: Option<String>,
    pub mood_histogram: BTreeMap<String, u32>,

    pub daily_totals: Vec<DailyTotal>,
}

impl PeriodStatistics {
    /// Statistics for a range with no events.
    pub fn empty(
        period_start: Option<DateTime<FixedOffset>>,
        period_end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            period_start,
            period_end,
            avg_bedtime: MISSING_CLOCK.to_string(),
            avg_wake_time: MISSING_CLOCK.to_string(),
            avg_sleep_duration: 0.0,
            avg_nap_duration: 0.0,
            avg_naps_per_day: 0.0,
            total_wakeups: 0,
            avg_wakeups_per_night: 0.0,
            total_sleep_hours: 0.0,
            wake_time_std_dev_minutes: 0.0,
            days_with_data: 0,
            total_events: 0,
            night_sessions: 0,
            bedtime_samples: 0,
            wake_samples: 0,
            night_sleep_samples: 0,
            nap_samples: 0,
            nap_days: 0,
            dominant_mood: None,
            mood_histogram: BTreeMap::new(),
            daily_totals: Vec::new(),
        }
    }

    pub(crate) fn build(
        in_range: &[Event],
        samples: &SleepSamples,
        period_start: Option<DateTime<FixedOffset>>,
        period_end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        let mut stats = Self::empty(period_start, period_end);

        let bedtimes = samples.bedtimes();
        let wakes = samples.wake_clocks();
        let night_minutes: Vec<i64> = samples.accepted_night_minutes().collect();
        let nap_minutes: Vec<i64> = samples.naps.iter().map(|n| n.minutes).collect();

        stats.avg_bedtime = clock::format_or_missing(clock::average_nocturnal(&bedtimes));
        stats.avg_wake_time = clock::format_or_missing(clock::average_day(&wakes));
        stats.wake_time_std_dev_minutes =
            round1(clock::std_dev_day_minutes(&wakes).unwrap_or(0.0));

        stats.avg_sleep_duration = round1(mean(&night_minutes));
        stats.avg_nap_duration = round1(mean(&nap_minutes));

        let nap_days = samples.nap_days();
        stats.avg_naps_per_day = if nap_days > 0 {
            round1(nap_minutes.len() as f64 / nap_days as f64)
        } else {
            0.0
        };

        stats.night_sessions = samples.nights.len() as u32;
        stats.total_wakeups = samples.nights.iter().map(|n| n.wakeups).sum();
        stats.avg_wakeups_per_night = if stats.night_sessions > 0 {
            round1(f64::from(stats.total_wakeups) / f64::from(stats.night_sessions))
        } else {
            0.0
        };

        let slept: i64 = night_minutes.iter().sum::<i64>() + nap_minutes.iter().sum::<i64>();
        stats.total_sleep_hours = round1(slept as f64 / 60.0);

        let days: BTreeSet<_> = in_range.iter().map(|e| e.start_time.date_naive()).collect();
        stats.days_with_data = days.len() as u32;
        stats.total_events = in_range.len() as u32;
        stats.bedtime_samples = bedtimes.len() as u32;
        stats.wake_samples = wakes.len() as u32;
        stats.night_sleep_samples = night_minutes.len() as u32;
        stats.nap_samples = nap_minutes.len() as u32;
        stats.nap_days = nap_days as u32;

        let (histogram, dominant) = mood_vote(in_range);
        stats.mood_histogram = histogram;
        stats.dominant_mood = dominant;

        stats.daily_totals = samples.daily_totals();
        stats
    }
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<i64>() as f64 / values.len() as f64
    }
}

/// Majority vote over emotional states. Ties go to the alphabetically first
/// state so the result is deterministic.
fn mood_vote(events: &[Event]) -> (BTreeMap<String, u32>, Option<String>) {
    let histogram = events
        .iter()
        .filter_map(|e| e.emotional_state.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, u32>, state| {
            *acc.entry(state.to_string()).or_insert(0) += 1;
            acc
        });

    let dominant = histogram
        .iter()
        .fold(None, |best: Option<(&String, u32)>, (state, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((state, count)),
        })
        .map(|(state, _)| state.clone());

    (histogram, dominant)
}
