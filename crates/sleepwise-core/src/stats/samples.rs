//! Sleep sample extraction shared by the period and daily aggregators.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::daily::DailyTotal;
use crate::clock::{ClockTime, MINUTES_PER_DAY};
use crate::events::Event;
use crate::session::SessionGrouping;

/// Onset hour from which a wake at or before the onset clock is read as
/// "next morning".
pub const EVENING_ONSET_HOUR: u32 = 18;

/// Accepted duration ranges. Samples outside are discarded instead of
/// dragging the averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityBounds {
    #[serde(default = "default_night_min")]
    pub night_min_minutes: i64,
    #[serde(default = "default_night_max")]
    pub night_max_minutes: i64,
    #[serde(default = "default_nap_min")]
    pub nap_min_minutes: i64,
    #[serde(default = "default_nap_max")]
    pub nap_max_minutes: i64,
}

fn default_night_min() -> i64 {
    120
}
fn default_night_max() -> i64 {
    960
}
fn default_nap_min() -> i64 {
    1
}
fn default_nap_max() -> i64 {
    300
}

impl Default for PlausibilityBounds {
    fn default() -> Self {
        Self {
            night_min_minutes: default_night_min(),
            night_max_minutes: default_night_max(),
            nap_min_minutes: default_nap_min(),
            nap_max_minutes: default_nap_max(),
        }
    }
}

impl PlausibilityBounds {
    pub fn accepts_night(&self, minutes: i64) -> bool {
        (self.night_min_minutes..=self.night_max_minutes).contains(&minutes)
    }

    pub fn accepts_nap(&self, minutes: i64) -> bool {
        (self.nap_min_minutes..=self.nap_max_minutes).contains(&minutes)
    }
}

/// Actual sleep onset: start shifted by the (clamped) sleep delay.
pub fn sleep_onset(event: &Event) -> DateTime<FixedOffset> {
    event.start_time + Duration::minutes(event.effective_sleep_delay())
}

/// Minutes slept between onset and wake, worked out on the onset's local
/// clock.
///
/// The wake is read in the onset's UTC offset so both clocks agree. A wake
/// whose clock is at or before the onset clock after an evening onset is the
/// next morning. Anything else that does not move forward on the clock, and
/// any span of a day or more, uses the elapsed instant difference. Returns
/// `None` when the wake is not after the onset.
pub fn night_sleep_minutes(
    onset: DateTime<FixedOffset>,
    wake: DateTime<FixedOffset>,
) -> Option<i64> {
    if wake <= onset {
        return None;
    }
    let elapsed = (wake - onset).num_minutes();
    if elapsed >= MINUTES_PER_DAY {
        return Some(elapsed);
    }

    let onset_clock = ClockTime::of(&onset);
    let wake_clock = ClockTime::of(&wake.with_timezone(onset.offset()));
    let diff = wake_clock.minutes_since_midnight() - onset_clock.minutes_since_midnight();

    if diff <= 0 && onset_clock.hour() >= EVENING_ONSET_HOUR {
        Some(diff + MINUTES_PER_DAY)
    } else if diff > 0 {
        Some(diff)
    } else {
        Some(elapsed)
    }
}

/// One night-sleep session reduced to the numbers the aggregators need.
#[derive(Debug, Clone)]
pub(crate) struct NightSample {
    /// Calendar date of the sleep onset
    pub date: NaiveDate,
    pub bedtime: ClockTime,
    /// Duration and wake clock, when the session ended plausibly
    pub completed: Option<(i64, ClockTime)>,
    pub wakeups: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct NapSample {
    pub date: NaiveDate,
    pub minutes: i64,
}

/// All usable samples from one grouping.
#[derive(Debug, Clone, Default)]
pub(crate) struct SleepSamples {
    pub nights: Vec<NightSample>,
    pub naps: Vec<NapSample>,
}

impl SleepSamples {
    pub fn collect(grouping: &SessionGrouping, bounds: &PlausibilityBounds) -> Self {
        let mut rejected_nights = 0usize;
        let mut rejected_naps = 0usize;

        let nights: Vec<NightSample> = grouping
            .night_sessions()
            .map(|session| {
                let root = &session.original_event;
                let onset = sleep_onset(root);
                let completed = session
                    .end
                    .and_then(|end| night_sleep_minutes(onset, end).map(|m| (m, end)))
                    .and_then(|(minutes, end)| {
                        if bounds.accepts_night(minutes) {
                            Some((minutes, ClockTime::of(&end.with_timezone(onset.offset()))))
                        } else {
                            rejected_nights += 1;
                            None
                        }
                    });
                NightSample {
                    date: onset.date_naive(),
                    bedtime: ClockTime::of(&root.start_time),
                    completed,
                    wakeups: session.night_wakings.len() as u32,
                }
            })
            .collect();

        // Naps only count with both timestamps logged on the nap itself.
        let naps: Vec<NapSample> = grouping
            .nap_sessions()
            .filter_map(|session| {
                let root = &session.original_event;
                let minutes = root.duration_minutes()?;
                if bounds.accepts_nap(minutes) {
                    Some(NapSample {
                        date: root.start_time.date_naive(),
                        minutes,
                    })
                } else {
                    rejected_naps += 1;
                    None
                }
            })
            .collect();

        if rejected_nights > 0 || rejected_naps > 0 {
            debug!(rejected_nights, rejected_naps, "discarded implausible sleep samples");
        }

        Self { nights, naps }
    }

    pub fn accepted_night_minutes(&self) -> impl Iterator<Item = i64> + '_ {
        self.nights.iter().filter_map(|n| n.completed.map(|(m, _)| m))
    }

    pub fn wake_clocks(&self) -> Vec<ClockTime> {
        self.nights
            .iter()
            .filter_map(|n| n.completed.map(|(_, wake)| wake))
            .collect()
    }

    pub fn bedtimes(&self) -> Vec<ClockTime> {
        self.nights.iter().map(|n| n.bedtime).collect()
    }

    pub fn nap_days(&self) -> usize {
        let mut days: Vec<NaiveDate> = self.naps.iter().map(|n| n.date).collect();
        days.sort();
        days.dedup();
        days.len()
    }

    /// Per-day night and nap minutes, ascending by date.
    pub fn daily_totals(&self) -> Vec<DailyTotal> {
        let mut by_day: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

        for night in &self.nights {
            let entry = by_day
                .entry(night.date)
                .or_insert_with(|| DailyTotal::empty(night.date));
            entry.night_wakings += night.wakeups;
            if let Some((minutes, _)) = night.completed {
                entry.night_minutes += minutes;
            }
        }

        for nap in &self.naps {
            let entry = by_day
                .entry(nap.date)
                .or_insert_with(|| DailyTotal::empty(nap.date));
            entry.nap_minutes += nap.minutes;
            entry.naps += 1;
        }

        by_day
            .into_values()
            .map(|mut day| {
                day.total_minutes = day.night_minutes + day.nap_minutes;
                day
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(-3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 7, day, hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_night_crossing_midnight() {
        assert_eq!(night_sleep_minutes(at(1, 21, 0), at(2, 7, 0)), Some(600));
    }

    #[test]
    fn test_sleep_delay_shifts_onset() {
        let event = Event::new("s", "c", EventType::Sleep, at(1, 21, 0)).with_sleep_delay(30);
        let onset = sleep_onset(&event);
        assert_eq!(night_sleep_minutes(onset, at(2, 7, 0)), Some(570));
    }

    #[test]
    fn test_same_day_sleep() {
        assert_eq!(night_sleep_minutes(at(1, 1, 0), at(1, 6, 30)), Some(330));
    }

    #[test]
    fn test_wake_not_after_onset() {
        assert_eq!(night_sleep_minutes(at(1, 21, 0), at(1, 21, 0)), None);
        assert_eq!(night_sleep_minutes(at(1, 21, 0), at(1, 20, 0)), None);
    }

    #[test]
    fn test_early_onset_wraparound_uses_elapsed_time() {
        // 05:00 onset, 04:00 wake the next day: not an evening onset
        assert_eq!(night_sleep_minutes(at(1, 5, 0), at(2, 4, 0)), Some(1380));
    }

    #[test]
    fn test_wake_in_another_offset_is_read_on_onset_clock() {
        let onset = at(10, 21, 0);
        let wake = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 11, 3, 0, 0)
            .unwrap();
        // 03:00Z is 00:00 at -03:00
        assert_eq!(night_sleep_minutes(onset, wake), Some(180));
    }

    #[test]
    fn test_span_of_a_day_or_more_uses_elapsed_time() {
        assert_eq!(night_sleep_minutes(at(1, 19, 0), at(2, 23, 30)), Some(1710));
        assert_eq!(night_sleep_minutes(at(1, 21, 0), at(2, 21, 0)), Some(1440));
    }

    #[test]
    fn test_bounds() {
        let bounds = PlausibilityBounds::default();
        assert!(bounds.accepts_night(120));
        assert!(bounds.accepts_night(960));
        assert!(!bounds.accepts_night(119));
        assert!(!bounds.accepts_night(961));
        assert!(bounds.accepts_nap(300));
        assert!(!bounds.accepts_nap(301));
        assert!(!bounds.accepts_nap(0));
    }
}
