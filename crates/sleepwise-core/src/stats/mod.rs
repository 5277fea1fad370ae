//! Statistics module for Sleepwise
//!
//! Turns raw events into period-level numbers:
//! - **Period statistics**: average bedtime/wake time, night and nap
//!   durations, wakeups, mood, per-day totals
//! - **Daily aggregate**: average night vs nap minutes per day over a nominal
//!   period, with a choice of denominator

mod daily;
mod period;
mod samples;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::ValidationError;
use crate::events::{validate_events, Event};
use crate::session::group_events;

pub use daily::{DailyAggregate, DailyTotal, Denominator, PeriodLabel};
pub use period::PeriodStatistics;
pub use samples::{night_sleep_minutes, sleep_onset, PlausibilityBounds};

use samples::SleepSamples;

/// Aggregator for sleep statistics over a range of events.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    bounds: PlausibilityBounds,
}

impl StatsAggregator {
    /// Create a new aggregator with the default plausibility bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new aggregator with custom plausibility bounds
    pub fn with_bounds(bounds: PlausibilityBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &PlausibilityBounds {
        &self.bounds
    }

    /// Statistics for every event starting at or after `from`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any event breaks the input contract.
    pub fn compute_stats(
        &self,
        events: &[Event],
        from: DateTime<FixedOffset>,
    ) -> Result<PeriodStatistics, ValidationError> {
        self.compute_stats_between(events, Some(from), None)
    }

    /// Statistics for events starting in `[from, to)`; either side may be open.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any event breaks the input contract.
    pub fn compute_stats_between(
        &self,
        events: &[Event],
        from: Option<DateTime<FixedOffset>>,
        to: Option<DateTime<FixedOffset>>,
    ) -> Result<PeriodStatistics, ValidationError> {
        validate_events(events)?;

        let in_range: Vec<Event> = events
            .iter()
            .filter(|e| from.map_or(true, |f| e.start_time >= f))
            .filter(|e| to.map_or(true, |t| e.start_time < t))
            .cloned()
            .collect();

        if in_range.is_empty() {
            return Ok(PeriodStatistics::empty(from, to));
        }

        let grouping = group_events(&in_range)?;
        let samples = SleepSamples::collect(&grouping, &self.bounds);
        let stats = PeriodStatistics::build(&in_range, &samples, from, to);

        debug!(
            events = stats.total_events,
            days = stats.days_with_data,
            nights = stats.night_sleep_samples,
            naps = stats.nap_samples,
            "computed period statistics"
        );
        Ok(stats)
    }

    /// Average daily night/nap split for `events` over the trailing `period`
    /// ending at the latest logged day.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any event breaks the input contract.
    pub fn aggregate_daily(
        &self,
        events: &[Event],
        period: PeriodLabel,
        denominator: Denominator,
    ) -> Result<DailyAggregate, ValidationError> {
        let grouping = group_events(events)?;
        let samples = SleepSamples::collect(&grouping, &self.bounds);
        let aggregate = DailyAggregate::from_days(samples.daily_totals(), period, denominator);

        debug!(
            period = %period,
            ?denominator,
            divisor = aggregate.divisor,
            data_days = aggregate.data_days,
            "aggregated daily sleep"
        );
        Ok(aggregate)
    }
}

/// [`StatsAggregator::compute_stats`] with default bounds.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any event breaks the input contract.
pub fn compute_stats(
    events: &[Event],
    from: DateTime<FixedOffset>,
) -> Result<PeriodStatistics, ValidationError> {
    StatsAggregator::new().compute_stats(events, from)
}

/// [`StatsAggregator::aggregate_daily`] with default bounds.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any event breaks the input contract.
pub fn aggregate_daily(
    events: &[Event],
    period: PeriodLabel,
    denominator: Denominator,
) -> Result<DailyAggregate, ValidationError> {
    StatsAggregator::new().aggregate_daily(events, period, denominator)
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
