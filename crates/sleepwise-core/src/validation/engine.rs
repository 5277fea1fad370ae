use serde::{Deserialize, Serialize};
use tracing::debug;

use super::age_bands::AgeBand;
use super::criteria::{
    Criterion, CriterionId, CriterionStatus, CriterionValue, DataAvailability, MissingReason,
    ScheduleValidationResult,
};
use crate::clock::ClockTime;
use crate::config::AnalysisConfig;
use crate::error::ValidationError;
use crate::events::Event;
use crate::plan::Plan;
use crate::stats::{PeriodStatistics, StatsAggregator};
use crate::survey::{SurveyData, SurveyField};

pub const GROUP_ID: &str = "sleep_schedule";
pub const GROUP_NAME: &str = "Sleep schedule";

/// Rendered in place of nap metrics for children too young for a predictable
/// nap pattern.
pub const VARIABLE_VALUE: &str = "Variable";

/// Status thresholds for the schedule rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    /// Below this age (months) nap rules are not evaluated
    #[serde(default = "default_nap_predictable_from")]
    pub nap_predictable_from_months: u32,
    /// Night sleep this far outside the band is a warning, further is critical
    #[serde(default = "default_night_tolerance")]
    pub night_tolerance_hours: f64,
    #[serde(default = "default_clock_ok")]
    pub clock_ok_minutes: i64,
    #[serde(default = "default_clock_warning")]
    pub clock_warning_minutes: i64,
    #[serde(default = "default_deviation_ok")]
    pub deviation_ok_minutes: f64,
    #[serde(default = "default_deviation_warning")]
    pub deviation_warning_minutes: f64,
}

fn default_nap_predictable_from() -> u32 {
    4
}
fn default_night_tolerance() -> f64 {
    1.0
}
fn default_clock_ok() -> i64 {
    30
}
fn default_clock_warning() -> i64 {
    60
}
fn default_deviation_ok() -> f64 {
    30.0
}
fn default_deviation_warning() -> f64 {
    60.0
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            nap_predictable_from_months: default_nap_predictable_from(),
            night_tolerance_hours: default_night_tolerance(),
            clock_ok_minutes: default_clock_ok(),
            clock_warning_minutes: default_clock_warning(),
            deviation_ok_minutes: default_deviation_ok(),
            deviation_warning_minutes: default_deviation_warning(),
        }
    }
}

/// A metric value after applying calculated-then-survey precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolved<T> {
    Calculated(T),
    Survey(T),
    Missing(MissingReason),
}

impl<T> Resolved<T> {
    /// Calculated data wins whenever it exists; the survey only fills gaps.
    fn from_sources(
        calculated: Option<T>,
        survey: Option<&SurveyData>,
        survey_field: impl FnOnce(&SurveyData) -> SurveyField<T>,
    ) -> Self {
        if let Some(value) = calculated {
            return Resolved::Calculated(value);
        }
        match survey.map(survey_field) {
            None => Resolved::Missing(MissingReason::NoSamples),
            Some(SurveyField::Valid(value)) => Resolved::Survey(value),
            Some(SurveyField::Absent) => Resolved::Missing(MissingReason::SurveyAbsent),
            Some(SurveyField::Invalid(_)) => Resolved::Missing(MissingReason::SurveyInvalid),
        }
    }

    fn split(self) -> Result<(T, DataAvailability), MissingReason> {
        match self {
            Resolved::Calculated(v) => Ok((v, DataAvailability::Calculated)),
            Resolved::Survey(v) => Ok((v, DataAvailability::Survey)),
            Resolved::Missing(reason) => Err(reason),
        }
    }
}

fn source_suffix(availability: DataAvailability) -> &'static str {
    match availability {
        DataAvailability::Survey => " (from intake survey)",
        _ => "",
    }
}

/// Evaluates a child's observed schedule against age-appropriate norms.
#[derive(Debug, Clone, Default)]
pub struct ScheduleValidator {
    config: AnalysisConfig,
}

impl ScheduleValidator {
    /// Create a new validator with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new validator with a custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate the schedule implied by `events`, falling back to `survey`
    /// where the events say nothing. Always yields the seven criteria.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] only when an event breaks the input
    /// contract. A missing plan, survey or event history is not an error.
    pub fn validate(
        &self,
        events: &[Event],
        plan: Option<&Plan>,
        child_age_months: u32,
        survey: Option<&SurveyData>,
    ) -> Result<ScheduleValidationResult, ValidationError> {
        let stats = StatsAggregator::with_bounds(self.config.plausibility)
            .compute_stats_between(events, None, None)?;
        Ok(self.validate_stats(&stats, plan, child_age_months, survey))
    }

    /// Validate from already computed statistics.
    pub fn validate_stats(
        &self,
        stats: &PeriodStatistics,
        plan: Option<&Plan>,
        child_age_months: u32,
        survey: Option<&SurveyData>,
    ) -> ScheduleValidationResult {
        let band = self.config.age_bands.band_for(child_age_months);
        let naps_predictable = child_age_months >= self.config.thresholds.nap_predictable_from_months;

        let criteria = vec![
            self.night_duration(stats, band, survey),
            self.nap_count(stats, band, survey, naps_predictable),
            self.nap_duration(stats, band, survey, naps_predictable),
            self.clock_criterion(
                CriterionId::Bedtime,
                calculated_clock(stats.bedtime_samples, &stats.avg_bedtime),
                plan.map(|p| p.schedule.bedtime).unwrap_or(band.bedtime),
                plan.is_some(),
                survey,
                SurveyData::bedtime,
            ),
            self.clock_criterion(
                CriterionId::WakeTime,
                calculated_clock(stats.wake_samples, &stats.avg_wake_time),
                plan.map(|p| p.schedule.wake_time).unwrap_or(band.wake_time),
                plan.is_some(),
                survey,
                SurveyData::wake_time,
            ),
            self.wake_time_deviation(stats),
            self.night_wakings(stats, band),
        ];

        let result = ScheduleValidationResult::from_criteria(GROUP_ID, GROUP_NAME, criteria);
        debug!(
            age_months = child_age_months,
            band_from = band.min_months,
            available = result.data_completeness.available,
            total = result.data_completeness.total,
            "validated sleep schedule"
        );
        result
    }

    fn night_duration(
        &self,
        stats: &PeriodStatistics,
        band: &AgeBand,
        survey: Option<&SurveyData>,
    ) -> Criterion {
        let id = CriterionId::NightDuration;
        let expected = band.expected_night_hours();
        let calculated = (stats.night_sleep_samples > 0).then_some(stats.avg_sleep_duration);
        let resolved = Resolved::from_sources(calculated, survey, |s| {
            s.night_duration_minutes().map(|m| m as f64)
        });

        let (minutes, availability) = match resolved.split() {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(?reason, "night duration has no data");
                return Criterion::insufficient(id, expected, reason);
            }
        };

        let hours = minutes / 60.0;
        let tolerance = self.config.thresholds.night_tolerance_hours;
        let (status, verdict) = if hours >= band.night_hours_min && hours <= band.night_hours_max {
            (CriterionStatus::Ok, "within")
        } else if hours >= band.night_hours_min - tolerance && hours <= band.night_hours_max + tolerance {
            (CriterionStatus::Warning, "slightly outside")
        } else {
            (CriterionStatus::Critical, "well outside")
        };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Text(format!("{hours:.1} hrs"))),
            expected.clone(),
            availability,
            format!(
                "Night sleep of {hours:.1} hrs is {verdict} the expected {expected}{}",
                source_suffix(availability)
            ),
        )
    }

    fn nap_count(
        &self,
        stats: &PeriodStatistics,
        band: &AgeBand,
        survey: Option<&SurveyData>,
        naps_predictable: bool,
    ) -> Criterion {
        let id = CriterionId::NapCount;
        if !naps_predictable {
            return variable(id);
        }

        let expected = band.expected_naps();
        let calculated = (stats.nap_samples > 0 && stats.avg_naps_per_day > 0.0)
            .then_some(stats.avg_naps_per_day);
        let resolved = Resolved::from_sources(calculated, survey, SurveyData::naps_per_day);

        let (naps, availability) = match resolved.split() {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(?reason, "nap count has no data");
                return Criterion::insufficient(id, expected, reason);
            }
        };

        let (status, message) = if naps == 0.0 && band.naps_min > 0 {
            (
                CriterionStatus::Warning,
                format!("0 naps observed, {expected} expected for this age"),
            )
        } else if naps < f64::from(band.naps_min) || naps > f64::from(band.naps_max) {
            (
                CriterionStatus::Warning,
                format!("{naps} naps per day observed, {expected} expected for this age"),
            )
        } else {
            (
                CriterionStatus::Ok,
                format!("{naps} naps per day is within the expected {expected}"),
            )
        };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Number(naps)),
            expected,
            availability,
            format!("{message}{}", source_suffix(availability)),
        )
    }

    fn nap_duration(
        &self,
        stats: &PeriodStatistics,
        band: &AgeBand,
        survey: Option<&SurveyData>,
        naps_predictable: bool,
    ) -> Criterion {
        let id = CriterionId::NapDuration;
        if !naps_predictable {
            return variable(id);
        }

        let expected = format!("<= {} min", band.max_nap_minutes);
        let calculated = (stats.nap_samples > 0 && stats.avg_nap_duration > 0.0)
            .then_some(stats.avg_nap_duration);
        let resolved = Resolved::from_sources(calculated, survey, SurveyData::nap_duration_minutes);

        let (minutes, availability) = match resolved.split() {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(?reason, "nap duration has no data");
                return Criterion::insufficient(id, expected, reason);
            }
        };

        let minutes = minutes.round();
        let (status, message) = if minutes > f64::from(band.max_nap_minutes) {
            (
                CriterionStatus::Warning,
                format!(
                    "Naps of {minutes} min exceed the {} min maximum for this age",
                    band.max_nap_minutes
                ),
            )
        } else {
            (
                CriterionStatus::Ok,
                format!("Naps of {minutes} min are within the expected length"),
            )
        };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Number(minutes)),
            expected,
            availability,
            format!("{message}{}", source_suffix(availability)),
        )
    }

    fn clock_criterion(
        &self,
        id: CriterionId,
        calculated: Option<ClockTime>,
        target: ClockTime,
        target_from_plan: bool,
        survey: Option<&SurveyData>,
        survey_field: fn(&SurveyData) -> SurveyField<ClockTime>,
    ) -> Criterion {
        let expected = target.to_string();
        let resolved = Resolved::from_sources(calculated, survey, survey_field);

        let (observed, availability) = match resolved.split() {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(criterion = ?id, ?reason, "clock criterion has no data");
                return Criterion::insufficient(id, expected, reason);
            }
        };

        let deviation = observed.circular_distance(target);
        let thresholds = &self.config.thresholds;
        let status = if deviation <= thresholds.clock_ok_minutes {
            CriterionStatus::Ok
        } else if deviation <= thresholds.clock_warning_minutes {
            CriterionStatus::Warning
        } else {
            CriterionStatus::Critical
        };
        let target_label = if target_from_plan { "plan target" } else { "age target" };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Text(observed.to_string())),
            expected.clone(),
            availability,
            format!(
                "Average {} {observed} is {deviation} min from the {target_label} {expected}{}",
                id.subject(),
                source_suffix(availability)
            ),
        )
    }

    fn wake_time_deviation(&self, stats: &PeriodStatistics) -> Criterion {
        let id = CriterionId::WakeTimeDeviation;
        let thresholds = &self.config.thresholds;
        let expected = format!("<= {} min", thresholds.deviation_ok_minutes);

        if stats.wake_samples < 2 {
            return Criterion::insufficient(id, expected, MissingReason::NoSamples);
        }

        let deviation = stats.wake_time_std_dev_minutes;
        let status = if deviation <= thresholds.deviation_ok_minutes {
            CriterionStatus::Ok
        } else if deviation <= thresholds.deviation_warning_minutes {
            CriterionStatus::Warning
        } else {
            CriterionStatus::Critical
        };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Number(deviation)),
            expected,
            DataAvailability::Calculated,
            format!(
                "Wake time varies by {deviation} min across {} mornings",
                stats.wake_samples
            ),
        )
    }

    fn night_wakings(&self, stats: &PeriodStatistics, band: &AgeBand) -> Criterion {
        let id = CriterionId::NightWakings;
        let expected = format!("<= {}", band.max_night_wakings);

        // Zero wakeups over observed nights is a measurement, not a gap.
        if stats.night_sessions == 0 {
            return Criterion::insufficient(id, expected, MissingReason::NoSamples);
        }

        let per_night = stats.avg_wakeups_per_night;
        let max = f64::from(band.max_night_wakings);
        let status = if per_night <= max {
            CriterionStatus::Ok
        } else if per_night <= max + 1.0 {
            CriterionStatus::Warning
        } else {
            CriterionStatus::Critical
        };

        Criterion::new(
            id,
            status,
            Some(CriterionValue::Number(per_night)),
            expected.clone(),
            DataAvailability::Calculated,
            format!(
                "{per_night} night wakings per night over {} nights, expected {expected}",
                stats.night_sessions
            ),
        )
    }
}

fn calculated_clock(samples: u32, rendered: &str) -> Option<ClockTime> {
    if samples == 0 {
        return None;
    }
    rendered.parse().ok()
}

fn variable(id: CriterionId) -> Criterion {
    Criterion::new(
        id,
        CriterionStatus::Ok,
        Some(CriterionValue::Text(VARIABLE_VALUE.to_string())),
        VARIABLE_VALUE,
        DataAvailability::NotApplicable {
            reason: MissingReason::AgeBelowThreshold,
        },
        format!("{} is still variable at this age", capitalize(id.subject())),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// [`ScheduleValidator::validate`] with the default configuration.
///
/// # Errors
///
/// Returns a [`ValidationError`] only when an event breaks the input contract.
pub fn validate_schedule(
    events: &[Event],
    plan: Option<&Plan>,
    child_age_months: u32,
    survey: Option<&SurveyData>,
) -> Result<ScheduleValidationResult, ValidationError> {
    ScheduleValidator::new().validate(events, plan, child_age_months, survey)
}
