//! Criterion result types.

use serde::{Deserialize, Serialize};

/// The fixed rule set, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionId {
    NightDuration,
    NapCount,
    NapDuration,
    Bedtime,
    WakeTime,
    WakeTimeDeviation,
    NightWakings,
}

impl CriterionId {
    pub const ALL: [CriterionId; 7] = [
        CriterionId::NightDuration,
        CriterionId::NapCount,
        CriterionId::NapDuration,
        CriterionId::Bedtime,
        CriterionId::WakeTime,
        CriterionId::WakeTimeDeviation,
        CriterionId::NightWakings,
    ];

    /// Human-readable subject used in messages.
    pub fn subject(&self) -> &'static str {
        match self {
            CriterionId::NightDuration => "night sleep duration",
            CriterionId::NapCount => "nap count",
            CriterionId::NapDuration => "nap duration",
            CriterionId::Bedtime => "bedtime",
            CriterionId::WakeTime => "wake time",
            CriterionId::WakeTimeDeviation => "wake time consistency",
            CriterionId::NightWakings => "night wakings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionStatus {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Calculated,
    Survey,
}

/// Why a criterion has no usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// No event samples and no survey supplied
    NoSamples,
    /// Survey supplied but the relevant answer is empty
    SurveyAbsent,
    /// Survey answer present but unusable
    SurveyInvalid,
    /// Metric is not meaningful at this age
    AgeBelowThreshold,
}

/// Where a criterion's value came from, or why there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataAvailability {
    Calculated,
    Survey,
    NotApplicable { reason: MissingReason },
    Missing { reason: MissingReason },
}

impl DataAvailability {
    /// Not-applicable counts as available: the rule is settled for this age.
    pub fn is_available(&self) -> bool {
        !matches!(self, DataAvailability::Missing { .. })
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            DataAvailability::Survey => SourceType::Survey,
            _ => SourceType::Calculated,
        }
    }
}

/// Criterion value: a number, a rendered string, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Number(f64),
    Text(String),
}

impl CriterionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CriterionValue::Number(n) => Some(*n),
            CriterionValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CriterionValue::Text(s) => Some(s),
            CriterionValue::Number(_) => None,
        }
    }
}

/// One evaluated schedule rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub id: CriterionId,
    pub status: CriterionStatus,
    pub value: Option<CriterionValue>,
    pub expected: String,
    pub data_available: bool,
    pub source_type: SourceType,
    pub availability: DataAvailability,
    pub message: String,
}

impl Criterion {
    /// Build a criterion; the legacy flags are derived from `availability`.
    pub fn new(
        id: CriterionId,
        status: CriterionStatus,
        value: Option<CriterionValue>,
        expected: impl Into<String>,
        availability: DataAvailability,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            status,
            value,
            expected: expected.into(),
            data_available: availability.is_available(),
            source_type: availability.source_type(),
            availability,
            message: message.into(),
        }
    }

    /// Criterion with nothing to evaluate.
    pub fn insufficient(id: CriterionId, expected: impl Into<String>, reason: MissingReason) -> Self {
        let detail = match reason {
            MissingReason::SurveyInvalid => " (survey answer could not be read)",
            MissingReason::SurveyAbsent => " (survey answer missing)",
            _ => "",
        };
        Self::new(
            id,
            CriterionStatus::Warning,
            None,
            expected,
            DataAvailability::Missing { reason },
            format!("Not enough logged data: insufficient data to evaluate {}{detail}", id.subject()),
        )
    }
}

/// How many criteria are backed by real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCompleteness {
    pub available: usize,
    pub total: usize,
}

/// Outcome of validating a child's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleValidationResult {
    pub group_id: String,
    pub group_name: String,
    pub criteria: Vec<Criterion>,
    pub data_completeness: DataCompleteness,
}

impl ScheduleValidationResult {
    pub(crate) fn from_criteria(
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Self {
        let data_completeness = DataCompleteness {
            available: criteria.iter().filter(|c| c.data_available).count(),
            total: criteria.len(),
        };
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            criteria,
            data_completeness,
        }
    }

    pub fn criterion(&self, id: CriterionId) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }
}
