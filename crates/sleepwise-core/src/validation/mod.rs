//! Schedule validation.
//!
//! Evaluates a fixed set of seven rules against a child's observed schedule:
//! night sleep duration, nap count, nap duration, bedtime, wake time, wake
//! time consistency and night wakings. Each rule prefers values calculated
//! from events and falls back to the intake survey only when the events have
//! no usable samples for that metric.

mod age_bands;
mod criteria;
mod engine;

pub use age_bands::{AgeBand, AgeBandTable};
pub use criteria::{
    Criterion, CriterionId, CriterionStatus, CriterionValue, DataAvailability, DataCompleteness,
    MissingReason, ScheduleValidationResult, SourceType,
};
pub use engine::{
    validate_schedule, ScheduleValidator, ValidationThresholds, GROUP_ID, GROUP_NAME,
    VARIABLE_VALUE,
};
