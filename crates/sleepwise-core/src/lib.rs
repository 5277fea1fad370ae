//! # Sleepwise Core Library
//!
//! This library turns a child's logged activity events into sleep analytics.
//! It is pure: callers fetch events (and optionally a plan and an onboarding
//! survey) and hand them in; nothing here touches storage or the network. The
//! `sleepwise-cli` binary is a thin wrapper over the same library.
//!
//! ## Architecture
//!
//! - **Session Grouper**: partitions events into night sleeps and naps with
//!   their nested wakings, overlays and closing wakes
//! - **Statistics Aggregator**: period averages, clock-of-day means and daily
//!   night/nap splits built on the grouping
//! - **Schedule Validation Engine**: compares the statistics, or survey
//!   answers where logs are missing, against age-band norms
//!
//! ## Key Components
//!
//! - [`group_events`]: Session grouping
//! - [`StatsAggregator`]: Period statistics and daily aggregation
//! - [`ScheduleValidator`]: Seven-criterion schedule validation
//! - [`AnalysisConfig`]: Thresholds and age-band table

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod plan;
pub mod session;
pub mod stats;
pub mod survey;
pub mod validation;

pub use clock::ClockTime;
pub use config::AnalysisConfig;
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::{validate_events, Event, EventType};
pub use plan::{Plan, PlanSchedule};
pub use session::{group_events, SessionGrouping, SessionKind, SleepSession};
pub use stats::{
    aggregate_daily, compute_stats, DailyAggregate, DailyTotal, Denominator, PeriodLabel,
    PeriodStatistics, PlausibilityBounds, StatsAggregator,
};
pub use survey::{SurveyData, SurveyField, SurveyValue};
pub use validation::{
    validate_schedule, AgeBand, AgeBandTable, Criterion, CriterionId, CriterionStatus,
    CriterionValue, DataAvailability, ScheduleValidationResult, ScheduleValidator,
};
