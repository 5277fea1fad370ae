use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use clap::Args;
use sleepwise_core::{Plan, ScheduleValidator, StatsAggregator, SurveyData, ValidationError};

#[derive(Args)]
pub struct ValidateArgs {
    /// JSON file with an array of events
    #[arg(long)]
    events: PathBuf,
    /// Child age in months
    #[arg(long, allow_negative_numbers = true)]
    age: i64,
    /// JSON file with the intake survey answers
    #[arg(long)]
    survey: Option<PathBuf>,
    /// JSON file with the active plan
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Only events starting at or after this instant
    #[arg(long, value_parser = super::parse_instant)]
    from: Option<DateTime<FixedOffset>>,
}

fn age_months(age: i64) -> Result<u32, ValidationError> {
    u32::try_from(age).map_err(|_| ValidationError::InvalidValue {
        field: "age".into(),
        message: format!("age must be a non-negative number of months, got {age}"),
    })
}

pub fn run(args: ValidateArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let age = age_months(args.age)?;
    let cfg = super::load_config(config)?;
    let events = super::read_events(&args.events)?;
    let survey: Option<SurveyData> = args.survey.as_deref().map(super::read_json).transpose()?;
    let plan: Option<Plan> = args.plan.as_deref().map(super::read_json).transpose()?;

    let stats = StatsAggregator::with_bounds(cfg.plausibility)
        .compute_stats_between(&events, args.from, None)?;
    let validator = ScheduleValidator::with_config(cfg);
    let result = validator.validate_stats(&stats, plan.as_ref(), age, survey.as_ref());
    super::print_json(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_months_rejects_negative() {
        assert_eq!(age_months(14).unwrap(), 14);
        assert!(matches!(
            age_months(-1),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
