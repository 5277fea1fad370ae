use std::path::{Path, PathBuf};

use clap::Args;
use sleepwise_core::{Denominator, PeriodLabel, StatsAggregator};

#[derive(Args)]
pub struct DailyArgs {
    /// JSON file with an array of events
    #[arg(long)]
    events: PathBuf,
    /// week, month, quarter, or a number of days
    #[arg(long, default_value = "week")]
    period: PeriodLabel,
    /// Divide by the period length ("period") or by days with data ("data")
    #[arg(long, default_value = "period")]
    denominator: Denominator,
}

pub fn run(args: DailyArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = super::load_config(config)?;
    let events = super::read_events(&args.events)?;
    let aggregate = StatsAggregator::with_bounds(cfg.plausibility).aggregate_daily(
        &events,
        args.period,
        args.denominator,
    )?;
    super::print_json(&aggregate)
}
