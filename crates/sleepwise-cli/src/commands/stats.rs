use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use clap::Args;
use sleepwise_core::StatsAggregator;

#[derive(Args)]
pub struct StatsArgs {
    /// JSON file with an array of events
    #[arg(long)]
    events: PathBuf,
    /// Only events starting at or after this instant
    #[arg(long, value_parser = super::parse_instant)]
    from: Option<DateTime<FixedOffset>>,
    /// Only events starting before this instant
    #[arg(long, value_parser = super::parse_instant)]
    to: Option<DateTime<FixedOffset>>,
}

pub fn run(args: StatsArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = super::load_config(config)?;
    let events = super::read_events(&args.events)?;
    let stats = StatsAggregator::with_bounds(cfg.plausibility)
        .compute_stats_between(&events, args.from, args.to)?;
    super::print_json(&stats)
}
