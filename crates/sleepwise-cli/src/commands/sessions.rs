use std::path::PathBuf;

use clap::Args;
use sleepwise_core::group_events;

#[derive(Args)]
pub struct SessionsArgs {
    /// JSON file with an array of events
    #[arg(long)]
    events: PathBuf,
}

pub fn run(args: SessionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let events = super::read_events(&args.events)?;
    let grouping = group_events(&events)?;
    super::print_json(&grouping)
}
