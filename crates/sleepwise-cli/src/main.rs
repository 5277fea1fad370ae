use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sleepwise-cli", version, about = "Sleepwise CLI")]
struct Cli {
    /// Config file (defaults to ~/.config/sleepwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group events into sleep sessions
    Sessions(commands::sessions::SessionsArgs),
    /// Period statistics
    Stats(commands::stats::StatsArgs),
    /// Average daily night/nap split
    Daily(commands::daily::DailyArgs),
    /// Validate the sleep schedule against age norms
    Validate(commands::validate::ValidateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Sessions(args) => commands::sessions::run(args),
        Commands::Stats(args) => commands::stats::run(args, config),
        Commands::Daily(args) => commands::daily::run(args, config),
        Commands::Validate(args) => commands::validate::run(args, config),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
