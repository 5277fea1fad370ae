use std::path::Path;

use clap::Subcommand;
use sleepwise_core::AnalysisConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config as TOML
    Show,
    /// Get a config value (e.g. "thresholds.clock_ok_minutes")
    Get {
        /// Dot-separated config key
        key: String,
    },
    /// Print the config file location
    Path,
    /// Print the built-in defaults as TOML
    Default,
}

pub fn run(action: ConfigAction, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let cfg = super::load_config(config)?;
            print!("{}", cfg.to_toml_string()?);
        }
        ConfigAction::Get { key } => {
            let cfg = super::load_config(config)?;
            match cfg.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Path => {
            let path = config
                .map(Path::to_path_buf)
                .unwrap_or_else(AnalysisConfig::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Default => {
            print!("{}", AnalysisConfig::default().to_toml_string()?);
        }
    }
    Ok(())
}
