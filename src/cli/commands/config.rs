//! Configuration command implementations

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::config::ScorepipeConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Check that the configuration loads and is valid
    Validate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub async fn execute(args: ConfigArgs, config_path: Option<&str>) -> Result<()> {
    let config = ScorepipeConfig::load(config_path, None)?;

    match args.command {
        ConfigCommands::Show { format } => {
            let rendered = match format {
                ConfigFormat::Toml => toml::to_string_pretty(&config).context("Failed to serialize configuration")?,
                ConfigFormat::Json => {
                    serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
                }
            };
            println!("{rendered}");
        }
        ConfigCommands::Validate => {
            println!("Configuration is valid");
        }
    }

    Ok(())
}
