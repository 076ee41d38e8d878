//! Command-line interface for scorepipe
//!
//! Parses arguments with clap, sets up logging, and dispatches to the
//! command implementations in [`commands`].

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

/// scorepipe - bounded producer/consumer matrix scoring
#[derive(Parser)]
#[command(
    name = "scorepipe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Score matrix work items on a bounded worker pipeline",
    long_about = "scorepipe feeds work items through a bounded blocking queue into a pool of \
                  worker threads, scores each item's generated matrix, and reports the results \
                  above a threshold in ascending score order."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score the work items in an input file
    Run(commands::run::RunArgs),
    /// Configuration management
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, self.config.as_deref(), &output).await,
            Some(Commands::Config(args)) => commands::config::execute(args, self.config.as_deref()).await,
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => {
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info"),
        2 => tracing_subscriber::EnvFilter::new("debug,figment=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // try_init: a subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
