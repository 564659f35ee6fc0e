//! Squeeze CLI
//!
//! Command-line front end for the compressor and bar meter.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use squeeze::cli::commands::{self, ProcessOverrides};
use squeeze::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Squeeze v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Process {
            input,
            output,
            config,
            variant,
            threshold,
            ratio,
            block_size,
        } => {
            let overrides = ProcessOverrides {
                variant,
                threshold_db: threshold,
                ratio,
                block_size,
            };
            commands::process(&input, &output, config.as_deref(), &overrides)
        }
        Commands::Ladder { crest_factor, bars } => commands::ladder(crest_factor, bars),
        Commands::InitConfig { path } => commands::init_config(&path),
    }
}
