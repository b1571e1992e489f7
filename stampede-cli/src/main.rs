//! Stampede CLI
//!
//! Runs the load-test HTTP server, or launches and polls batches directly
//! from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use stampede_config::{ConfigLoader, LogLevel, StampedeConfig};
use stampede_logging::init_logging_from_config;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::LaunchOptions;

fn load_config(cli: &Cli) -> Result<StampedeConfig> {
    let mut config = ConfigLoader::new()
        .load(cli.config.as_ref())
        .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level
            .parse::<LogLevel>()
            .map_err(|e| anyhow::anyhow!("Invalid --log-level: {}", e))?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // `config` prints YAML to stdout, keep logs out of it
    if !matches!(cli.command, Commands::Config) {
        init_logging_from_config(&config.logging)?;
    }

    match cli.command {
        Commands::Serve { bind, port } => commands::serve(config, bind, port).await,
        Commands::Launch {
            prefix,
            count,
            mode,
            bands,
            disable_fairness,
        } => {
            let options = LaunchOptions {
                prefix,
                count,
                mode,
                bands,
                disable_fairness,
            };
            commands::launch(&config, options).await
        }
        Commands::Status { prefix, mode } => commands::status(&config, prefix, mode).await,
        Commands::Config => commands::print_config(&config),
    }
}
