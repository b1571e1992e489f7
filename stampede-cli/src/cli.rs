//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use stampede_core::{Band, LaunchMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load-test driver for workflow engine scheduling", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to, overriding the configuration
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Port to listen on, overriding the configuration
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Launch a batch of workflows directly and print the dispatch report
    Launch {
        /// Workflow id prefix; ids are PREFIX-1 .. PREFIX-N
        #[arg(long, value_name = "PREFIX")]
        prefix: String,

        /// Number of workflows (ignored when bands carry explicit counts)
        #[arg(long, value_name = "N")]
        count: Option<u64>,

        /// Launch mode: priority or fairness
        #[arg(long, value_name = "MODE", default_value = "priority")]
        mode: LaunchMode,

        /// Fairness band as key:weight[:count]; repeat for several bands
        #[arg(long = "band", value_name = "BAND")]
        bands: Vec<Band>,

        /// Send fairness weight 0 while still tagging bands
        #[arg(long)]
        disable_fairness: bool,
    },

    /// Print the progress summary of a run as JSON
    Status {
        /// Workflow id prefix of the run
        #[arg(long, value_name = "PREFIX")]
        prefix: String,

        /// Group by priority tier or by fairness band
        #[arg(long, value_name = "MODE", default_value = "priority")]
        mode: LaunchMode,
    },

    /// Print the effective configuration as YAML
    Config,
}
