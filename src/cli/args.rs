//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plan and distribute agent evaluation runs
#[derive(Parser)]
#[command(name = "evalfleet")]
#[command(about = "evalfleet - Plan and distribute agent evaluation runs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fleet configuration file (queue, worker and storage settings)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the scenarios referenced by a job config
    #[command(name = "scenarios")]
    Scenarios {
        /// Job config file
        job_config: PathBuf,

        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Expand a job into work items and print them as JSON
    #[command(name = "plan")]
    Plan {
        /// Job config file
        job_config: PathBuf,

        /// Identifier of the evaluation job
        #[arg(long)]
        job_id: String,

        /// Location of the packaged agent under test
        #[arg(long, default_value = "")]
        bundle_url: String,

        /// Provider to evaluate against (repeatable)
        #[arg(long = "provider", value_name = "NAMESPACE/NAME", required = true)]
        providers: Vec<String>,

        /// Only keep scenarios matching these glob patterns
        #[arg(long, value_name = "PATTERN")]
        include: Vec<String>,

        /// Drop scenarios matching these glob patterns
        #[arg(long, value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Attempt budget per item (defaults to queue.max_retries)
        #[arg(long)]
        max_retries: Option<u32>,

        /// Group the output into batches of this size
        #[arg(long)]
        batch_size: Option<usize>,

        /// YAML or JSON object merged into every item's config
        #[arg(long, value_name = "FILE")]
        base_config: Option<PathBuf>,
    },

    /// Print how many work items a job would produce
    #[command(name = "estimate")]
    Estimate {
        /// Job config file
        job_config: PathBuf,

        /// Number of providers
        #[arg(long)]
        providers: usize,

        /// Only count scenarios matching these glob patterns
        #[arg(long, value_name = "PATTERN")]
        include: Vec<String>,

        /// Do not count scenarios matching these glob patterns
        #[arg(long, value_name = "PATTERN")]
        exclude: Vec<String>,
    },

    /// Inspect stored job results
    #[command(name = "results")]
    Results {
        #[command(subcommand)]
        command: ResultsCommands,
    },
}

#[derive(Subcommand)]
pub enum ResultsCommands {
    /// List stored results
    List {
        /// Only list job ids starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Print the stored results of one job
    Show {
        /// Job identifier
        job_id: String,
    },
    /// Delete the stored results of one job
    Delete {
        /// Job identifier
        job_id: String,
    },
}
