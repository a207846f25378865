//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::FleetConfig;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, config: &FleetConfig) -> Result<()> {
    match command {
        Commands::Scenarios { job_config, json } => run_scenarios_command(&job_config, json),
        Commands::Plan {
            job_config,
            job_id,
            bundle_url,
            providers,
            include,
            exclude,
            max_retries,
            batch_size,
            base_config,
        } => run_plan_command(PlanParams {
            job_config,
            job_id,
            bundle_url,
            providers,
            include,
            exclude,
            max_retries: max_retries.unwrap_or(config.queue.max_retries),
            batch_size,
            base_config,
        }),
        Commands::Estimate {
            job_config,
            providers,
            include,
            exclude,
        } => run_estimate_command(&job_config, providers, &include, &exclude),
        Commands::Results { command } => run_results_command(command, &config.storage).await,
    }
}
