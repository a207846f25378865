//! `evalfleet results`

use anyhow::Result;

use crate::aggregate::{group_by_message, success_rate};
use crate::cli::args::ResultsCommands;
use crate::error::{ErrorCode, FleetError};
use crate::storage::{BackendType, ExecutionResult, ResultInfo, StorageConfig, StorageFactory};

pub async fn run_results_command(command: ResultsCommands, config: &StorageConfig) -> Result<()> {
    // A fresh process never sees results held by another process's memory backend
    if config.backend == BackendType::Memory {
        return Err(FleetError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "the results command needs persistent storage; set storage.backend to 'file' \
             with a base_dir, or export EVALFLEET_STORAGE_TYPE=file and EVALFLEET_STORAGE_DIR",
        )
        .into());
    }

    let storage = StorageFactory::from_config(config).await.map_err(FleetError::from)?;

    match command {
        ResultsCommands::List { prefix } => {
            let infos = storage.list_with_info(&prefix).await.map_err(FleetError::from)?;
            if infos.is_empty() {
                println!("No stored results found.");
            } else {
                for info in &infos {
                    println!("{}", format_result_info(info));
                }
            }
        }
        ResultsCommands::Show { job_id } => {
            let results = storage.get(&job_id).await.map_err(FleetError::from)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            for line in format_failure_groups(&results.results) {
                eprintln!("{}", line);
            }
        }
        ResultsCommands::Delete { job_id } => {
            storage.delete(&job_id).await.map_err(FleetError::from)?;
            println!("Deleted results for job '{}'", job_id);
        }
    }

    storage.close().await.map_err(FleetError::from)?;
    Ok(())
}

/// Pure: One listing line per stored job
pub fn format_result_info(info: &ResultInfo) -> String {
    let summary = match &info.summary {
        Some(summary) => format!(
            "{}/{} passed ({:.1}%)",
            summary.passed_items,
            summary.total_items,
            success_rate(summary)
        ),
        None => "no summary".to_string(),
    };
    format!(
        "{}  {}  {}  {}  {} bytes",
        info.job_id,
        info.namespace,
        info.completed_at.format("%Y-%m-%d %H:%M:%S"),
        summary,
        info.size_bytes
    )
}

/// Pure: Failure groups as "<count> x <message>", most frequent first
pub fn format_failure_groups(results: &[ExecutionResult]) -> Vec<String> {
    let mut groups: Vec<(String, usize)> = group_by_message(results)
        .into_iter()
        .map(|(message, members)| (message, members.len()))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    groups
        .into_iter()
        .map(|(message, count)| format!("{} x {}", count, message))
        .collect()
}
