//! `evalfleet plan`

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

use crate::error::FleetError;
use crate::partition::{batch, enumerate_scenarios, PartitionRequest, Provider, WorkItem};

/// Parameters for the plan command
pub struct PlanParams {
    pub job_config: PathBuf,
    pub job_id: String,
    pub bundle_url: String,
    pub providers: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_retries: u32,
    pub batch_size: Option<usize>,
    pub base_config: Option<PathBuf>,
}

/// Printable form of a work item with its config decoded
#[derive(Debug, Serialize)]
pub struct PlannedItem {
    pub id: String,
    pub job_id: String,
    pub scenario_id: String,
    pub provider_id: String,
    pub bundle_url: String,
    pub max_attempts: u32,
    pub config: Value,
}

impl PlannedItem {
    fn from_item(item: &WorkItem) -> Result<Self> {
        Ok(Self {
            id: item.id.clone(),
            job_id: item.job_id.clone(),
            scenario_id: item.scenario_id.clone(),
            provider_id: item.provider_id.clone(),
            bundle_url: item.bundle_url.clone(),
            max_attempts: item.max_attempts,
            config: item.config_json()?,
        })
    }
}

pub fn run_plan_command(params: PlanParams) -> Result<()> {
    let output = build_plan(params)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Plan the job and shape the JSON output
pub fn build_plan(params: PlanParams) -> Result<Value> {
    let providers = parse_providers(&params.providers)?;
    let base_config = params
        .base_config
        .as_deref()
        .map(load_base_config)
        .transpose()?;

    let request = PartitionRequest {
        job_id: params.job_id,
        bundle_url: params.bundle_url,
        scenarios: enumerate_scenarios(&params.job_config)?,
        providers,
        max_retries: params.max_retries,
        base_config,
        include: params.include,
        exclude: params.exclude,
    };

    let items = request.plan().map_err(FleetError::from)?;
    let planned = items
        .iter()
        .map(PlannedItem::from_item)
        .collect::<Result<Vec<_>>>()?;
    info!("Planned {} work items for job {}", planned.len(), request.job_id);

    let output = match params.batch_size {
        Some(size) => serde_json::to_value(batch(&planned, size))?,
        None => serde_json::to_value(&planned)?,
    };
    Ok(output)
}

fn parse_providers(values: &[String]) -> Result<Vec<Provider>> {
    values
        .iter()
        .map(|value| {
            value
                .parse::<Provider>()
                .map_err(|e| anyhow!("Invalid provider '{}': {}", value, e))
        })
        .collect()
}

fn load_base_config(path: &std::path::Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read base config {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Base config {} must be a mapping", path.display()))
}
