//! Pure expansion of a job request into independent work items
//!
//! Every scenario×provider pair becomes one work item carrying everything a
//! worker needs: the bundle location and a single opaque config payload that
//! holds the job's base config plus `scenario` and `provider` sub-objects.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::error::{PartitionError, PartitionResult};
use super::filter::filter;
use super::types::{PartitionRequest, Provider, Scenario, WorkItem, WorkItemStatus};

/// Expand scenarios × providers into work items
///
/// Fails without producing anything when either list is empty, when the job
/// id is empty, when two scenarios share an id, or when any pair's config
/// cannot be serialized.
pub fn partition(
    job_id: &str,
    bundle_url: &str,
    scenarios: &[Scenario],
    providers: &[Provider],
    max_retries: u32,
    base_config: Option<&Map<String, Value>>,
) -> PartitionResult<Vec<WorkItem>> {
    if job_id.is_empty() {
        return Err(PartitionError::InvalidJobId);
    }
    if scenarios.is_empty() || providers.is_empty() {
        return Err(PartitionError::empty_input(
            job_id,
            scenarios.len(),
            providers.len(),
        ));
    }
    ensure_unique_scenarios(job_id, scenarios)?;

    let created_at = Utc::now();
    let mut items = Vec::with_capacity(estimate_work_items(scenarios.len(), providers.len()));

    for scenario in scenarios {
        for provider in providers {
            let config = build_item_config(base_config, scenario, provider).map_err(|source| {
                PartitionError::Config {
                    scenario_id: scenario.id.clone(),
                    provider_id: provider.id.clone(),
                    source,
                }
            })?;

            items.push(WorkItem {
                id: generate_item_id(&scenario.id),
                job_id: job_id.to_string(),
                scenario_id: scenario.id.clone(),
                provider_id: provider.id.clone(),
                bundle_url: bundle_url.to_string(),
                config,
                status: WorkItemStatus::Pending,
                attempt: 0,
                max_attempts: max_retries,
                created_at,
                started_at: None,
                completed_at: None,
                result: None,
                error: None,
            });
        }
    }

    debug!(
        "Partitioned job {} into {} work items ({} scenarios x {} providers)",
        job_id,
        items.len(),
        scenarios.len(),
        providers.len()
    );
    Ok(items)
}

impl PartitionRequest {
    /// Apply the request's include/exclude filters, then partition
    pub fn plan(&self) -> PartitionResult<Vec<WorkItem>> {
        let scenarios = filter(&self.scenarios, &self.include, &self.exclude);
        partition(
            &self.job_id,
            &self.bundle_url,
            &scenarios,
            &self.providers,
            self.max_retries,
            self.base_config.as_ref(),
        )
    }

    /// Number of work items `plan` would produce
    pub fn estimate(&self) -> usize {
        let scenarios = filter(&self.scenarios, &self.include, &self.exclude);
        estimate_work_items(scenarios.len(), self.providers.len())
    }
}

fn ensure_unique_scenarios(job_id: &str, scenarios: &[Scenario]) -> PartitionResult<()> {
    let mut seen = HashSet::with_capacity(scenarios.len());
    for scenario in scenarios {
        if !seen.insert(scenario.id.as_str()) {
            return Err(PartitionError::DuplicateScenario {
                job_id: job_id.to_string(),
                scenario_id: scenario.id.clone(),
            });
        }
    }
    Ok(())
}

/// Pure: Shallow-merge the base config with the scenario and provider
fn build_item_config(
    base_config: Option<&Map<String, Value>>,
    scenario: &Scenario,
    provider: &Provider,
) -> serde_json::Result<Vec<u8>> {
    let mut config = base_config.cloned().unwrap_or_default();
    config.insert("scenario".to_string(), serde_json::to_value(scenario)?);
    config.insert("provider".to_string(), serde_json::to_value(provider)?);
    serde_json::to_vec(&Value::Object(config))
}

fn generate_item_id(scenario_id: &str) -> String {
    format!("{}-{}", scenario_id, Uuid::new_v4().simple())
}

/// Pure: Split items into chunks of `size`; zero means a single batch
pub fn batch<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if size == 0 || items.is_empty() {
        return vec![items];
    }
    items.chunks(size).collect()
}

/// Pure: Number of work items a job would expand to
pub fn estimate_work_items(scenario_count: usize, provider_count: usize) -> usize {
    scenario_count.saturating_mul(provider_count)
}
