//! Type definitions for result storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::StorageResult;

/// Consolidated results of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResults {
    pub namespace: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
    #[serde(default)]
    pub results: Vec<ExecutionResult>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Pass/fail counts of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_items: usize,
    pub passed_items: usize,
    pub failed_items: usize,
}

/// Outcome of a single scenario×provider evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// The agent met the scenario's expectations
    Passed,
    /// The agent ran but did not meet expectations
    Failed,
    /// The item could not be evaluated
    Error,
}

/// Result of one work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub work_item_id: String,
    pub scenario_id: String,
    pub provider_id: String,
    pub status: ExecutionStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

/// Listing entry for a stored result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub job_id: String,
    pub namespace: String,
    pub completed_at: DateTime<Utc>,
    /// Size of the serialized result set
    pub size_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
}

impl ResultInfo {
    pub fn from_results(job_id: &str, results: &JobResults) -> StorageResult<Self> {
        Ok(Self {
            job_id: job_id.to_string(),
            namespace: results.namespace.clone(),
            completed_at: results.completed_at,
            size_bytes: serde_json::to_vec(results)?.len(),
            summary: results.summary,
        })
    }
}
