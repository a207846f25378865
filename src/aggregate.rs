//! Consolidation of terminal work items into a stored result set
//!
//! Workers ack items with a JSON [`Verdict`] as the result payload. Once a
//! job's progress is complete the control path collects its completed and
//! failed items and turns them into one [`JobResults`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::partition::WorkItem;
use crate::storage::{ExecutionResult, ExecutionStatus, JobResults, ResultSummary};

/// Result payload a worker acks an item with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

impl Verdict {
    pub fn passed() -> Self {
        Self {
            passed: true,
            message: None,
            duration_ms: None,
            output: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
            duration_ms: None,
            output: None,
        }
    }

    /// Encode as an ack payload
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Build the result set of a finished job
///
/// Results are ordered by scenario then provider. Completed items whose
/// payload is missing or not a [`Verdict`] are recorded as errors.
pub fn consolidate(
    job_id: &str,
    namespace: &str,
    completed: &[WorkItem],
    failed: &[WorkItem],
) -> JobResults {
    let mut results: Vec<ExecutionResult> = completed
        .iter()
        .map(result_from_completed)
        .chain(failed.iter().map(result_from_failed))
        .collect();
    results.sort_by(|a, b| {
        (&a.scenario_id, &a.provider_id, &a.work_item_id).cmp(&(
            &b.scenario_id,
            &b.provider_id,
            &b.work_item_id,
        ))
    });

    let summary = summarize(&results);
    let metadata = build_metadata(job_id, completed, failed);

    debug!(
        "Consolidated job {}: {} passed, {} failed of {}",
        job_id, summary.passed_items, summary.failed_items, summary.total_items
    );

    JobResults {
        namespace: namespace.to_string(),
        completed_at: Utc::now(),
        summary: Some(summary),
        results,
        metadata,
    }
}

/// Pure: Pass/fail counts; anything not passed counts as failed
pub fn summarize(results: &[ExecutionResult]) -> ResultSummary {
    let passed_items = results
        .iter()
        .filter(|r| r.status == ExecutionStatus::Passed)
        .count();

    ResultSummary {
        total_items: results.len(),
        passed_items,
        failed_items: results.len() - passed_items,
    }
}

/// Pure: Percentage of passed items, 0.0 for an empty job
pub fn success_rate(summary: &ResultSummary) -> f64 {
    if summary.total_items == 0 {
        return 0.0;
    }
    (summary.passed_items as f64 / summary.total_items as f64) * 100.0
}

/// Pure: Failed and errored results grouped by message
pub fn group_by_message(results: &[ExecutionResult]) -> HashMap<String, Vec<&ExecutionResult>> {
    let mut groups = HashMap::new();
    for result in results
        .iter()
        .filter(|r| r.status != ExecutionStatus::Passed)
    {
        let key = result
            .message
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        groups.entry(key).or_insert_with(Vec::new).push(result);
    }
    groups
}

fn result_from_completed(item: &WorkItem) -> ExecutionResult {
    let mut result = base_result(item);

    let Some(payload) = item.result.as_deref() else {
        warn!("Work item {} completed without a result payload", item.id);
        result.status = ExecutionStatus::Error;
        result.message = Some("missing result payload".to_string());
        return result;
    };

    match serde_json::from_slice::<Verdict>(payload) {
        Ok(verdict) => {
            result.status = if verdict.passed {
                ExecutionStatus::Passed
            } else {
                ExecutionStatus::Failed
            };
            result.message = verdict.message;
            result.duration_ms = verdict.duration_ms.or_else(|| elapsed_ms(item));
            result.output = verdict.output;
        }
        Err(e) => {
            warn!("Undecodable result for work item {}: {}", item.id, e);
            result.status = ExecutionStatus::Error;
            result.message = Some(format!("undecodable result: {}", e));
        }
    }
    result
}

fn result_from_failed(item: &WorkItem) -> ExecutionResult {
    let mut result = base_result(item);
    result.status = ExecutionStatus::Error;
    result.message = item.error.clone();
    result
}

fn base_result(item: &WorkItem) -> ExecutionResult {
    ExecutionResult {
        work_item_id: item.id.clone(),
        scenario_id: item.scenario_id.clone(),
        provider_id: item.provider_id.clone(),
        status: ExecutionStatus::Error,
        attempts: item.attempt,
        duration_ms: elapsed_ms(item),
        message: None,
        output: None,
    }
}

fn elapsed_ms(item: &WorkItem) -> Option<u64> {
    let (started, completed) = (item.started_at?, item.completed_at?);
    u64::try_from((completed - started).num_milliseconds()).ok()
}

fn build_metadata(
    job_id: &str,
    completed: &[WorkItem],
    failed: &[WorkItem],
) -> HashMap<String, String> {
    let mut metadata = HashMap::from([
        ("job_id".to_string(), job_id.to_string()),
        ("completed_items".to_string(), completed.len().to_string()),
        ("failed_items".to_string(), failed.len().to_string()),
    ]);

    let started_at: Option<DateTime<Utc>> = completed
        .iter()
        .chain(failed)
        .filter_map(|item| item.started_at)
        .min();
    if let Some(started_at) = started_at {
        metadata.insert("started_at".to_string(), started_at.to_rfc3339());
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::WorkItemStatus;
    use chrono::Duration;
    use serde_json::json;

    fn item(id: &str, scenario: &str, provider: &str) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id: id.to_string(),
            job_id: "job-1".to_string(),
            scenario_id: scenario.to_string(),
            provider_id: provider.to_string(),
            bundle_url: "oci://bundle".to_string(),
            config: b"{}".to_vec(),
            status: WorkItemStatus::Completed,
            attempt: 1,
            max_attempts: 3,
            created_at: now,
            started_at: Some(now - Duration::seconds(3)),
            completed_at: Some(now),
            result: None,
            error: None,
        }
    }

    fn completed_with(id: &str, scenario: &str, verdict: &Verdict) -> WorkItem {
        let mut item = item(id, scenario, "evals/gpt");
        item.result = Some(verdict.to_bytes().unwrap());
        item
    }

    fn failed_with(id: &str, scenario: &str, error: &str) -> WorkItem {
        let mut item = item(id, scenario, "evals/gpt");
        item.status = WorkItemStatus::Failed;
        item.attempt = 3;
        item.error = Some(error.to_string());
        item
    }

    #[test]
    fn test_consolidate_counts_and_statuses() {
        let completed = vec![
            completed_with("a-1", "a", &Verdict::passed()),
            completed_with("b-1", "b", &Verdict::failed("wrong refund amount")),
        ];
        let failed = vec![failed_with("c-1", "c", "provider timeout")];

        let results = consolidate("job-1", "evals", &completed, &failed);
        let summary = results.summary.unwrap();

        assert_eq!(results.namespace, "evals");
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.passed_items, 1);
        assert_eq!(summary.failed_items, 2);

        let statuses: Vec<_> = results.results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ExecutionStatus::Passed,
                ExecutionStatus::Failed,
                ExecutionStatus::Error
            ]
        );
        assert_eq!(results.results[2].message.as_deref(), Some("provider timeout"));
        assert_eq!(results.results[2].attempts, 3);
    }

    #[test]
    fn test_verdict_fields_carried_over() {
        let verdict = Verdict {
            passed: true,
            message: Some("ok".to_string()),
            duration_ms: Some(42),
            output: Some(json!({"turns": 5})),
        };
        let results = consolidate("job-1", "evals", &[completed_with("a-1", "a", &verdict)], &[]);
        let result = &results.results[0];

        assert_eq!(result.duration_ms, Some(42));
        assert_eq!(result.message.as_deref(), Some("ok"));
        assert_eq!(result.output, Some(json!({"turns": 5})));
    }

    #[test]
    fn test_duration_falls_back_to_timestamps() {
        let results = consolidate(
            "job-1",
            "evals",
            &[completed_with("a-1", "a", &Verdict::passed())],
            &[],
        );
        assert_eq!(results.results[0].duration_ms, Some(3000));
    }

    #[test]
    fn test_undecodable_and_missing_payloads_are_errors() {
        let mut garbage = item("a-1", "a", "evals/gpt");
        garbage.result = Some(b"not json".to_vec());
        let missing = item("b-1", "b", "evals/gpt");

        let results = consolidate("job-1", "evals", &[garbage, missing], &[]);

        assert!(results
            .results
            .iter()
            .all(|r| r.status == ExecutionStatus::Error));
        assert_eq!(results.summary.unwrap().failed_items, 2);
        assert!(results.results[0]
            .message
            .as_deref()
            .unwrap()
            .starts_with("undecodable result"));
        assert_eq!(
            results.results[1].message.as_deref(),
            Some("missing result payload")
        );
    }

    #[test]
    fn test_metadata() {
        let completed = vec![completed_with("a-1", "a", &Verdict::passed())];
        let failed = vec![failed_with("b-1", "b", "boom")];
        let earliest = completed[0].started_at.unwrap().min(failed[0].started_at.unwrap());

        let results = consolidate("job-1", "evals", &completed, &failed);

        assert_eq!(results.metadata["job_id"], "job-1");
        assert_eq!(results.metadata["completed_items"], "1");
        assert_eq!(results.metadata["failed_items"], "1");
        assert_eq!(results.metadata["started_at"], earliest.to_rfc3339());
    }

    #[test]
    fn test_empty_job() {
        let results = consolidate("job-1", "evals", &[], &[]);
        let summary = results.summary.unwrap();

        assert_eq!(summary.total_items, 0);
        assert_eq!(success_rate(&summary), 0.0);
        assert!(!results.metadata.contains_key("started_at"));
    }

    #[test]
    fn test_success_rate() {
        let summary = ResultSummary {
            total_items: 4,
            passed_items: 3,
            failed_items: 1,
        };
        assert_eq!(success_rate(&summary), 75.0);
    }

    #[test]
    fn test_group_by_message() {
        let completed = vec![
            completed_with("a-1", "a", &Verdict::passed()),
            completed_with("b-1", "b", &Verdict::failed("timeout")),
        ];
        let failed = vec![
            failed_with("c-1", "c", "timeout"),
            failed_with("d-1", "d", "crash"),
        ];
        let results = consolidate("job-1", "evals", &completed, &failed);

        let groups = group_by_message(&results.results);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["timeout"].len(), 2);
        assert_eq!(groups["crash"].len(), 1);
    }
}
