//! Progress snapshots reported by the work queue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read-only snapshot of a job's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: String,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Time of the first successful pop
    pub started_at: Option<DateTime<Utc>>,
    /// Latest terminal transition, only once the job is complete
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobProgress {
    /// Nothing pending and nothing in flight
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.processing == 0
    }

    /// Share of items in a terminal state, 0.0 to 100.0
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed + self.failed) as f64 / self.total as f64 * 100.0
    }

    /// Wall-clock time from first pop to last terminal transition
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => (end - start).to_std().ok(),
            _ => None,
        }
    }
}
