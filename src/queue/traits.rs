//! Core trait definition for the work queue

use async_trait::async_trait;
use std::time::Duration;

use super::error::QueueResult;
use super::types::JobProgress;
use crate::partition::WorkItem;

/// Per-job, multi-consumer work distribution
///
/// Items move `Pending → Processing → Completed`, or back from `Processing`
/// to the tail of `Pending` on a nack with attempts remaining, or to
/// `Failed` once the attempt budget is spent. Every returned item is a copy;
/// mutating it never affects queue state.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Append items to the job's pending sequence in order
    async fn push(&self, job_id: &str, items: Vec<WorkItem>) -> QueueResult<()>;

    /// Take the oldest pending item; `QueueError::Empty` when there is none
    async fn pop(&self, job_id: &str) -> QueueResult<WorkItem>;

    /// Record a successful execution of a processing item
    async fn ack(&self, job_id: &str, item_id: &str, result: Vec<u8>) -> QueueResult<WorkItem>;

    /// Record a failed execution; the item is retried or moved to failed
    async fn nack(&self, job_id: &str, item_id: &str, error: &str) -> QueueResult<WorkItem>;

    /// Snapshot of the job's item counts
    async fn progress(&self, job_id: &str) -> QueueResult<JobProgress>;

    /// Copies of every completed item
    async fn completed_items(&self, job_id: &str) -> QueueResult<Vec<WorkItem>>;

    /// Copies of every failed item
    async fn failed_items(&self, job_id: &str) -> QueueResult<Vec<WorkItem>>;

    /// Nack every item that has been processing for longer than `visibility_timeout`
    ///
    /// Returns the number of items reclaimed across all jobs.
    async fn reclaim_expired(&self, visibility_timeout: Duration) -> QueueResult<usize>;

    /// Permanently close the queue and release all job state
    async fn close(&self) -> QueueResult<()>;
}
