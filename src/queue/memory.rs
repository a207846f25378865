//! In-memory work queue
//!
//! Two-level locking: `registry` maps job ids to job state and is only held
//! long enough to look up, create or drop an entry. Each job's four item sets
//! sit behind their own mutex, so unrelated jobs never contend with each
//! other. The registry lock is never taken while a job lock is held.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::error::{QueueError, QueueResult};
use super::traits::WorkQueue;
use super::types::JobProgress;
use crate::config::QueueConfig;
use crate::partition::{WorkItem, WorkItemStatus};

const VISIBILITY_TIMEOUT_ERROR: &str = "visibility timeout exceeded";

/// Items of one job, partitioned by lifecycle state
#[derive(Debug, Default)]
struct JobState {
    pending: VecDeque<WorkItem>,
    processing: HashMap<String, WorkItem>,
    completed: HashMap<String, WorkItem>,
    failed: HashMap<String, WorkItem>,
    started_at: Option<DateTime<Utc>>,
}

/// Outcome of a nack
enum NackOutcome {
    Requeued(WorkItem),
    Failed(WorkItem),
}

impl NackOutcome {
    fn into_item(self) -> WorkItem {
        match self {
            Self::Requeued(item) | Self::Failed(item) => item,
        }
    }
}

impl JobState {
    fn push(
        &mut self,
        job_id: &str,
        items: Vec<WorkItem>,
        default_max_attempts: u32,
        now: DateTime<Utc>,
    ) -> QueueResult<()> {
        if let Some(dup) = self.first_duplicate(&items) {
            return Err(QueueError::duplicate_item(job_id, dup));
        }

        for mut item in items {
            item.job_id = job_id.to_string();
            item.created_at = now;
            item.status = WorkItemStatus::Pending;
            if item.max_attempts == 0 {
                item.max_attempts = default_max_attempts;
            }
            self.pending.push_back(item);
        }
        Ok(())
    }

    fn first_duplicate<'a>(&self, items: &'a [WorkItem]) -> Option<&'a str> {
        let mut incoming = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| item.id.as_str())
            .find(|id| self.contains(id) || !incoming.insert(*id))
    }

    fn contains(&self, item_id: &str) -> bool {
        self.processing.contains_key(item_id)
            || self.completed.contains_key(item_id)
            || self.failed.contains_key(item_id)
            || self.pending.iter().any(|i| i.id == item_id)
    }

    fn pop(&mut self, now: DateTime<Utc>) -> Option<WorkItem> {
        let mut item = self.pending.pop_front()?;
        item.status = WorkItemStatus::Processing;
        item.started_at = Some(now);
        item.attempt += 1;
        self.started_at.get_or_insert(now);

        self.processing.insert(item.id.clone(), item.clone());
        Some(item)
    }

    fn ack(&mut self, item_id: &str, result: Vec<u8>, now: DateTime<Utc>) -> Option<WorkItem> {
        let mut item = self.processing.remove(item_id)?;
        item.status = WorkItemStatus::Completed;
        item.completed_at = Some(now);
        item.result = Some(result);

        self.completed.insert(item.id.clone(), item.clone());
        Some(item)
    }

    fn nack(&mut self, item_id: &str, error: &str, now: DateTime<Utc>) -> Option<NackOutcome> {
        let mut item = self.processing.remove(item_id)?;
        item.error = Some(error.to_string());

        if item.has_attempts_remaining() {
            item.status = WorkItemStatus::Pending;
            item.started_at = None;
            self.pending.push_back(item.clone());
            Some(NackOutcome::Requeued(item))
        } else {
            item.status = WorkItemStatus::Failed;
            item.completed_at = Some(now);
            self.failed.insert(item.id.clone(), item.clone());
            Some(NackOutcome::Failed(item))
        }
    }

    /// Ids of processing items popped at or before `deadline`
    fn expired(&self, deadline: DateTime<Utc>) -> Vec<String> {
        self.processing
            .values()
            .filter(|item| item.started_at.is_some_and(|started| started <= deadline))
            .map(|item| item.id.clone())
            .collect()
    }

    fn progress(&self, job_id: &str) -> JobProgress {
        let pending = self.pending.len();
        let processing = self.processing.len();
        let completed = self.completed.len();
        let failed = self.failed.len();
        let total = pending + processing + completed + failed;

        let completed_at = if pending == 0 && processing == 0 && total > 0 {
            self.completed
                .values()
                .chain(self.failed.values())
                .filter_map(|item| item.completed_at)
                .max()
        } else {
            None
        };

        JobProgress {
            job_id: job_id.to_string(),
            pending,
            processing,
            completed,
            failed,
            total,
            started_at: self.started_at,
            completed_at,
        }
    }

    #[cfg(test)]
    fn memberships(&self, item_id: &str) -> usize {
        self.pending.iter().filter(|i| i.id == item_id).count()
            + usize::from(self.processing.contains_key(item_id))
            + usize::from(self.completed.contains_key(item_id))
            + usize::from(self.failed.contains_key(item_id))
    }
}

type SharedJobState = Arc<Mutex<JobState>>;

#[derive(Default)]
struct Registry {
    closed: bool,
    jobs: HashMap<String, SharedJobState>,
}

/// In-memory work queue for a single process
pub struct MemoryWorkQueue {
    default_max_attempts: u32,
    registry: RwLock<Registry>,
}

impl MemoryWorkQueue {
    /// Create a queue whose items default to `default_max_attempts` attempts
    pub fn new(default_max_attempts: u32) -> Self {
        Self {
            default_max_attempts: default_max_attempts.max(1),
            registry: RwLock::new(Registry::default()),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(config.max_retries)
    }

    /// Look up a job's state without creating it
    async fn job(&self, job_id: &str) -> QueueResult<Option<SharedJobState>> {
        let registry = self.registry.read().await;
        if registry.closed {
            return Err(QueueError::Closed);
        }
        Ok(registry.jobs.get(job_id).cloned())
    }

    async fn job_or_create(&self, job_id: &str) -> QueueResult<SharedJobState> {
        let mut registry = self.registry.write().await;
        if registry.closed {
            return Err(QueueError::Closed);
        }
        Ok(Arc::clone(registry.jobs.entry(job_id.to_string()).or_default()))
    }

    async fn existing_job(&self, job_id: &str) -> QueueResult<SharedJobState> {
        self.job(job_id)
            .await?
            .ok_or_else(|| QueueError::job_not_found(job_id))
    }

    async fn all_jobs(&self) -> QueueResult<Vec<(String, SharedJobState)>> {
        let registry = self.registry.read().await;
        if registry.closed {
            return Err(QueueError::Closed);
        }
        Ok(registry
            .jobs
            .iter()
            .map(|(id, state)| (id.clone(), Arc::clone(state)))
            .collect())
    }
}

impl Default for MemoryWorkQueue {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default())
    }
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
    async fn push(&self, job_id: &str, items: Vec<WorkItem>) -> QueueResult<()> {
        if job_id.is_empty() {
            return Err(QueueError::InvalidJobId);
        }

        let job = self.job_or_create(job_id).await?;
        let count = items.len();
        job.lock()
            .await
            .push(job_id, items, self.default_max_attempts, Utc::now())?;

        info!("Pushed {} work items to job {}", count, job_id);
        Ok(())
    }

    async fn pop(&self, job_id: &str) -> QueueResult<WorkItem> {
        let job = self
            .job(job_id)
            .await?
            .ok_or_else(|| QueueError::empty(job_id))?;

        let item = job
            .lock()
            .await
            .pop(Utc::now())
            .ok_or_else(|| QueueError::empty(job_id))?;

        debug!(
            "Popped item {} of job {} (attempt {}/{})",
            item.id, job_id, item.attempt, item.max_attempts
        );
        Ok(item)
    }

    async fn ack(&self, job_id: &str, item_id: &str, result: Vec<u8>) -> QueueResult<WorkItem> {
        let job = self
            .job(job_id)
            .await?
            .ok_or_else(|| QueueError::item_not_found(job_id, item_id))?;

        let mut state = job.lock().await;
        let item = state
            .ack(item_id, result, Utc::now())
            .ok_or_else(|| QueueError::item_not_found(job_id, item_id))?;

        debug!("Acked item {} of job {}", item_id, job_id);
        if state.pending.is_empty() && state.processing.is_empty() {
            info!("All work items of job {} reached a terminal state", job_id);
        }
        Ok(item)
    }

    async fn nack(&self, job_id: &str, item_id: &str, error: &str) -> QueueResult<WorkItem> {
        let job = self
            .job(job_id)
            .await?
            .ok_or_else(|| QueueError::item_not_found(job_id, item_id))?;

        let mut state = job.lock().await;
        let outcome = state
            .nack(item_id, error, Utc::now())
            .ok_or_else(|| QueueError::item_not_found(job_id, item_id))?;

        match &outcome {
            NackOutcome::Requeued(item) => debug!(
                "Requeued item {} of job {} after attempt {}/{}: {}",
                item_id, job_id, item.attempt, item.max_attempts, error
            ),
            NackOutcome::Failed(item) => warn!(
                "Item {} of job {} failed permanently after {} attempt(s): {}",
                item_id, job_id, item.attempt, error
            ),
        }
        if state.pending.is_empty() && state.processing.is_empty() {
            info!("All work items of job {} reached a terminal state", job_id);
        }
        Ok(outcome.into_item())
    }

    async fn progress(&self, job_id: &str) -> QueueResult<JobProgress> {
        let job = self.existing_job(job_id).await?;
        let progress = job.lock().await.progress(job_id);
        Ok(progress)
    }

    async fn completed_items(&self, job_id: &str) -> QueueResult<Vec<WorkItem>> {
        let job = self.existing_job(job_id).await?;
        let items = job.lock().await.completed.values().cloned().collect();
        Ok(items)
    }

    async fn failed_items(&self, job_id: &str) -> QueueResult<Vec<WorkItem>> {
        let job = self.existing_job(job_id).await?;
        let items = job.lock().await.failed.values().cloned().collect();
        Ok(items)
    }

    async fn reclaim_expired(&self, visibility_timeout: Duration) -> QueueResult<usize> {
        let jobs = self.all_jobs().await?;
        let now = Utc::now();
        let Some(deadline) = chrono::Duration::from_std(visibility_timeout)
            .ok()
            .and_then(|timeout| now.checked_sub_signed(timeout))
        else {
            return Ok(0);
        };

        let mut reclaimed = 0;
        for (job_id, job) in jobs {
            let mut state = job.lock().await;
            for item_id in state.expired(deadline) {
                if state.nack(&item_id, VISIBILITY_TIMEOUT_ERROR, now).is_some() {
                    reclaimed += 1;
                    debug!("Reclaimed expired item {} of job {}", item_id, job_id);
                }
            }
        }

        if reclaimed > 0 {
            info!("Reclaimed {} work items past their visibility timeout", reclaimed);
        }
        Ok(reclaimed)
    }

    async fn close(&self) -> QueueResult<()> {
        let mut registry = self.registry.write().await;
        if registry.closed {
            return Err(QueueError::Closed);
        }
        registry.closed = true;
        let jobs = std::mem::take(&mut registry.jobs);
        info!("Closed work queue, released {} job(s)", jobs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{partition, Provider, Scenario};

    fn items(job_id: &str, count: usize, max_attempts: u32) -> Vec<WorkItem> {
        let scenarios: Vec<Scenario> = (0..count)
            .map(|i| Scenario::new(format!("s{}", i), format!("S{}", i), format!("s{}.yaml", i)))
            .collect();
        let providers = vec![Provider::new("evals", "model")];
        partition(job_id, "oci://bundle", &scenarios, &providers, max_attempts, None).unwrap()
    }

    async fn memberships(queue: &MemoryWorkQueue, job_id: &str, item_id: &str) -> usize {
        let job = queue.job(job_id).await.unwrap().unwrap();
        let state = job.lock().await;
        state.memberships(item_id)
    }

    async fn assert_partitioned(queue: &MemoryWorkQueue, job_id: &str, ids: &[String]) {
        for id in ids {
            assert_eq!(memberships(queue, job_id, id).await, 1);
        }
        let p = queue.progress(job_id).await.unwrap();
        assert_eq!(p.pending + p.processing + p.completed + p.failed, p.total);
        assert_eq!(p.total, ids.len());
    }

    #[tokio::test]
    async fn test_pop_is_fifo() {
        let queue = MemoryWorkQueue::new(3);
        let pushed = items("j1", 3, 3);
        queue.push("j1", pushed.clone()).await.unwrap();

        for expected in &pushed {
            let item = queue.pop("j1").await.unwrap();
            assert_eq!(item.id, expected.id);
            assert_eq!(item.status, WorkItemStatus::Processing);
            assert_eq!(item.attempt, 1);
            assert!(item.started_at.is_some());
        }

        assert!(queue.pop("j1").await.unwrap_err().is_empty());
    }

    #[tokio::test]
    async fn test_pop_unknown_job_is_empty() {
        let queue = MemoryWorkQueue::new(3);
        let err = queue.pop("missing").await.unwrap_err();
        assert_eq!(err, QueueError::empty("missing"));
    }

    #[tokio::test]
    async fn test_push_rejects_item_already_in_flight() {
        let queue = MemoryWorkQueue::new(3);
        let pushed = items("j1", 1, 3);
        queue.push("j1", pushed.clone()).await.unwrap();
        let popped = queue.pop("j1").await.unwrap();

        let err = queue.push("j1", pushed).await.unwrap_err();
        assert_eq!(err, QueueError::duplicate_item("j1", &popped.id));

        assert_partitioned(&queue, "j1", &[popped.id.clone()]).await;
        let p = queue.progress("j1").await.unwrap();
        assert_eq!(p.processing, 1);
        assert!(queue.pop("j1").await.unwrap_err().is_empty());

        queue.ack("j1", &popped.id, Vec::new()).await.unwrap();
        assert!(queue.ack("j1", &popped.id, Vec::new()).await.unwrap_err().is_not_found());
        assert_eq!(queue.progress("j1").await.unwrap().completed, 1);
    }

    #[tokio::test]
    async fn test_push_rejects_completed_item() {
        let queue = MemoryWorkQueue::new(3);
        let pushed = items("j1", 1, 3);
        queue.push("j1", pushed.clone()).await.unwrap();
        let item = queue.pop("j1").await.unwrap();
        queue.ack("j1", &item.id, Vec::new()).await.unwrap();

        let err = queue.push("j1", pushed).await.unwrap_err();
        assert!(matches!(err, QueueError::DuplicateItem { .. }));
        let p = queue.progress("j1").await.unwrap();
        assert_eq!((p.total, p.completed, p.pending), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_push_with_repeated_id_adds_nothing() {
        let queue = MemoryWorkQueue::new(3);
        let mut pushed = items("j1", 2, 3);
        queue.push("j1", vec![pushed[0].clone()]).await.unwrap();

        // First item is fresh, second repeats it within the batch
        let fresh = pushed.remove(1);
        let repeated = fresh.clone();
        let err = queue.push("j1", vec![fresh, repeated]).await.unwrap_err();
        assert!(matches!(err, QueueError::DuplicateItem { .. }));

        let p = queue.progress("j1").await.unwrap();
        assert_eq!((p.total, p.pending), (1, 1));
    }

    #[tokio::test]
    async fn test_push_backfills_max_attempts() {
        let queue = MemoryWorkQueue::new(4);
        let mut pushed = items("j1", 2, 2);
        pushed[0].max_attempts = 0;
        queue.push("j1", pushed).await.unwrap();

        assert_eq!(queue.pop("j1").await.unwrap().max_attempts, 4);
        assert_eq!(queue.pop("j1").await.unwrap().max_attempts, 2);
    }

    #[tokio::test]
    async fn test_push_rejects_empty_job_id() {
        let queue = MemoryWorkQueue::new(1);
        assert_eq!(
            queue.push("", items("j1", 1, 1)).await,
            Err(QueueError::InvalidJobId)
        );
    }

    #[tokio::test]
    async fn test_ack_moves_to_completed() {
        let queue = MemoryWorkQueue::new(3);
        queue.push("j1", items("j1", 1, 3)).await.unwrap();

        let item = queue.pop("j1").await.unwrap();
        let acked = queue.ack("j1", &item.id, b"ok".to_vec()).await.unwrap();
        assert_eq!(acked.status, WorkItemStatus::Completed);
        assert_eq!(acked.result.as_deref(), Some(&b"ok"[..]));
        assert!(acked.completed_at.is_some());

        let completed = queue.completed_items("j1").await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, item.id);
    }

    #[tokio::test]
    async fn test_ack_requires_processing_item() {
        let queue = MemoryWorkQueue::new(3);
        queue.push("j1", items("j1", 1, 3)).await.unwrap();

        let pending = queue.pop("j1").await.unwrap();
        queue.ack("j1", &pending.id, vec![]).await.unwrap();

        let err = queue.ack("j1", &pending.id, vec![]).await.unwrap_err();
        assert_eq!(err, QueueError::item_not_found("j1", pending.id.clone()));

        let err = queue.nack("j1", &pending.id, "boom").await.unwrap_err();
        assert!(err.is_not_found());

        let err = queue.ack("other", "nope", vec![]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_nack_requeues_at_tail() {
        let queue = MemoryWorkQueue::new(3);
        let pushed = items("j1", 3, 3);
        queue.push("j1", pushed.clone()).await.unwrap();

        let first = queue.pop("j1").await.unwrap();
        let requeued = queue.nack("j1", &first.id, "timeout talking to model").await.unwrap();
        assert_eq!(requeued.status, WorkItemStatus::Pending);
        assert!(requeued.started_at.is_none());
        assert_eq!(requeued.error.as_deref(), Some("timeout talking to model"));

        assert_eq!(queue.pop("j1").await.unwrap().id, pushed[1].id);
        assert_eq!(queue.pop("j1").await.unwrap().id, pushed[2].id);

        let retried = queue.pop("j1").await.unwrap();
        assert_eq!(retried.id, first.id);
        assert_eq!(retried.attempt, 2);
    }

    #[tokio::test]
    async fn test_retry_bound() {
        let queue = MemoryWorkQueue::new(3);
        queue.push("j1", items("j1", 1, 3)).await.unwrap();

        for attempt in 1..=3 {
            let item = queue.pop("j1").await.unwrap();
            assert_eq!(item.attempt, attempt);
            let nacked = queue.nack("j1", &item.id, "failed").await.unwrap();
            assert!(nacked.attempt <= nacked.max_attempts);

            if attempt < 3 {
                assert_eq!(nacked.status, WorkItemStatus::Pending);
            } else {
                assert_eq!(nacked.status, WorkItemStatus::Failed);
                assert!(nacked.completed_at.is_some());
            }
        }

        assert!(queue.pop("j1").await.unwrap_err().is_empty());
        let failed = queue.failed_items("j1").await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].attempt, 3);
        assert_eq!(failed[0].error.as_deref(), Some("failed"));
    }

    #[tokio::test]
    async fn test_progress_end_to_end() {
        let queue = MemoryWorkQueue::new(3);
        queue.push("j1", items("j1", 4, 1)).await.unwrap();

        let first = queue.pop("j1").await.unwrap();
        let second = queue.pop("j1").await.unwrap();
        queue.ack("j1", &first.id, b"{}".to_vec()).await.unwrap();
        queue.nack("j1", &second.id, "no attempts left").await.unwrap();

        let progress = queue.progress("j1").await.unwrap();
        assert_eq!(progress.pending, 2);
        assert_eq!(progress.processing, 0);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.total, 4);
        assert!(progress.started_at.is_some());
        assert!(progress.completed_at.is_none());
        assert!(!progress.is_complete());
    }

    #[tokio::test]
    async fn test_progress_completed_at_once_done() {
        let queue = MemoryWorkQueue::new(1);
        queue.push("j1", items("j1", 2, 1)).await.unwrap();

        let a = queue.pop("j1").await.unwrap();
        let b = queue.pop("j1").await.unwrap();
        let acked = queue.ack("j1", &a.id, vec![]).await.unwrap();
        let failed = queue.nack("j1", &b.id, "x").await.unwrap();

        let progress = queue.progress("j1").await.unwrap();
        assert!(progress.is_complete());
        let latest = acked.completed_at.max(failed.completed_at);
        assert_eq!(progress.completed_at, latest);
        assert!(progress.duration().is_some());
    }

    #[tokio::test]
    async fn test_progress_unknown_job() {
        let queue = MemoryWorkQueue::new(1);
        assert_eq!(
            queue.progress("nope").await,
            Err(QueueError::job_not_found("nope"))
        );
        assert!(queue.completed_items("nope").await.is_err());
        assert!(queue.failed_items("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_progress_empty_push_has_no_completion_time() {
        let queue = MemoryWorkQueue::new(1);
        queue.push("j1", Vec::new()).await.unwrap();

        let progress = queue.progress("j1").await.unwrap();
        assert_eq!(progress.total, 0);
        assert!(progress.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_each_item_in_exactly_one_set() {
        let queue = MemoryWorkQueue::new(2);
        let pushed = items("j1", 3, 2);
        let ids: Vec<String> = pushed.iter().map(|i| i.id.clone()).collect();
        queue.push("j1", pushed).await.unwrap();

        assert_partitioned(&queue, "j1", &ids).await;
        let a = queue.pop("j1").await.unwrap();
        assert_partitioned(&queue, "j1", &ids).await;
        queue.nack("j1", &a.id, "retry").await.unwrap();
        assert_partitioned(&queue, "j1", &ids).await;
        let b = queue.pop("j1").await.unwrap();
        queue.ack("j1", &b.id, vec![]).await.unwrap();
        assert_partitioned(&queue, "j1", &ids).await;
        while let Ok(item) = queue.pop("j1").await {
            queue.nack("j1", &item.id, "fail").await.unwrap();
            assert_partitioned(&queue, "j1", &ids).await;
        }

        let p = queue.progress("j1").await.unwrap();
        assert!(p.is_complete());
        assert_eq!(p.completed, 1);
        assert_eq!(p.failed, 2);
    }

    #[tokio::test]
    async fn test_returned_items_are_copies() {
        let queue = MemoryWorkQueue::new(1);
        queue.push("j1", items("j1", 1, 1)).await.unwrap();

        let mut item = queue.pop("j1").await.unwrap();
        let id = item.id.clone();
        item.id = "tampered".to_string();
        item.config.clear();

        let acked = queue.ack("j1", &id, vec![1]).await.unwrap();
        assert!(!acked.config.is_empty());

        let mut completed = queue.completed_items("j1").await.unwrap();
        completed[0].result = None;
        let again = queue.completed_items("j1").await.unwrap();
        assert_eq!(again[0].result, Some(vec![1]));
    }

    #[tokio::test]
    async fn test_jobs_are_isolated() {
        let queue = MemoryWorkQueue::new(1);
        queue.push("a", items("a", 2, 1)).await.unwrap();
        queue.push("b", items("b", 1, 1)).await.unwrap();

        let item = queue.pop("b").await.unwrap();
        assert_eq!(item.job_id, "b");
        assert!(queue.pop("b").await.unwrap_err().is_empty());
        assert!(queue.ack("a", &item.id, vec![]).await.unwrap_err().is_not_found());

        assert_eq!(queue.progress("a").await.unwrap().pending, 2);
    }

    #[tokio::test]
    async fn test_close_rejects_everything() {
        let queue = MemoryWorkQueue::new(1);
        queue.push("j1", items("j1", 1, 1)).await.unwrap();
        queue.close().await.unwrap();

        assert_eq!(queue.push("j1", vec![]).await, Err(QueueError::Closed));
        assert_eq!(queue.pop("j1").await, Err(QueueError::Closed));
        assert_eq!(queue.ack("j1", "x", vec![]).await, Err(QueueError::Closed));
        assert_eq!(queue.nack("j1", "x", "e").await, Err(QueueError::Closed));
        assert_eq!(queue.progress("j1").await, Err(QueueError::Closed));
        assert_eq!(queue.completed_items("j1").await, Err(QueueError::Closed));
        assert_eq!(queue.failed_items("j1").await, Err(QueueError::Closed));
        assert_eq!(
            queue.reclaim_expired(Duration::ZERO).await,
            Err(QueueError::Closed)
        );
        assert_eq!(queue.close().await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn test_reclaim_expired_requeues_and_fails() {
        let queue = MemoryWorkQueue::new(1);
        let mut pushed = items("j1", 2, 1);
        pushed[0].max_attempts = 2;
        queue.push("j1", pushed.clone()).await.unwrap();

        queue.pop("j1").await.unwrap();
        queue.pop("j1").await.unwrap();

        assert_eq!(
            queue.reclaim_expired(Duration::from_secs(3600)).await.unwrap(),
            0
        );
        assert_eq!(queue.reclaim_expired(Duration::ZERO).await.unwrap(), 2);

        let progress = queue.progress("j1").await.unwrap();
        assert_eq!(progress.pending, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.processing, 0);

        let failed = queue.failed_items("j1").await.unwrap();
        assert_eq!(failed[0].id, pushed[1].id);
        assert_eq!(failed[0].error.as_deref(), Some(VISIBILITY_TIMEOUT_ERROR));
    }

    #[tokio::test]
    async fn test_concurrent_workers_pop_each_item_once() {
        let queue = Arc::new(MemoryWorkQueue::new(1));
        queue.push("j1", items("j1", 50, 1)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Ok(item) = queue.pop("j1").await {
                    queue.ack("j1", &item.id, vec![]).await.unwrap();
                    seen.push(item.id);
                }
                seen
            }));
        }

        let mut all = Vec::new();
        for handle in futures::future::join_all(handles).await {
            all.extend(handle.unwrap());
        }
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 50);
        assert_eq!(unique.len(), 50);

        let progress = queue.progress("j1").await.unwrap();
        assert_eq!(progress.completed, 50);
        assert!(progress.is_complete());
    }
}
