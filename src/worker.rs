//! Polling worker that drains a job from the work queue
//!
//! A worker pops, executes, then acks or nacks exactly once before popping
//! again. Empty pops back off exponentially. The loop ends once every item
//! of the job is terminal or the queue is closed.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::partition::WorkItem;
use crate::queue::{QueueError, WorkQueue};
use crate::LibResult;

/// Runs one work item and produces its result payload
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    async fn execute(&self, item: &WorkItem) -> anyhow::Result<Vec<u8>>;
}

/// Counters from one worker run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Items popped and executed
    pub processed: usize,
    pub acked: usize,
    pub nacked: usize,
    /// Acks or nacks rejected because the item was no longer processing
    pub lost: usize,
    pub empty_polls: usize,
}

impl WorkerStats {
    pub fn merge(mut self, other: Self) -> Self {
        self.processed += other.processed;
        self.acked += other.acked;
        self.nacked += other.nacked;
        self.lost += other.lost;
        self.empty_polls += other.empty_polls;
        self
    }
}

/// Whether the run loop should keep going
enum Flow {
    Continue,
    Stop,
}

pub struct Worker {
    id: String,
    queue: Arc<dyn WorkQueue>,
    executor: Arc<dyn WorkExecutor>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        id: impl Into<String>,
        queue: Arc<dyn WorkQueue>,
        executor: Arc<dyn WorkExecutor>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            id: id.into(),
            queue,
            executor,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Process items of `job_id` until the job is finished or the queue closes
    pub async fn run(&self, job_id: &str) -> LibResult<WorkerStats> {
        let mut stats = WorkerStats::default();
        let mut consecutive_empty = 0u32;

        debug!("Worker {} started on job {}", self.id, job_id);
        loop {
            match self.queue.pop(job_id).await {
                Ok(item) => {
                    consecutive_empty = 0;
                    if let Flow::Stop = self.process(job_id, item, &mut stats).await? {
                        break;
                    }
                }
                Err(e) if e.is_empty() => {
                    if let Flow::Stop = self.check_finished(job_id).await? {
                        break;
                    }
                    consecutive_empty = consecutive_empty.saturating_add(1);
                    stats.empty_polls += 1;
                    tokio::time::sleep(self.config.backoff(consecutive_empty)).await;
                }
                Err(QueueError::Closed) => {
                    debug!("Work queue closed, worker {} stopping", self.id);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Worker {} finished job {}: {} processed, {} acked, {} nacked",
            self.id, job_id, stats.processed, stats.acked, stats.nacked
        );
        Ok(stats)
    }

    async fn process(
        &self,
        job_id: &str,
        item: WorkItem,
        stats: &mut WorkerStats,
    ) -> LibResult<Flow> {
        stats.processed += 1;
        debug!(
            "Worker {} executing {} ({} on {})",
            self.id, item.id, item.scenario_id, item.provider_id
        );

        let outcome = match self.executor.execute(&item).await {
            Ok(result) => self
                .queue
                .ack(job_id, &item.id, result)
                .await
                .map(|_| stats.acked += 1),
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Work item {} failed: {}", item.id, message);
                self.queue
                    .nack(job_id, &item.id, &message)
                    .await
                    .map(|_| stats.nacked += 1)
            }
        };

        match outcome {
            Ok(()) => Ok(Flow::Continue),
            // Reclaimed by the visibility sweep while we were executing
            Err(e) if e.is_not_found() => {
                warn!("Work item {} was no longer processing: {}", item.id, e);
                stats.lost += 1;
                Ok(Flow::Continue)
            }
            Err(QueueError::Closed) => Ok(Flow::Stop),
            Err(e) => Err(e.into()),
        }
    }

    async fn check_finished(&self, job_id: &str) -> LibResult<Flow> {
        match self.queue.progress(job_id).await {
            Ok(progress) if progress.is_complete() => Ok(Flow::Stop),
            Ok(_) => Ok(Flow::Continue),
            // Nothing pushed yet
            Err(QueueError::JobNotFound { .. }) => Ok(Flow::Continue),
            Err(QueueError::Closed) => Ok(Flow::Stop),
            Err(e) => Err(e.into()),
        }
    }
}

/// Run `count` workers concurrently on one job and sum their stats
pub async fn run_workers(
    count: usize,
    job_id: &str,
    queue: Arc<dyn WorkQueue>,
    executor: Arc<dyn WorkExecutor>,
    config: &WorkerConfig,
) -> LibResult<WorkerStats> {
    let workers: Vec<Worker> = (0..count.max(1))
        .map(|i| {
            Worker::new(
                format!("worker-{}", i),
                Arc::clone(&queue),
                Arc::clone(&executor),
                config.clone(),
            )
        })
        .collect();

    let mut total = WorkerStats::default();
    for stats in join_all(workers.iter().map(|w| w.run(job_id))).await {
        total = total.merge(stats?);
    }
    Ok(total)
}
