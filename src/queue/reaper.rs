//! Visibility timeout sweep
//!
//! A worker that pops an item and then disappears would leave it in
//! `processing` forever. The reaper periodically nacks every item that has
//! been processing for longer than the visibility timeout, so it is retried
//! or failed with the usual attempt bookkeeping.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::traits::WorkQueue;
use crate::config::QueueConfig;

/// Background task reclaiming expired work items
pub struct VisibilityReaper {
    shutdown: Arc<Notify>,
    handle: Option<JoinHandle<usize>>,
}

impl VisibilityReaper {
    /// Start sweeping `queue` every `interval`
    pub fn spawn(
        queue: Arc<dyn WorkQueue>,
        visibility_timeout: Duration,
        interval: Duration,
    ) -> Self {
        let shutdown = Arc::new(Notify::new());
        let stop = Arc::clone(&shutdown);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut total = 0;
            loop {
                tokio::select! {
                    _ = stop.notified() => break,
                    _ = ticker.tick() => {}
                }

                match queue.reclaim_expired(visibility_timeout).await {
                    Ok(count) => total += count,
                    Err(e) if e.is_closed() => {
                        debug!("Work queue closed, stopping visibility reaper");
                        break;
                    }
                    Err(e) => error!("Visibility sweep failed: {}", e),
                }
            }
            total
        });

        info!(
            "Started visibility reaper (timeout {:?}, interval {:?})",
            visibility_timeout, interval
        );
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn from_config(queue: Arc<dyn WorkQueue>, config: &QueueConfig) -> Self {
        Self::spawn(queue, config.visibility_timeout, config.reap_interval)
    }

    /// Stop sweeping and return how many items were reclaimed in total
    pub async fn stop(mut self) -> usize {
        self.shutdown.notify_one();
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => 0,
        }
    }
}

impl Drop for VisibilityReaper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{partition, Provider, Scenario};
    use crate::queue::MemoryWorkQueue;

    #[tokio::test]
    async fn test_reaper_requeues_abandoned_items() {
        let queue = Arc::new(MemoryWorkQueue::new(2));
        let items = partition(
            "j1",
            "oci://bundle",
            &[Scenario::new("s", "S", "s.yaml")],
            &[Provider::new("evals", "m")],
            2,
            None,
        )
        .unwrap();
        queue.push("j1", items).await.unwrap();
        let abandoned = queue.pop("j1").await.unwrap();

        let reaper = VisibilityReaper::spawn(
            queue.clone(),
            Duration::from_millis(10),
            Duration::from_millis(5),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        let reclaimed = reaper.stop().await;
        assert_eq!(reclaimed, 1);

        let retried = queue.pop("j1").await.unwrap();
        assert_eq!(retried.id, abandoned.id);
        assert_eq!(retried.attempt, 2);
    }

    #[tokio::test]
    async fn test_reaper_exits_when_queue_closes() {
        let queue = Arc::new(MemoryWorkQueue::new(1));
        let reaper = VisibilityReaper::spawn(
            queue.clone(),
            Duration::from_secs(60),
            Duration::from_millis(5),
        );
        queue.close().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(reaper.stop().await, 0);
    }
}
