//! In-memory result storage

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::storage::{
    error::{StorageError, StorageResult},
    traits::ResultStorage,
    types::{JobResults, ResultInfo},
};

/// In-memory result storage; `None` once closed
pub struct MemoryBackend {
    results: RwLock<Option<HashMap<String, JobResults>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(Some(HashMap::new())),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_job_id(job_id: &str) -> StorageResult<()> {
    if job_id.is_empty() {
        return Err(StorageError::invalid_job_id(job_id));
    }
    Ok(())
}

#[async_trait]
impl ResultStorage for MemoryBackend {
    async fn store(&self, job_id: &str, results: &JobResults) -> StorageResult<()> {
        validate_job_id(job_id)?;
        let mut guard = self.results.write().await;
        let map = guard.as_mut().ok_or(StorageError::Closed)?;

        map.insert(job_id.to_string(), results.clone());
        debug!("Stored results for job {}", job_id);
        Ok(())
    }

    async fn get(&self, job_id: &str) -> StorageResult<JobResults> {
        validate_job_id(job_id)?;
        let guard = self.results.read().await;
        let map = guard.as_ref().ok_or(StorageError::Closed)?;

        map.get(job_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(job_id))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let guard = self.results.read().await;
        let map = guard.as_ref().ok_or(StorageError::Closed)?;

        let mut ids: Vec<String> = map
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_with_info(&self, prefix: &str) -> StorageResult<Vec<ResultInfo>> {
        let guard = self.results.read().await;
        let map = guard.as_ref().ok_or(StorageError::Closed)?;

        let mut infos = map
            .iter()
            .filter(|(id, _)| id.starts_with(prefix))
            .map(|(id, results)| ResultInfo::from_results(id, results))
            .collect::<StorageResult<Vec<_>>>()?;
        infos.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(infos)
    }

    async fn delete(&self, job_id: &str) -> StorageResult<()> {
        validate_job_id(job_id)?;
        let mut guard = self.results.write().await;
        let map = guard.as_mut().ok_or(StorageError::Closed)?;

        map.remove(job_id)
            .map(|_| debug!("Deleted results for job {}", job_id))
            .ok_or_else(|| StorageError::not_found(job_id))
    }

    async fn close(&self) -> StorageResult<()> {
        let mut guard = self.results.write().await;
        guard.take().map(|_| ()).ok_or(StorageError::Closed)
    }
}
