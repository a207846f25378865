//! Core trait definition for result storage

use async_trait::async_trait;

use super::error::StorageResult;
use super::types::{JobResults, ResultInfo};

/// Job id → consolidated result set
///
/// Implementations keep their own copy of everything stored and hand out
/// copies on every read, so neither side can mutate the other's data.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Store or overwrite the results of a job
    async fn store(&self, job_id: &str, results: &JobResults) -> StorageResult<()>;

    /// Load the results of a job
    async fn get(&self, job_id: &str) -> StorageResult<JobResults>;

    /// Job ids starting with `prefix`, sorted
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Like `list`, with size and summary information
    async fn list_with_info(&self, prefix: &str) -> StorageResult<Vec<ResultInfo>>;

    /// Remove the results of a job
    async fn delete(&self, job_id: &str) -> StorageResult<()>;

    /// Close the store; every later call fails with `StorageError::Closed`
    async fn close(&self) -> StorageResult<()>;
}
