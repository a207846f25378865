//! File-based storage backend implementation
//!
//! Each job's results live in `<base_dir>/<job_id>.json`. Writes go to a
//! temporary sibling first and are renamed into place.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::storage::{
    error::{StorageError, StorageResult},
    traits::ResultStorage,
    types::{JobResults, ResultInfo},
};

const RESULT_EXTENSION: &str = "json";

/// File-based storage backend
pub struct FileBackend {
    base_dir: PathBuf,
    closed: RwLock<bool>,
}

impl FileBackend {
    /// Create a new file backend, creating `base_dir` if needed
    pub async fn new(base_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_dir = base_dir.into();

        // Ensure base directory exists
        fs::create_dir_all(&base_dir).await?;
        debug!("File result storage at {}", base_dir.display());

        Ok(Self {
            base_dir,
            closed: RwLock::new(false),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the result file for a job
    fn get_path(&self, job_id: &str) -> StorageResult<PathBuf> {
        validate_job_id(job_id)?;
        Ok(self
            .base_dir
            .join(format!("{}.{}", job_id, RESULT_EXTENSION)))
    }

    /// Read JSON file
    async fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
        job_id: &str,
    ) -> StorageResult<T> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| not_found_or_io(e, job_id))?;
        serde_json::from_str(&content).map_err(StorageError::serialization)
    }

    /// Write JSON file through a temporary sibling
    async fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(data)?;
        let tmp_path = path.with_extension(format!("{}.tmp", RESULT_EXTENSION));
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn job_ids(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RESULT_EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                if id.starts_with(prefix) && validate_job_id(id).is_ok() {
                    ids.push(id.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// Job ids become file names, so anything that could escape `base_dir` is refused
fn validate_job_id(job_id: &str) -> StorageResult<()> {
    if job_id.is_empty()
        || job_id.starts_with('.')
        || job_id.contains("..")
        || job_id.contains('/')
        || job_id.contains('\\')
    {
        return Err(StorageError::invalid_job_id(job_id));
    }
    Ok(())
}

fn not_found_or_io(err: std::io::Error, job_id: &str) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::not_found(job_id)
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl ResultStorage for FileBackend {
    async fn store(&self, job_id: &str, results: &JobResults) -> StorageResult<()> {
        let closed = self.closed.write().await;
        if *closed {
            return Err(StorageError::Closed);
        }

        let path = self.get_path(job_id)?;
        self.write_json(&path, results).await?;
        debug!("Stored results for job {} at {}", job_id, path.display());
        Ok(())
    }

    async fn get(&self, job_id: &str) -> StorageResult<JobResults> {
        let closed = self.closed.read().await;
        if *closed {
            return Err(StorageError::Closed);
        }

        let path = self.get_path(job_id)?;
        self.read_json(&path, job_id).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let closed = self.closed.read().await;
        if *closed {
            return Err(StorageError::Closed);
        }

        self.job_ids(prefix).await
    }

    async fn list_with_info(&self, prefix: &str) -> StorageResult<Vec<ResultInfo>> {
        let closed = self.closed.read().await;
        if *closed {
            return Err(StorageError::Closed);
        }

        let mut infos = Vec::new();
        for job_id in self.job_ids(prefix).await? {
            let path = self.get_path(&job_id)?;
            match self.read_json::<JobResults>(&path, &job_id).await {
                Ok(results) => infos.push(ResultInfo::from_results(&job_id, &results)?),
                // Deleted between the directory scan and the read
                Err(StorageError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(infos)
    }

    async fn delete(&self, job_id: &str) -> StorageResult<()> {
        let closed = self.closed.write().await;
        if *closed {
            return Err(StorageError::Closed);
        }

        let path = self.get_path(job_id)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, job_id))?;
        debug!("Deleted results for job {}", job_id);
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        let mut closed = self.closed.write().await;
        if *closed {
            return Err(StorageError::Closed);
        }
        *closed = true;
        Ok(())
    }
}
