//! Storage factory for creating storage instances

use std::sync::Arc;

use super::backends::{FileBackend, MemoryBackend};
use super::config::{BackendType, StorageConfig};
use super::error::{StorageError, StorageResult};
use super::traits::ResultStorage;

/// Factory for creating storage instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create storage from explicit configuration
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ResultStorage>> {
        match config.backend {
            BackendType::File => {
                let base_dir = config.base_dir.as_ref().ok_or_else(|| {
                    StorageError::configuration("file backend requires base_dir")
                })?;
                let backend = FileBackend::new(base_dir).await?;
                Ok(Arc::new(backend))
            }
            BackendType::Memory => Ok(Arc::new(MemoryBackend::new())),
        }
    }
}
