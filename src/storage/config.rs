//! Storage configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// In-process storage
    #[default]
    Memory,
    /// One JSON file per job under `base_dir`
    File,
}

/// Result storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendType,

    /// Directory for the file backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendType::File,
            base_dir: Some(base_dir.into()),
        }
    }
}
