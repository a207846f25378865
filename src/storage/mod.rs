//! Result storage for completed evaluation jobs
//!
//! Consolidated results are keyed by job id. Backends are interchangeable
//! behind [`ResultStorage`] and selected with [`StorageFactory`].

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod traits;
pub mod types;


pub use backends::{FileBackend, MemoryBackend};
pub use config::{BackendType, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use factory::StorageFactory;
pub use traits::ResultStorage;
pub use types::{ExecutionResult, ExecutionStatus, JobResults, ResultInfo, ResultSummary};
