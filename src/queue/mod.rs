//! Work queue
//!
//! Per-job, multi-consumer distribution of work items with bounded retry.
//! `MemoryWorkQueue` is the in-process implementation; any durable backend
//! must reproduce the same `WorkQueue` contract.

pub mod error;
pub mod memory;
pub mod reaper;
pub mod traits;
pub mod types;

pub use error::{QueueError, QueueResult};
pub use memory::MemoryWorkQueue;
pub use reaper::VisibilityReaper;
pub use traits::WorkQueue;
pub use types::JobProgress;
