//! Job partitioning
//!
//! Turns a declarative evaluation request into a flat list of independent
//! work items, one per scenario×provider pair.

pub mod error;
pub mod filter;
pub mod planner;
pub mod scenario;
pub mod types;

pub use error::{PartitionError, PartitionResult};
pub use filter::filter;
pub use planner::{batch, estimate_work_items, partition};
pub use scenario::{enumerate_scenarios, load_job_config, slug_from_filename, JobConfig};
pub use types::{PartitionRequest, Provider, Scenario, WorkItem, WorkItemStatus};
