//! # evalfleet
//!
//! Distributes AI-agent evaluation runs across a worker fleet.
//!
//! A job pairs a set of conversational test scenarios with a set of backend
//! providers. The job is expanded into one retryable work item per
//! scenario×provider pair, the items are handed out through a per-job work
//! queue, and the terminal items are consolidated into a stored result set.
//!
//! ## Modules
//!
//! - `partition` - Scenario enumeration, filtering and expansion into work items
//! - `queue` - Per-job multi-consumer work queue with bounded retry
//! - `worker` - Polling worker loop over a pluggable executor
//! - `aggregate` - Consolidation of terminal work items into job results
//! - `storage` - Job results storage with memory and file backends
//! - `config` - Queue, worker and storage configuration
//! - `error` - Crate-wide error type with numeric codes
//! - `cli` - Command-line interface
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod partition;
pub mod queue;
pub mod storage;
pub mod worker;

/// Result type for library entry points
pub type LibResult<T> = Result<T, error::FleetError>;
