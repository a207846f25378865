//! Error types for job partitioning

use thiserror::Error;

use crate::error::{ErrorCode, FleetError};

/// Result type for partition operations
pub type PartitionResult<T> = Result<T, PartitionError>;

#[derive(Error, Debug)]
pub enum PartitionError {
    /// No scenarios or no providers were supplied
    #[error("empty input: job '{job_id}' has {scenarios} scenario(s) and {providers} provider(s)")]
    EmptyInput {
        job_id: String,
        scenarios: usize,
        providers: usize,
    },

    #[error("invalid job id: job id must not be empty")]
    InvalidJobId,

    /// Two scenarios derived the same id
    #[error("duplicate scenario id '{scenario_id}' in job '{job_id}'")]
    DuplicateScenario { job_id: String, scenario_id: String },

    /// Building the config payload for one pair failed
    #[error(
        "failed to build config for scenario '{scenario_id}' x provider '{provider_id}': {source}"
    )]
    Config {
        scenario_id: String,
        provider_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PartitionError {
    pub fn empty_input(job_id: impl Into<String>, scenarios: usize, providers: usize) -> Self {
        Self::EmptyInput {
            job_id: job_id.into(),
            scenarios,
            providers,
        }
    }
}

impl From<PartitionError> for FleetError {
    fn from(err: PartitionError) -> Self {
        let (code, job_id) = match &err {
            PartitionError::EmptyInput { job_id, .. } => {
                (ErrorCode::PARTITION_EMPTY_INPUT, Some(job_id.clone()))
            }
            PartitionError::InvalidJobId => (ErrorCode::PARTITION_INVALID_JOB_ID, None),
            PartitionError::DuplicateScenario { job_id, .. } => {
                (ErrorCode::PARTITION_DUPLICATE_SCENARIO, Some(job_id.clone()))
            }
            PartitionError::Config { .. } => (ErrorCode::PARTITION_SERIALIZATION, None),
        };

        FleetError::partition_with_code(code, err.to_string(), job_id).with_source(err)
    }
}
