//! Error types for the work queue

use thiserror::Error;

use crate::error::{ErrorCode, FleetError};

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was closed; obtain a new instance
    #[error("queue closed")]
    Closed,

    /// Nothing is pending for the job right now; poll again later
    #[error("queue empty: no pending items for job '{job_id}'")]
    Empty { job_id: String },

    /// The item is not currently being processed
    #[error("item not found: '{item_id}' is not processing in job '{job_id}'")]
    ItemNotFound { job_id: String, item_id: String },

    /// The job has never been pushed to
    #[error("job not found: '{job_id}'")]
    JobNotFound { job_id: String },

    #[error("invalid job id: job id must not be empty")]
    InvalidJobId,

    /// An item with this id is already tracked by the job
    #[error("duplicate item: '{item_id}' already exists in job '{job_id}'")]
    DuplicateItem { job_id: String, item_id: String },
}

impl QueueError {
    pub fn empty(job_id: impl Into<String>) -> Self {
        Self::Empty {
            job_id: job_id.into(),
        }
    }

    pub fn item_not_found(job_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self::ItemNotFound {
            job_id: job_id.into(),
            item_id: item_id.into(),
        }
    }

    pub fn duplicate_item(job_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self::DuplicateItem {
            job_id: job_id.into(),
            item_id: item_id.into(),
        }
    }

    pub fn job_not_found(job_id: impl Into<String>) -> Self {
        Self::JobNotFound {
            job_id: job_id.into(),
        }
    }

    /// Check if this is the expected "nothing to do yet" condition
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Only an empty queue is worth polling again
    pub fn is_retryable(&self) -> bool {
        self.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound { .. } | Self::JobNotFound { .. })
    }
}

impl From<QueueError> for FleetError {
    fn from(err: QueueError) -> Self {
        let (code, job_id) = match &err {
            QueueError::Closed => (ErrorCode::QUEUE_CLOSED, None),
            QueueError::Empty { job_id } => (ErrorCode::QUEUE_EMPTY, Some(job_id.clone())),
            QueueError::ItemNotFound { job_id, .. } => {
                (ErrorCode::QUEUE_ITEM_NOT_FOUND, Some(job_id.clone()))
            }
            QueueError::JobNotFound { job_id } => {
                (ErrorCode::QUEUE_JOB_NOT_FOUND, Some(job_id.clone()))
            }
            QueueError::InvalidJobId => (ErrorCode::QUEUE_INVALID_JOB_ID, None),
            QueueError::DuplicateItem { job_id, .. } => {
                (ErrorCode::QUEUE_DUPLICATE_ITEM, Some(job_id.clone()))
            }
        };

        FleetError::queue_with_code(code, err.to_string(), job_id).with_source(err)
    }
}
