use std::fmt::Display;
use thiserror::Error;

pub mod codes;


pub use codes::{describe_error_code, ErrorCode};

/// The unified error type surfaced by evalfleet's library entry points
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Partition error: {message}")]
    Partition {
        code: u16,
        message: String,
        job_id: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Queue error: {message}")]
    Queue {
        code: u16,
        message: String,
        job_id: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        job_id: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FleetError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a partition error with specific code and job ID
    pub fn partition_with_code(
        code: u16,
        message: impl Into<String>,
        job_id: Option<String>,
    ) -> Self {
        Self::Partition {
            code,
            message: message.into(),
            job_id,
            source: None,
        }
    }

    /// Create a queue error with specific code and job ID
    pub fn queue_with_code(code: u16, message: impl Into<String>, job_id: Option<String>) -> Self {
        Self::Queue {
            code,
            message: message.into(),
            job_id,
            source: None,
        }
    }

    /// Create a storage error with specific code and job ID
    pub fn storage_with_code(
        code: u16,
        message: impl Into<String>,
        job_id: Option<String>,
    ) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            job_id,
            source: None,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Partition { source: src, .. }
            | Self::Queue { source: src, .. }
            | Self::Storage { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Prefix the message with additional context
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Partition { message, .. }
            | Self::Queue { message, .. }
            | Self::Storage { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", context, message);
            }
        }
        self
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Partition { code, .. }
            | Self::Queue { code, .. }
            | Self::Storage { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// The job this error concerns, when known
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Partition { job_id, .. }
            | Self::Queue { job_id, .. }
            | Self::Storage { job_id, .. } => job_id.as_deref(),
            Self::Config { .. } | Self::Other { .. } => None,
        }
    }

    /// Whether the caller may simply try again later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Queue { code, .. } if *code == ErrorCode::QUEUE_EMPTY)
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Partition { .. } => 3,
            Self::Queue { .. } => 4,
            Self::Storage { .. } => 5,
            Self::Other { .. } => 1,
        }
    }

    /// Message with the code description, for terminal output
    pub fn user_message(&self) -> String {
        format!("{} ({})", self, describe_error_code(self.code()))
    }
}

impl From<std::io::Error> for FleetError {
    fn from(err: std::io::Error) -> Self {
        let code = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::CONFIG_NOT_FOUND
        } else {
            ErrorCode::CONFIG_GENERIC
        };
        Self::config_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<serde_yaml::Error> for FleetError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_INVALID_YAML, err.to_string()).with_source(err)
    }
}
