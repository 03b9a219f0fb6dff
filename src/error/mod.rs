use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

use crate::plan::ProcessingStatus;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// Result alias used across the library
pub type LibResult<T> = Result<T, PacemakerError>;

/// The unified error type for the pacemaker engine
#[derive(Error, Debug)]
pub enum PacemakerError {
    /// Incomplete reference data or bad settings. Never retried.
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
    },

    #[error("[E{code:04}] Daily quota of {limit} pacemaker requests reached for runner {runner_id}", code = ErrorCode::QUOTA_EXCEEDED)]
    QuotaExceeded { runner_id: String, limit: u32 },

    #[error("[E{code:04}] Reasoning {stage} stage failed: {message}")]
    Reasoning {
        code: u16,
        stage: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Reasoning {stage} stage timed out after {after:?}", code = ErrorCode::REASONING_TIMEOUT)]
    Timeout { stage: String, after: Duration },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Not found: {message}", code = ErrorCode::JOB_NOT_FOUND)]
    NotFound { message: String },

    #[error("[E{code:04}] Cannot move pacemaker from {from} to {to}", code = ErrorCode::JOB_INVALID_TRANSITION)]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },
}

impl PacemakerError {
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

    /// Create a validation error with default code
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::VALIDATION_GENERIC,
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
        }
    }

    /// Create a reasoning error for a named stage
    pub fn reasoning(code: u16, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reasoning {
            code,
            stage: stage.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with specific code
    pub fn storage_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Reasoning { source: src, .. }
            | Self::Storage { source: src, .. } => {
                *src = Some(source.into());
            }
            _ => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Validation { message, .. }
            | Self::Reasoning { message, .. }
            | Self::Storage { message, .. }
            | Self::NotFound { message } => {
                *message = format!("{}: {}", message, context);
            }
            _ => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Validation { code, .. }
            | Self::Reasoning { code, .. }
            | Self::Storage { code, .. } => *code,
            Self::QuotaExceeded { .. } => ErrorCode::QUOTA_EXCEEDED,
            Self::Timeout { .. } => ErrorCode::REASONING_TIMEOUT,
            Self::NotFound { .. } => ErrorCode::JOB_NOT_FOUND,
            Self::InvalidTransition { .. } => ErrorCode::JOB_INVALID_TRANSITION,
        }
    }

    /// Errors caused by the caller rather than by the engine or its collaborators
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::QuotaExceeded { .. } | Self::NotFound { .. }
        )
    }

    /// Configuration errors point at incomplete reference data
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Validation { .. } => 3,
            Self::QuotaExceeded { .. } => 4,
            Self::Reasoning { .. } | Self::Timeout { .. } => 5,
            Self::Storage { .. } => 6,
            Self::NotFound { .. } | Self::InvalidTransition { .. } => 7,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Validation { message, field, .. } => {
                if let Some(f) = field {
                    format!("Validation error for '{}': {}", f, message)
                } else {
                    format!("Validation error: {}", message)
                }
            }
            Self::QuotaExceeded { limit, .. } => format!(
                "You have used all {} pacemaker requests for today. Try again tomorrow.",
                limit
            ),
            Self::Reasoning { stage, .. } | Self::Timeout { stage, .. } => {
                format!("Plan generation failed during the {} stage", stage)
            }
            Self::Storage { message, .. } => format!("Storage error: {}", message),
            Self::NotFound { message } => message.clone(),
            Self::InvalidTransition { from, to } => {
                format!("Pacemaker is {} and cannot become {}", from, to)
            }
        }
    }
}
