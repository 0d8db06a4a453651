//! Error types for the decision service.
//!
//! All errors are strongly typed using thiserror. The selection engine is
//! total and never produces one; errors come from catalog writes, sessions,
//! configuration and storage.

use thiserror::Error;

use crate::option::{OptionId, UserId};
use crate::storage::StorageError;

/// Validation errors raised at the catalog boundary, before data is stored.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Option name cannot be empty")]
    EmptyOptionName,

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },

    #[error("Invalid duration {minutes}: must be 0-{max} minutes")]
    DurationOutOfRange {
        minutes: i64,
        max: u32,
    },

    #[error("Weight {value} is out of range [{min}, {max}]")]
    WeightOutOfRange {
        value: i64,
        min: u8,
        max: u8,
    },

    #[error("Tag cannot be empty")]
    EmptyTag,

    #[error("Invalid email address: '{email}'")]
    InvalidEmail {
        email: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors that occur while executing a catalog or session operation.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Option not found: {id}")]
    OptionNotFound {
        id: OptionId,
    },

    #[error("User not found: {id}")]
    UserNotFound {
        id: UserId,
    },

    #[error("An account with email '{email}' already exists")]
    UserAlreadyExists {
        email: String,
    },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Top-level error type.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl From<StorageError> for DecisionError {
    fn from(err: StorageError) -> Self {
        Self::Execution(ExecutionError::Storage(err))
    }
}

impl DecisionError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if the caller was not signed in.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::Unauthorized))
    }

    /// Returns true if the addressed record does not exist (for this user).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Execution(
                ExecutionError::OptionNotFound { .. }
                    | ExecutionError::UserNotFound { .. }
                    | ExecutionError::Storage(
                        StorageError::OptionNotFound(_) | StorageError::UserNotFound(_)
                    )
            )
        )
    }
}

/// Result type alias for decision service operations.
pub type DecisionResult<T> = Result<T, DecisionError>;
