//! Error types for grant resolution and reconciliation.

use crate::passbolt::types::{AroKind, PassboltError};
use thiserror::Error;

/// Coarse classification of a [`ShareError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad local input; nothing was sent to the server.
    Validation,
    /// A folder or subject could not be resolved.
    NotFound,
    /// A collaborator call failed.
    Remote,
    /// The caller cancelled the operation.
    Cancelled,
    /// The caller's deadline elapsed.
    DeadlineExceeded,
}

/// Errors that can occur while resolving or reconciling a grant.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Permission code outside `-1, 1, 7, 15`.
    #[error("invalid share permission type, expected one of: -1, 1, 7, 15, got input: {code}")]
    InvalidLevel { code: String },

    /// Subject kind other than `User` or `Group`.
    #[error("invalid share target type, expected one of: User, Group, got input: {0}")]
    InvalidSubjectKind(String),

    /// Declared grants could not be loaded.
    #[error("invalid grant manifest: {0}")]
    InvalidManifest(String),

    /// No non-personal folder carries the name.
    #[error("failed to find any shareable folder of name: {name}")]
    FolderNotFound { name: String },

    /// No group or user carries the name.
    #[error("failed to find share target, type: {kind}, value: {name}")]
    SubjectNotFound { kind: AroKind, name: String },

    /// A remote call failed.
    #[error("failed to {operation}: {source}")]
    Remote {
        operation: String,
        #[source]
        source: PassboltError,
    },

    /// Cancelled through the operation context.
    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    /// The operation context's deadline elapsed.
    #[error("{operation} exceeded its deadline")]
    DeadlineExceeded { operation: String },
}

impl ShareError {
    pub fn remote(operation: impl Into<String>, source: PassboltError) -> Self {
        Self::Remote {
            operation: operation.into(),
            source,
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn deadline_exceeded(operation: impl Into<String>) -> Self {
        Self::DeadlineExceeded {
            operation: operation.into(),
        }
    }

    /// Classify the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidLevel { .. } | Self::InvalidSubjectKind(_) | Self::InvalidManifest(_) => {
                ErrorClass::Validation
            }
            Self::FolderNotFound { .. } | Self::SubjectNotFound { .. } => ErrorClass::NotFound,
            Self::Remote { .. } => ErrorClass::Remote,
            Self::Cancelled { .. } => ErrorClass::Cancelled,
            Self::DeadlineExceeded { .. } => ErrorClass::DeadlineExceeded,
        }
    }
}

/// Result type for grant operations.
pub type Result<T> = std::result::Result<T, ShareError>;
