//! Error types for transport calls and lifecycle reconciliation

use crate::outcome::Goal;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by the injected transport (submit and probe calls)
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl CloudError {
    /// Whether this error means the resource does not exist.
    ///
    /// Transports report absence either as a typed error (`ResourceNotFound`,
    /// `Http { status: 404 }`) or as an untyped `ApiError` whose message
    /// carries the status code. The latter is matched by substring and is a
    /// weak heuristic: an unrelated payload mentioning "404" is misread as
    /// not-found.
    pub fn is_not_found(&self) -> bool {
        match self {
            CloudError::ResourceNotFound(_) => true,
            CloudError::Http { status, .. } => *status == 404,
            CloudError::ApiError(message) => message.contains("404"),
            _ => false,
        }
    }
}

/// Errors surfaced by the create and delete orchestrators
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{resource}: submission failed: {source}")]
    SubmissionFailed {
        resource: String,
        #[source]
        source: CloudError,
    },

    #[error("{resource}: timed out after {timeout:?} waiting to become {goal}")]
    PollTimeout {
        resource: String,
        goal: Goal,
        timeout: Duration,
    },

    #[error("{resource}: {reason}")]
    InterpretedFatal { resource: String, reason: String },

    #[error("{resource}: status probe failed: {source}")]
    ProbeFailed {
        resource: String,
        #[source]
        source: CloudError,
    },

    #[error("{resource}: operation cancelled")]
    Cancelled { resource: String },

    #[error("{resource}: delete submission failed after {attempts} attempts: {source}")]
    DeleteRetryExhausted {
        resource: String,
        attempts: u32,
        #[source]
        source: CloudError,
    },

    #[error("{cause} (partially created resource was rolled back)")]
    RolledBack { cause: Box<ReconcileError> },

    #[error("{cause}; rollback also failed, manual cleanup required: {compensation}")]
    CompensationFailed {
        cause: Box<ReconcileError>,
        compensation: Box<ReconcileError>,
    },

    #[error("Invalid {field}: {message}")]
    InvalidSpec { field: &'static str, message: String },
}

impl ReconcileError {
    /// The error that started the failure, looking through rollback wrappers.
    pub fn root_cause(&self) -> &ReconcileError {
        match self {
            ReconcileError::RolledBack { cause }
            | ReconcileError::CompensationFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// True when a failed create could not clean up after itself and the
    /// remote resource may still exist.
    pub fn needs_manual_cleanup(&self) -> bool {
        matches!(self, ReconcileError::CompensationFailed { .. })
    }

    /// True when the failed create was rolled back successfully.
    pub fn was_rolled_back(&self) -> bool {
        matches!(self, ReconcileError::RolledBack { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
