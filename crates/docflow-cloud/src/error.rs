//! Error types surfaced to the invocation harness

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified reconciliation failure.
///
/// Every variant carries a message that already names the document and the
/// attempted operation; callers display it as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Throttled: {0}")]
    Throttled(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Service limit exceeded: {0}")]
    ServiceLimitExceeded(String),

    #[error("Provider error: {0}")]
    Generic(String),

    #[error("Timeout: {0}")]
    TimedOut(String),

    #[error("Remote failure: {0}")]
    RemoteFailure(String),
}

impl HandlerError {
    /// Externally visible failure category
    pub fn code(&self) -> HandlerErrorCode {
        match self {
            HandlerError::InvalidInput(_) => HandlerErrorCode::InvalidRequest,
            HandlerError::NotFound(_) => HandlerErrorCode::NotFound,
            HandlerError::AlreadyExists(_) => HandlerErrorCode::AlreadyExists,
            HandlerError::AccessDenied(_) => HandlerErrorCode::AccessDenied,
            HandlerError::Throttled(_) => HandlerErrorCode::Throttling,
            HandlerError::ServiceUnavailable(_) => HandlerErrorCode::ServiceInternalError,
            HandlerError::ServiceLimitExceeded(_) => HandlerErrorCode::ServiceLimitExceeded,
            HandlerError::Generic(_) => HandlerErrorCode::GeneralServiceException,
            HandlerError::TimedOut(_) => HandlerErrorCode::NotStabilized,
            HandlerError::RemoteFailure(_) => HandlerErrorCode::RemoteFailure,
        }
    }

    /// The annotated message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            HandlerError::InvalidInput(m)
            | HandlerError::NotFound(m)
            | HandlerError::AlreadyExists(m)
            | HandlerError::AccessDenied(m)
            | HandlerError::Throttled(m)
            | HandlerError::ServiceUnavailable(m)
            | HandlerError::ServiceLimitExceeded(m)
            | HandlerError::Generic(m)
            | HandlerError::TimedOut(m)
            | HandlerError::RemoteFailure(m) => m,
        }
    }
}

/// Failure category reported on a failed progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum HandlerErrorCode {
    InvalidRequest,
    NotFound,
    AlreadyExists,
    AccessDenied,
    Throttling,
    ServiceInternalError,
    ServiceLimitExceeded,
    GeneralServiceException,
    NotStabilized,
    RemoteFailure,
}

impl std::fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerErrorCode::InvalidRequest => write!(f, "InvalidRequest"),
            HandlerErrorCode::NotFound => write!(f, "NotFound"),
            HandlerErrorCode::AlreadyExists => write!(f, "AlreadyExists"),
            HandlerErrorCode::AccessDenied => write!(f, "AccessDenied"),
            HandlerErrorCode::Throttling => write!(f, "Throttling"),
            HandlerErrorCode::ServiceInternalError => write!(f, "ServiceInternalError"),
            HandlerErrorCode::ServiceLimitExceeded => write!(f, "ServiceLimitExceeded"),
            HandlerErrorCode::GeneralServiceException => write!(f, "GeneralServiceException"),
            HandlerErrorCode::NotStabilized => write!(f, "NotStabilized"),
            HandlerErrorCode::RemoteFailure => write!(f, "RemoteFailure"),
        }
    }
}

/// Invocation state file errors
#[derive(Error, Debug)]
pub enum StateError {
    #[error("State file error: {0}")]
    Version(String),

    #[error("Lock acquisition failed: {0}")]
    Locked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
