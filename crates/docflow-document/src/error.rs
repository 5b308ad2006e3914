//! Document workflow error types

use docflow_cloud::{DocumentStatus, ProviderError, UnrecognizedStatus};
use thiserror::Error;

/// Request building failures, raised before any provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document Content is not valid: {0}")]
    InvalidContent(String),

    #[error("Document name is required to build a {0} request")]
    MissingName(&'static str),
}

/// Why a status check did not yield a usable status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    UnrecognizedStatus(#[from] UnrecognizedStatus),

    #[error("Stabilization retries exhausted (last status: {last_status})")]
    BudgetExhausted { last_status: DocumentStatus },
}

pub type Result<T> = std::result::Result<T, DocumentError>;
