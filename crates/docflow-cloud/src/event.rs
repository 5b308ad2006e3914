//! Resumption token and progress events

use crate::error::{HandlerError, HandlerErrorCode};
use serde::{Deserialize, Serialize};

/// State carried between otherwise independent invocations
///
/// The caller persists this value and hands it back verbatim on the next
/// invocation. An absent context means the workflow has not started yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackContext {
    /// Whether the initial create call has already been issued
    #[serde(default)]
    pub create_document_started: bool,

    /// Status polls left before the workflow times out
    #[serde(default)]
    pub stabilization_retries_remaining: u32,
}

impl CallbackContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context written right after a successful create call
    pub fn started(poll_budget: u32) -> Self {
        Self {
            create_document_started: true,
            stabilization_retries_remaining: poll_budget,
        }
    }
}

/// Outcome of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::InProgress => write!(f, "IN_PROGRESS"),
            OperationStatus::Success => write!(f, "SUCCESS"),
            OperationStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Unit returned to the invocation harness on every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent<M> {
    pub resource_model: M,
    pub status: OperationStatus,
    pub message: Option<String>,
    /// Present only while the workflow is in progress
    pub callback_context: Option<CallbackContext>,
    /// Suggested re-invocation delay; zero once terminal
    pub callback_delay_seconds: u32,
    pub error_code: Option<HandlerErrorCode>,
}

impl<M> ProgressEvent<M> {
    pub fn in_progress(
        resource_model: M,
        context: CallbackContext,
        delay_seconds: u32,
        message: Option<String>,
    ) -> Self {
        Self {
            resource_model,
            status: OperationStatus::InProgress,
            message,
            callback_context: Some(context),
            callback_delay_seconds: delay_seconds,
            error_code: None,
        }
    }

    pub fn success(resource_model: M, message: Option<String>) -> Self {
        Self {
            resource_model,
            status: OperationStatus::Success,
            message,
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: None,
        }
    }

    pub fn failed(resource_model: M, error: &HandlerError) -> Self {
        Self {
            resource_model,
            status: OperationStatus::Failed,
            message: Some(error.message().to_string()),
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: Some(error.code()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
