//! Document transport trait and provider error definitions

use crate::request::{
    CreateDocumentRequest, CreateDocumentResponse, DescribeDocumentRequest, DocumentDescription,
};
use async_trait::async_trait;
use thiserror::Error;

/// Transport abstraction over the document API
///
/// Implementations inject credentials and own transport-level retry. The
/// reconciliation core issues each call exactly once and treats the result
/// as opaque.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// Returns the transport name (e.g., "aws-ssm")
    fn name(&self) -> &str;

    /// Start asynchronous creation of a document
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> std::result::Result<CreateDocumentResponse, ProviderError>;

    /// Fetch the current description (including status) of a document
    async fn describe_document(
        &self,
        request: &DescribeDocumentRequest,
    ) -> std::result::Result<DocumentDescription, ProviderError>;
}

/// Error codes the document API is known to return
///
/// The set is closed: anything else lands in `Unrecognized` with its raw code
/// so classification can still fall back to the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    AccessDenied,
    Throttling,
    InternalServerError,
    ServiceUnavailable,
    DocumentAlreadyExists,
    InvalidDocument,
    InvalidResourceId,
    InvalidDocumentContent,
    InvalidDocumentSchemaVersion,
    InvalidDocumentVersion,
    InvalidDocumentOperation,
    DuplicateDocumentContent,
    DuplicateDocumentVersionName,
    MaxDocumentSizeExceeded,
    DocumentLimitExceeded,
    TooManyTagsError,
    Validation,
    Unrecognized(String),
}

impl ProviderErrorKind {
    /// Parse a provider error code
    pub fn from_code(code: &str) -> Self {
        match code {
            "AccessDeniedException" => Self::AccessDenied,
            "ThrottlingException" => Self::Throttling,
            "InternalServerError" => Self::InternalServerError,
            "ServiceUnavailable" | "ServiceUnavailableException" => Self::ServiceUnavailable,
            "DocumentAlreadyExists" => Self::DocumentAlreadyExists,
            "InvalidDocument" => Self::InvalidDocument,
            "InvalidResourceId" => Self::InvalidResourceId,
            "InvalidDocumentContent" => Self::InvalidDocumentContent,
            "InvalidDocumentSchemaVersion" => Self::InvalidDocumentSchemaVersion,
            "InvalidDocumentVersion" => Self::InvalidDocumentVersion,
            "InvalidDocumentOperation" => Self::InvalidDocumentOperation,
            "DuplicateDocumentContent" => Self::DuplicateDocumentContent,
            "DuplicateDocumentVersionName" => Self::DuplicateDocumentVersionName,
            "MaxDocumentSizeExceeded" => Self::MaxDocumentSizeExceeded,
            "DocumentLimitExceeded" => Self::DocumentLimitExceeded,
            "TooManyTagsError" => Self::TooManyTagsError,
            "ValidationException" => Self::Validation,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Wire error code
    pub fn code(&self) -> &str {
        match self {
            Self::AccessDenied => "AccessDeniedException",
            Self::Throttling => "ThrottlingException",
            Self::InternalServerError => "InternalServerError",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::DocumentAlreadyExists => "DocumentAlreadyExists",
            Self::InvalidDocument => "InvalidDocument",
            Self::InvalidResourceId => "InvalidResourceId",
            Self::InvalidDocumentContent => "InvalidDocumentContent",
            Self::InvalidDocumentSchemaVersion => "InvalidDocumentSchemaVersion",
            Self::InvalidDocumentVersion => "InvalidDocumentVersion",
            Self::InvalidDocumentOperation => "InvalidDocumentOperation",
            Self::DuplicateDocumentContent => "DuplicateDocumentContent",
            Self::DuplicateDocumentVersionName => "DuplicateDocumentVersionName",
            Self::MaxDocumentSizeExceeded => "MaxDocumentSizeExceeded",
            Self::DocumentLimitExceeded => "DocumentLimitExceeded",
            Self::TooManyTagsError => "TooManyTagsError",
            Self::Validation => "ValidationException",
            Self::Unrecognized(code) => code,
        }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw failure returned by a transport call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// Build from a raw error code as reported on the wire
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::from_code(code), message)
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}
