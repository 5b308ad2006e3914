//! Provider error classification

use docflow_cloud::{HandlerError, ProviderError, ProviderErrorKind};

/// Maps raw provider errors onto the handler error taxonomy
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionTranslator;

impl ExceptionTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Classify `error` raised by `operation` on document `document_name`
    pub fn classify(
        &self,
        error: &ProviderError,
        document_name: &str,
        operation: &str,
    ) -> HandlerError {
        let message = format!(
            "Operation {} failed for document {}: {}",
            operation, document_name, error.message
        );

        tracing::debug!(
            document = document_name,
            operation,
            code = error.kind.code(),
            status = ?error.status_code,
            "Classifying provider error"
        );

        match &error.kind {
            ProviderErrorKind::InvalidDocument | ProviderErrorKind::InvalidResourceId => {
                HandlerError::NotFound(message)
            }
            ProviderErrorKind::DocumentAlreadyExists => HandlerError::AlreadyExists(message),
            ProviderErrorKind::InvalidDocumentContent
            | ProviderErrorKind::InvalidDocumentSchemaVersion
            | ProviderErrorKind::InvalidDocumentVersion
            | ProviderErrorKind::InvalidDocumentOperation
            | ProviderErrorKind::DuplicateDocumentContent
            | ProviderErrorKind::DuplicateDocumentVersionName
            | ProviderErrorKind::MaxDocumentSizeExceeded
            | ProviderErrorKind::TooManyTagsError
            | ProviderErrorKind::Validation => HandlerError::InvalidInput(message),
            ProviderErrorKind::AccessDenied => HandlerError::AccessDenied(message),
            ProviderErrorKind::Throttling => HandlerError::Throttled(message),
            ProviderErrorKind::InternalServerError | ProviderErrorKind::ServiceUnavailable => {
                HandlerError::ServiceUnavailable(message)
            }
            ProviderErrorKind::DocumentLimitExceeded => HandlerError::ServiceLimitExceeded(message),
            ProviderErrorKind::Unrecognized(_) => match error.status_code {
                Some(403) => HandlerError::AccessDenied(message),
                Some(404) => HandlerError::NotFound(message),
                Some(429) => HandlerError::Throttled(message),
                Some(status) if status >= 500 => HandlerError::ServiceUnavailable(message),
                _ => HandlerError::Generic(message),
            },
        }
    }
}
