//! Single status check per invocation

use crate::error::ProgressError;
use crate::model::ResourceModel;
use crate::status::operation_status;
use crate::translator::DocumentModelTranslator;
use docflow_cloud::{
    CallbackContext, DocumentStatus, DocumentTransport, OperationStatus, UnrecognizedStatus,
};
use std::sync::Arc;

/// Result of one status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressResponse {
    pub status: DocumentStatus,
    pub status_information: Option<String>,
    /// Context to hand back to the caller
    pub callback_context: CallbackContext,
}

/// Issues exactly one describe call and updates the retry budget
pub struct StabilizationProgressRetriever {
    translator: DocumentModelTranslator,
    transport: Arc<dyn DocumentTransport>,
}

impl StabilizationProgressRetriever {
    pub fn new(translator: DocumentModelTranslator, transport: Arc<dyn DocumentTransport>) -> Self {
        Self {
            translator,
            transport,
        }
    }

    /// Describe the document and consume one unit of the retry budget while
    /// it is still being created.
    ///
    /// A document that is still `Creating` with no retries left yields
    /// `BudgetExhausted` instead of another in-progress response. Terminal
    /// statuses are returned even when the budget is spent.
    pub async fn get_progress(
        &self,
        model: &ResourceModel,
        context: CallbackContext,
    ) -> Result<ProgressResponse, ProgressError> {
        let request = self.translator.generate_describe_document_request(model)?;
        let description = self.transport.describe_document(&request).await?;

        let status: DocumentStatus = description
            .status
            .as_deref()
            .ok_or_else(|| UnrecognizedStatus("<missing>".to_string()))?
            .parse()?;

        let mut callback_context = context;
        if operation_status(status) == OperationStatus::InProgress {
            if callback_context.stabilization_retries_remaining == 0 {
                return Err(ProgressError::BudgetExhausted {
                    last_status: status,
                });
            }
            callback_context.stabilization_retries_remaining -= 1;
        }

        tracing::debug!(
            document = %request.name,
            %status,
            retries_remaining = callback_context.stabilization_retries_remaining,
            "Document status checked"
        );

        Ok(ProgressResponse {
            status,
            status_information: description.status_information,
            callback_context,
        })
    }
}
