//! Invocation logging that never includes document content

use crate::model::ResourceModel;
use docflow_cloud::CallbackContext;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct SafeLogger;

impl SafeLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log what this invocation is about to work on
    ///
    /// Content may embed secrets, so only identifying attributes are logged.
    pub fn log_document_information(
        &self,
        model: &ResourceModel,
        context: Option<&CallbackContext>,
        account_id: Option<&str>,
        system_tags: &BTreeMap<String, String>,
    ) {
        tracing::info!(
            document = model.display_name(),
            document_type = model.document_type.as_deref().unwrap_or("-"),
            document_format = model.document_format.as_deref().unwrap_or("-"),
            target_type = model.target_type.as_deref().unwrap_or("-"),
            version_name = model.version_name.as_deref().unwrap_or("-"),
            account = account_id.unwrap_or("-"),
            create_started = context.map(|c| c.create_document_started).unwrap_or(false),
            retries_remaining = ?context.map(|c| c.stabilization_retries_remaining),
            system_tags = ?system_tags,
            "Handling document create request"
        );
    }
}
