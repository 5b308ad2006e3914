//! Create handler: the stabilization state machine

use crate::classifier::ExceptionTranslator;
use crate::error::ProgressError;
use crate::model::{HandlerRequest, ResourceModel};
use crate::naming::NameSynthesizer;
use crate::progress::StabilizationProgressRetriever;
use crate::safe_log::SafeLogger;
use crate::status::operation_status;
use crate::tags::TagPolicy;
use crate::translator::DocumentModelTranslator;
use docflow_cloud::{
    CallbackContext, CreateDocumentRequest, CreateDocumentResponse, DocumentTransport,
    HandlerError, OperationStatus, ProgressEvent, Result,
};
use docflow_config::StabilizationConfig;
use std::sync::Arc;

const OPERATION_NAME: &str = "CreateDocument";

/// Creates a document and waits for it to become active across invocations
///
/// The handler keeps no per-workflow state. Everything needed to resume is
/// in the [`CallbackContext`] the caller passes back.
pub struct CreateHandler {
    translator: DocumentModelTranslator,
    retriever: StabilizationProgressRetriever,
    exception_translator: ExceptionTranslator,
    tag_policy: TagPolicy,
    transport: Arc<dyn DocumentTransport>,
    safe_logger: SafeLogger,
    config: StabilizationConfig,
}

impl CreateHandler {
    /// Rejects a config whose interval is zero or whose timeout allows no poll
    pub fn new(
        transport: Arc<dyn DocumentTransport>,
        config: StabilizationConfig,
    ) -> docflow_config::Result<Self> {
        Self::with_translator(DocumentModelTranslator::default(), transport, config)
    }

    /// Use a custom name synthesizer for unnamed documents
    pub fn with_name_synthesizer(
        name_synthesizer: Arc<dyn NameSynthesizer>,
        transport: Arc<dyn DocumentTransport>,
        config: StabilizationConfig,
    ) -> docflow_config::Result<Self> {
        Self::with_translator(
            DocumentModelTranslator::new(name_synthesizer),
            transport,
            config,
        )
    }

    pub fn with_translator(
        translator: DocumentModelTranslator,
        transport: Arc<dyn DocumentTransport>,
        config: StabilizationConfig,
    ) -> docflow_config::Result<Self> {
        config.validate()?;
        Ok(Self {
            retriever: StabilizationProgressRetriever::new(translator.clone(), transport.clone()),
            translator,
            exception_translator: ExceptionTranslator::new(),
            tag_policy: TagPolicy::new(),
            transport,
            safe_logger: SafeLogger::new(),
            config,
        })
    }

    pub fn config(&self) -> &StabilizationConfig {
        &self.config
    }

    /// Run one invocation. Failures become a terminal `FAILED` event.
    pub async fn reconcile(
        &self,
        request: &HandlerRequest,
        callback_context: Option<CallbackContext>,
    ) -> ProgressEvent<ResourceModel> {
        let mut model = request.desired_resource_state.clone();

        match self.handle(request, &mut model, callback_context).await {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(
                    document = model.display_name(),
                    code = %error.code(),
                    "{}",
                    error
                );
                ProgressEvent::failed(model, &error)
            }
        }
    }

    /// Same as [`reconcile`](Self::reconcile), but returns the classified error
    pub async fn try_reconcile(
        &self,
        request: &HandlerRequest,
        callback_context: Option<CallbackContext>,
    ) -> Result<ProgressEvent<ResourceModel>> {
        let mut model = request.desired_resource_state.clone();
        self.handle(request, &mut model, callback_context).await
    }

    async fn handle(
        &self,
        request: &HandlerRequest,
        model: &mut ResourceModel,
        callback_context: Option<CallbackContext>,
    ) -> Result<ProgressEvent<ResourceModel>> {
        self.safe_logger.log_document_information(
            model,
            callback_context.as_ref(),
            request.aws_account_id.as_deref(),
            &request.system_tags,
        );

        let context = callback_context.unwrap_or_default();
        if context.create_document_started {
            return self.update_progress(model, context).await;
        }

        let create_request = self
            .translator
            .generate_create_document_request(
                model,
                &request.system_tags,
                &request.desired_resource_tags,
                &request.client_request_token,
            )
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;

        // Every later invocation must see the same name
        model.name = Some(create_request.name.clone());

        let response = self.create_document(&create_request).await?;
        tracing::info!(document = %create_request.name, "Document creation started");

        Ok(ProgressEvent::in_progress(
            model.clone(),
            CallbackContext::started(self.config.poll_budget()),
            self.config.callback_delay_seconds,
            response.status_information().map(str::to_string),
        ))
    }

    /// Issue the create call, retrying once without tags when tagging alone failed
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse> {
        match self.transport.create_document(request).await {
            Ok(response) => return Ok(response),
            Err(error) => {
                if !self
                    .tag_policy
                    .should_soft_fail_tags(None, &request.tags, &error)
                {
                    return Err(self
                        .exception_translator
                        .classify(&error, &request.name, OPERATION_NAME));
                }
                tracing::warn!(
                    document = %request.name,
                    "Soft fail adding tags during create of document {}: {}",
                    request.name,
                    error
                );
            }
        }

        self.transport
            .create_document(&request.without_tags())
            .await
            .map_err(|error| {
                self.exception_translator
                    .classify(&error, &request.name, OPERATION_NAME)
            })
    }

    async fn update_progress(
        &self,
        model: &ResourceModel,
        context: CallbackContext,
    ) -> Result<ProgressEvent<ResourceModel>> {
        let name = model.display_name();
        let progress = self
            .retriever
            .get_progress(model, context)
            .await
            .map_err(|e| self.translate_progress_error(e, name))?;

        match operation_status(progress.status) {
            OperationStatus::InProgress => Ok(ProgressEvent::in_progress(
                model.clone(),
                progress.callback_context,
                self.config.callback_delay_seconds,
                progress.status_information,
            )),
            OperationStatus::Success => {
                tracing::info!(document = name, "Document is active");
                Ok(ProgressEvent::success(
                    model.clone(),
                    progress.status_information,
                ))
            }
            OperationStatus::Failed => Err(HandlerError::RemoteFailure(format!(
                "Document {} reached status {}: {}",
                name,
                progress.status,
                progress
                    .status_information
                    .as_deref()
                    .unwrap_or("no status information")
            ))),
        }
    }

    fn translate_progress_error(&self, error: ProgressError, name: &str) -> HandlerError {
        match error {
            ProgressError::Provider(e) => {
                self.exception_translator
                    .classify(&e, name, OPERATION_NAME)
            }
            ProgressError::Document(e) => HandlerError::InvalidInput(e.to_string()),
            ProgressError::UnrecognizedStatus(e) => HandlerError::RemoteFailure(format!(
                "Document {} reported a status outside the known set: {}",
                name, e.0
            )),
            ProgressError::BudgetExhausted { last_status } => HandlerError::TimedOut(format!(
                "Document {} did not become Active within {} seconds (last status: {})",
                name, self.config.stabilization_timeout_seconds, last_status
            )),
        }
    }
}
