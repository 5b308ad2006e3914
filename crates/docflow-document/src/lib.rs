//! SSM document create workflow
//!
//! This crate reconciles a single `AWS::SSM::Document` whose creation is
//! asynchronous. Every call to [`CreateHandler::reconcile`] is an independent
//! invocation: the only state that survives between calls is the
//! [`CallbackContext`] the caller hands back.
//!
//! # Flow
//!
//! - First invocation (no context): build the create request, synthesize a
//!   name if the model has none, issue the create call and return
//!   `IN_PROGRESS` with a fresh context.
//! - Later invocations: describe the document once, map its status to an
//!   outcome, and either return `IN_PROGRESS` again or finish.
//!
//! # Example
//!
//! ```ignore
//! use docflow_document::{CreateHandler, HandlerRequest, ResourceModel};
//! use docflow_config::StabilizationConfig;
//!
//! let handler = CreateHandler::new(transport, StabilizationConfig::default())?;
//! let mut context = None;
//! loop {
//!     let event = handler.reconcile(&request, context).await;
//!     if event.is_terminal() {
//!         break;
//!     }
//!     context = event.callback_context;
//!     tokio::time::sleep(Duration::from_secs(event.callback_delay_seconds.into())).await;
//! }
//! ```

pub mod classifier;
pub mod error;
pub mod handler;
pub mod model;
pub mod naming;
pub mod progress;
pub mod safe_log;
pub mod status;
pub mod tags;
pub mod translator;

pub use classifier::ExceptionTranslator;
pub use docflow_cloud::{CallbackContext, OperationStatus, ProgressEvent};
pub use error::{DocumentError, ProgressError, Result};
pub use handler::CreateHandler;
pub use model::{HandlerRequest, ModelAttachmentsSource, ModelDocumentRequires, ResourceModel};
pub use naming::{NameSynthesizer, STACK_NAME_TAG, StackNameSynthesizer};
pub use progress::{ProgressResponse, StabilizationProgressRetriever};
pub use safe_log::SafeLogger;
pub use status::operation_status;
pub use tags::TagPolicy;
pub use translator::DocumentModelTranslator;
