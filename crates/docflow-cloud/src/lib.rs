//! docflow cloud contract
//!
//! This crate holds everything the reconciliation core shares with its
//! collaborators: the provider-facing request types, the closed set of
//! provider errors, the transport trait, the resumption token carried between
//! invocations and the progress events returned to the invocation harness.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   docflow CLI                    │
//! │        (invocation harness, state file)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │ (model, CallbackContext)
//! ┌─────────────────▼───────────────────────────────┐
//! │               docflow-document                   │
//! │   CreateHandler → ProgressEvent                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               docflow-cloud                      │
//! │  trait DocumentTransport { ... }                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │ docflow-cloud │
//!           │     -aws      │
//!           └───────────────┘
//! ```

pub mod error;
pub mod event;
pub mod provider;
pub mod request;
pub mod state;

// Re-exports
pub use error::{HandlerError, HandlerErrorCode, Result, StateError};
pub use event::{CallbackContext, OperationStatus, ProgressEvent};
pub use provider::{DocumentTransport, ProviderError, ProviderErrorKind};
pub use request::{
    AttachmentsSource, CreateDocumentRequest, CreateDocumentResponse, DeleteDocumentRequest,
    DescribeDocumentRequest, DocumentDescription, DocumentRequires, Tag, UpdateDocumentRequest,
};
pub use state::{DocumentStatus, InvocationState, StateLock, StateManager, UnrecognizedStatus};
