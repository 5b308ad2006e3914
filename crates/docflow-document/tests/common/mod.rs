use async_trait::async_trait;
use docflow_cloud::{
    CreateDocumentRequest, CreateDocumentResponse, DescribeDocumentRequest, DocumentDescription,
    DocumentTransport, ProviderError,
};
use docflow_document::{HandlerRequest, ResourceModel, STACK_NAME_TAG};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// In-memory transport that replays scripted responses and records calls
#[derive(Default)]
pub struct ScriptedTransport {
    create_results: Mutex<VecDeque<Result<CreateDocumentResponse, ProviderError>>>,
    describe_results: Mutex<VecDeque<Result<DocumentDescription, ProviderError>>>,
    create_calls: Mutex<Vec<CreateDocumentRequest>>,
    describe_calls: Mutex<Vec<DescribeDocumentRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn push_create(&self, result: Result<CreateDocumentResponse, ProviderError>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    #[allow(dead_code)]
    pub fn push_create_ok(&self) {
        self.push_create(Ok(CreateDocumentResponse {
            document_description: Some(DocumentDescription {
                status: Some("Creating".to_string()),
                status_information: Some("Document creation in progress".to_string()),
                ..Default::default()
            }),
        }));
    }

    pub fn push_status(&self, status: &str) {
        self.describe_results
            .lock()
            .unwrap()
            .push_back(Ok(DocumentDescription {
                status: Some(status.to_string()),
                ..Default::default()
            }));
    }

    pub fn push_describe(&self, result: Result<DocumentDescription, ProviderError>) {
        self.describe_results.lock().unwrap().push_back(result);
    }

    #[allow(dead_code)]
    pub fn create_calls(&self) -> Vec<CreateDocumentRequest> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> Vec<DescribeDocumentRequest> {
        self.describe_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, ProviderError> {
        self.create_calls.lock().unwrap().push(request.clone());
        self.create_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create call")
    }

    async fn describe_document(
        &self,
        request: &DescribeDocumentRequest,
    ) -> Result<DocumentDescription, ProviderError> {
        self.describe_calls.lock().unwrap().push(request.clone());
        self.describe_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected describe call")
    }
}

/// Unnamed command document in stack `mystack` tagged `env=prod`
#[allow(dead_code)]
pub fn unnamed_request() -> HandlerRequest {
    let model = ResourceModel {
        content: serde_json::json!({ "mainSteps": [], "schemaVersion": "2.2" }),
        document_type: Some("Command".to_string()),
        tags: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        ..Default::default()
    };

    HandlerRequest::new(model, "3f2a9c1e-request-token").with_system_tag(STACK_NAME_TAG, "mystack")
}
