//! Declarative document model and per-invocation request

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired state of an `AWS::SSM::Document`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    /// Assigned on the first create call when absent; never changes afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Either a string or a mapping serialized to JSON before sending
    #[serde(default)]
    pub content: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ModelAttachmentsSource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<ModelDocumentRequires>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ResourceModel {
    /// The assigned name, treating an empty string as absent
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Name for log and error messages
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("<unnamed>")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelAttachmentsSource {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelDocumentRequires {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Everything the invocation harness supplies besides the callback context
#[derive(Debug, Clone, Default)]
pub struct HandlerRequest {
    pub desired_resource_state: ResourceModel,
    /// Stack-level system tags (e.g., `aws:cloudformation:stack-name`)
    pub system_tags: BTreeMap<String, String>,
    /// Tags to apply on creation in addition to the model's own
    pub desired_resource_tags: BTreeMap<String, String>,
    /// Idempotency token; also seeds name synthesis
    pub client_request_token: String,
    pub aws_account_id: Option<String>,
}

impl HandlerRequest {
    pub fn new(model: ResourceModel, client_request_token: impl Into<String>) -> Self {
        Self {
            desired_resource_state: model,
            client_request_token: client_request_token.into(),
            ..Default::default()
        }
    }

    pub fn with_system_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_tags.insert(key.into(), value.into());
        self
    }

    pub fn with_resource_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.desired_resource_tags.insert(key.into(), value.into());
        self
    }
}
