//! Provider-facing request and response types

use serde::{Deserialize, Serialize};

/// Document version selector for the newest version
pub const LATEST_DOCUMENT_VERSION: &str = "$LATEST";

/// Key/value tag attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Attachment source for a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttachmentsSource {
    pub key: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    pub name: Option<String>,
}

/// Document this document depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequires {
    pub name: String,
    pub version: Option<String>,
}

/// Request to create a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub version_name: Option<String>,
    pub content: String,
    pub document_format: Option<String>,
    pub document_type: Option<String>,
    pub target_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub attachments: Option<Vec<AttachmentsSource>>,
    pub requires: Option<Vec<DocumentRequires>>,
}

impl CreateDocumentRequest {
    /// Same request with the optional tag attribute stripped
    pub fn without_tags(&self) -> Self {
        Self {
            tags: Vec::new(),
            ..self.clone()
        }
    }
}

/// Request to describe a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeDocumentRequest {
    pub name: String,
    pub document_version: Option<String>,
}

/// Request to update a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub name: String,
    pub content: String,
    pub version_name: Option<String>,
    pub document_version: Option<String>,
    pub document_format: Option<String>,
    pub target_type: Option<String>,
    pub attachments: Option<Vec<AttachmentsSource>>,
}

/// Request to delete a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDocumentRequest {
    pub name: String,
    /// Required for some document types; fails if the caller lacks permission to use it
    pub force: bool,
}

/// Description of a document as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentDescription {
    pub name: String,
    /// Raw provider status (e.g., "Creating", "Active")
    pub status: Option<String>,
    pub status_information: Option<String>,
    pub document_version: Option<String>,
}

/// Response to a create request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
    pub document_description: Option<DocumentDescription>,
}

impl CreateDocumentResponse {
    pub fn status_information(&self) -> Option<&str> {
        self.document_description
            .as_ref()
            .and_then(|d| d.status_information.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_tags_keeps_everything_else() {
        let request = CreateDocumentRequest {
            name: "mystack-document-abc".to_string(),
            content: "{}".to_string(),
            document_type: Some("Command".to_string()),
            tags: vec![Tag::new("env", "prod")],
            ..Default::default()
        };

        let stripped = request.without_tags();
        assert!(stripped.tags.is_empty());
        assert_eq!(stripped.name, request.name);
        assert_eq!(stripped.document_type, request.document_type);
        assert_eq!(request.tags.len(), 1);
    }
}
