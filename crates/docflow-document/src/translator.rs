//! Translates the declarative model into provider requests

use crate::error::{DocumentError, Result};
use crate::model::{ModelAttachmentsSource, ModelDocumentRequires, ResourceModel};
use crate::naming::{NameSynthesizer, StackNameSynthesizer};
use docflow_cloud::request::LATEST_DOCUMENT_VERSION;
use docflow_cloud::{
    AttachmentsSource, CreateDocumentRequest, DeleteDocumentRequest, DescribeDocumentRequest,
    DocumentRequires, Tag, UpdateDocumentRequest,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pure request builder; holds no state besides the name synthesizer
#[derive(Clone)]
pub struct DocumentModelTranslator {
    name_synthesizer: Arc<dyn NameSynthesizer>,
}

impl Default for DocumentModelTranslator {
    fn default() -> Self {
        Self::new(Arc::new(StackNameSynthesizer))
    }
}

impl DocumentModelTranslator {
    pub fn new(name_synthesizer: Arc<dyn NameSynthesizer>) -> Self {
        Self { name_synthesizer }
    }

    /// Build the create request, synthesizing a name when the model has none
    pub fn generate_create_document_request(
        &self,
        model: &ResourceModel,
        system_tags: &BTreeMap<String, String>,
        resource_tags: &BTreeMap<String, String>,
        request_token: &str,
    ) -> Result<CreateDocumentRequest> {
        let name = match model.name() {
            Some(name) => name.to_string(),
            None => self
                .name_synthesizer
                .synthesize_name(system_tags, request_token),
        };

        let content = process_document_content(&model.content)?;

        Ok(CreateDocumentRequest {
            name,
            version_name: model.version_name.clone(),
            content,
            document_format: model.document_format.clone(),
            document_type: model.document_type.clone(),
            target_type: model.target_type.clone(),
            tags: translate_tags(resource_tags, &model.tags),
            attachments: translate_attachments(&model.attachments),
            requires: translate_requires(&model.requires),
        })
    }

    pub fn generate_describe_document_request(
        &self,
        model: &ResourceModel,
    ) -> Result<DescribeDocumentRequest> {
        Ok(DescribeDocumentRequest {
            name: required_name(model, "DescribeDocument")?,
            document_version: Some(LATEST_DOCUMENT_VERSION.to_string()),
        })
    }

    pub fn generate_update_document_request(
        &self,
        model: &ResourceModel,
    ) -> Result<UpdateDocumentRequest> {
        let name = required_name(model, "UpdateDocument")?;
        let content = process_document_content(&model.content)?;

        Ok(UpdateDocumentRequest {
            name,
            content,
            version_name: model.version_name.clone(),
            document_version: Some(LATEST_DOCUMENT_VERSION.to_string()),
            document_format: model.document_format.clone(),
            target_type: model.target_type.clone(),
            attachments: translate_attachments(&model.attachments),
        })
    }

    pub fn generate_delete_document_request(
        &self,
        model: &ResourceModel,
    ) -> Result<DeleteDocumentRequest> {
        Ok(DeleteDocumentRequest {
            name: required_name(model, "DeleteDocument")?,
            force: true,
        })
    }
}

fn required_name(model: &ResourceModel, operation: &'static str) -> Result<String> {
    model
        .name()
        .map(str::to_string)
        .ok_or(DocumentError::MissingName(operation))
}

/// Strings pass through; mappings are serialized to JSON
fn process_document_content(content: &serde_json::Value) -> Result<String> {
    match content {
        serde_json::Value::String(text) => Ok(text.clone()),
        serde_json::Value::Object(_) => serde_json::to_string(content)
            .map_err(|e| DocumentError::InvalidContent(e.to_string())),
        other => Err(DocumentError::InvalidContent(format!(
            "expected a string or a mapping, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// Resource tags overlaid with model tags (model wins), in key order
fn translate_tags(
    resource_tags: &BTreeMap<String, String>,
    model_tags: &BTreeMap<String, String>,
) -> Vec<Tag> {
    let mut merged = resource_tags.clone();
    merged.extend(model_tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged.into_iter().map(|(k, v)| Tag::new(k, v)).collect()
}

fn translate_attachments(sources: &[ModelAttachmentsSource]) -> Option<Vec<AttachmentsSource>> {
    if sources.is_empty() {
        return None;
    }

    Some(
        sources
            .iter()
            .map(|source| AttachmentsSource {
                key: source.key.clone(),
                values: source.values.clone(),
                name: source.name.clone(),
            })
            .collect(),
    )
}

fn translate_requires(requires: &[ModelDocumentRequires]) -> Option<Vec<DocumentRequires>> {
    if requires.is_empty() {
        return None;
    }

    Some(
        requires
            .iter()
            .map(|r| DocumentRequires {
                name: r.name.clone(),
                version: r.version.clone(),
            })
            .collect(),
    )
}
