//! `DocumentTransport` backed by the SSM API

use async_trait::async_trait;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::config::http::HttpResponse;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types as ssm;
use docflow_cloud::{
    AttachmentsSource, CreateDocumentRequest, CreateDocumentResponse, DescribeDocumentRequest,
    DocumentDescription, DocumentRequires, DocumentTransport, ProviderError, ProviderErrorKind,
    Tag,
};

/// SSM document API client
pub struct SsmTransport {
    client: Client,
}

impl SsmTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS configuration chain
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl DocumentTransport for SsmTransport {
    fn name(&self) -> &str {
        "aws-ssm"
    }

    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, ProviderError> {
        tracing::debug!(
            document = %request.name,
            tags = request.tags.len(),
            "Calling ssm:CreateDocument"
        );

        let output = self
            .client
            .create_document()
            .name(&request.name)
            .content(&request.content)
            .set_version_name(request.version_name.clone())
            .set_document_format(request.document_format.as_deref().map(ssm::DocumentFormat::from))
            .set_document_type(request.document_type.as_deref().map(ssm::DocumentType::from))
            .set_target_type(request.target_type.clone())
            .set_tags(to_ssm_tags(&request.tags)?)
            .set_attachments(request.attachments.as_deref().map(to_ssm_attachments))
            .set_requires(
                request
                    .requires
                    .as_deref()
                    .map(to_ssm_requires)
                    .transpose()?,
            )
            .send()
            .await
            .map_err(provider_error)?;

        Ok(CreateDocumentResponse {
            document_description: output.document_description().map(from_ssm_description),
        })
    }

    async fn describe_document(
        &self,
        request: &DescribeDocumentRequest,
    ) -> Result<DocumentDescription, ProviderError> {
        tracing::debug!(document = %request.name, "Calling ssm:DescribeDocument");

        let output = self
            .client
            .describe_document()
            .name(&request.name)
            .set_document_version(request.document_version.clone())
            .send()
            .await
            .map_err(provider_error)?;

        output
            .document()
            .map(from_ssm_description)
            .ok_or_else(|| {
                ProviderError::new(
                    ProviderErrorKind::InvalidDocument,
                    format!("DescribeDocument returned no description for {}", request.name),
                )
            })
    }
}

/// Empty tag lists are omitted rather than sent
fn to_ssm_tags(tags: &[Tag]) -> Result<Option<Vec<ssm::Tag>>, ProviderError> {
    if tags.is_empty() {
        return Ok(None);
    }

    tags.iter()
        .map(|tag| {
            ssm::Tag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
                .map_err(|e| ProviderError::new(ProviderErrorKind::Validation, e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn to_ssm_attachments(sources: &[AttachmentsSource]) -> Vec<ssm::AttachmentsSource> {
    sources
        .iter()
        .map(|source| {
            ssm::AttachmentsSource::builder()
                .set_key(source.key.as_deref().map(ssm::AttachmentsSourceKey::from))
                .set_values(Some(source.values.clone()))
                .set_name(source.name.clone())
                .build()
        })
        .collect()
}

fn to_ssm_requires(requires: &[DocumentRequires]) -> Result<Vec<ssm::DocumentRequires>, ProviderError> {
    requires
        .iter()
        .map(|r| {
            ssm::DocumentRequires::builder()
                .name(&r.name)
                .set_version(r.version.clone())
                .build()
                .map_err(|e| ProviderError::new(ProviderErrorKind::Validation, e.to_string()))
        })
        .collect()
}

fn from_ssm_description(description: &ssm::DocumentDescription) -> DocumentDescription {
    DocumentDescription {
        name: description.name().unwrap_or_default().to_string(),
        status: description.status().map(|s| s.as_str().to_string()),
        status_information: description.status_information().map(str::to_string),
        document_version: description.document_version().map(str::to_string),
    }
}

/// Flatten an SDK error into the provider error taxonomy
fn provider_error<E>(err: SdkError<E, HttpResponse>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    let error = ProviderError::from_code(&code, message);
    match status {
        Some(status) => error.with_status(status),
        None => error,
    }
}
