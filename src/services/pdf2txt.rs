//! PDF text extraction service.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::document::Document;
use super::endpoint::ServiceEndpoint;
use super::ServiceClient;
use crate::config::ServiceDescriptor;
use crate::errors::{ServicesCloudError, ServicesCloudResult};
use crate::transport::{HttpTransport, MultipartPart};

/// Extraction output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Text,
    /// Per-page JSON document.
    Json,
}

impl OutputFormat {
    /// Value sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

/// Extraction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf2TxtOptions {
    /// First page to extract, 1-based.
    pub first_page: u32,
    /// Last page to extract, inclusive; `None` means the end of the document.
    pub last_page: Option<u32>,
    /// Output format.
    pub format: OutputFormat,
    /// Collapse runs of whitespace.
    pub normalize_whitespace: bool,
}

impl Default for Pdf2TxtOptions {
    fn default() -> Self {
        Self {
            first_page: 1,
            last_page: None,
            format: OutputFormat::Text,
            normalize_whitespace: true,
        }
    }
}

impl Pdf2TxtOptions {
    /// Restricts extraction to a page range.
    pub fn pages(mut self, first_page: u32, last_page: Option<u32>) -> Self {
        self.first_page = first_page;
        self.last_page = last_page;
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables or disables whitespace normalization.
    pub fn normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> ServicesCloudResult<()> {
        if self.first_page == 0 {
            return Err(ServicesCloudError::validation("firstPage starts at 1"));
        }
        if let Some(last_page) = self.last_page {
            if last_page < self.first_page {
                return Err(ServicesCloudError::validation(format!(
                    "lastPage ({}) is before firstPage ({})",
                    last_page, self.first_page
                )));
            }
        }
        Ok(())
    }

    fn into_parts(self) -> Vec<MultipartPart> {
        let mut parts = vec![MultipartPart::text("firstPage", self.first_page)];
        if let Some(last_page) = self.last_page {
            parts.push(MultipartPart::text("lastPage", last_page));
        }
        parts.push(MultipartPart::text("format", self.format.as_str()));
        parts.push(MultipartPart::text(
            "normalizeWhitespace",
            self.normalize_whitespace,
        ));
        parts
    }
}

/// Extracted content.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdf2TxtOutput {
    /// Plain text.
    Text(String),
    /// JSON document as returned by the service.
    Json(serde_json::Value),
}

impl Pdf2TxtOutput {
    /// Returns the text if this is a plain text output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Pdf2TxtOutput::Text(text) => Some(text.as_str()),
            Pdf2TxtOutput::Json(_) => None,
        }
    }
}

/// Client for the pdf2txt service.
#[derive(Debug, Clone)]
pub struct Pdf2TxtClient {
    endpoint: ServiceEndpoint,
}

impl Pdf2TxtClient {
    /// Extracts the text of a PDF.
    #[instrument(skip(self, pdf), fields(size = pdf.data.len(), format = options.format.as_str()))]
    pub async fn extract(
        &self,
        pdf: Document,
        options: Pdf2TxtOptions,
    ) -> ServicesCloudResult<Pdf2TxtOutput> {
        if pdf.is_empty() {
            return Err(ServicesCloudError::validation("The PDF is empty"));
        }
        options.validate()?;

        let format = options.format;
        let mut parts = vec![MultipartPart::file(
            "file",
            pdf.filename,
            pdf.content_type,
            pdf.data,
        )];
        parts.extend(options.into_parts());

        let response = self.endpoint.post_multipart("extract", parts).await?;

        match format {
            OutputFormat::Text => Ok(Pdf2TxtOutput::Text(response.text())),
            OutputFormat::Json => Ok(Pdf2TxtOutput::Json(response.json()?)),
        }
    }
}

#[async_trait]
impl ServiceClient for Pdf2TxtClient {
    const DESCRIPTOR: ServiceDescriptor = ServiceDescriptor::new("pdf2txt", "v1");

    fn new(base_url: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(base_url, transport),
        }
    }

    fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    fn transport(&self) -> &Arc<dyn HttpTransport> {
        self.endpoint.transport()
    }

    async fn check_service_health(&self) -> bool {
        self.endpoint.check_health().await
    }
}
