//! PDF page to image conversion service.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::document::{Document, ImageFormat};
use super::endpoint::ServiceEndpoint;
use super::ServiceClient;
use crate::config::ServiceDescriptor;
use crate::errors::{ServicesCloudError, ServicesCloudResult};
use crate::transport::{HttpTransport, MultipartPart};

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf2ImgOptions {
    /// Output format.
    pub format: ImageFormat,
    /// 1-based page to render.
    pub page: u32,
    /// Rendering density in DPI.
    pub density: u32,
    /// Maximum output height in pixels.
    pub height: u32,
    /// Maximum output width in pixels.
    pub width: u32,
    /// Background color used for transparent areas.
    pub background: String,
    /// Output quality, 0 to 100.
    pub quality: u8,
}

impl Default for Pdf2ImgOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Webp,
            page: 1,
            density: 300,
            height: 1000,
            width: 1000,
            background: "white".to_string(),
            quality: 80,
        }
    }
}

impl Pdf2ImgOptions {
    /// Sets the output format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the page to render.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the rendering density.
    pub fn density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    /// Sets the maximum output size.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the background color.
    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Sets the output quality.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> ServicesCloudResult<()> {
        if self.page == 0 {
            return Err(ServicesCloudError::validation("page starts at 1"));
        }
        if self.density == 0 || self.width == 0 || self.height == 0 {
            return Err(ServicesCloudError::validation(
                "density, width and height must be positive",
            ));
        }
        if self.quality > 100 {
            return Err(ServicesCloudError::validation("quality must be between 0 and 100"));
        }
        if self.background.is_empty() {
            return Err(ServicesCloudError::validation("background can not be empty"));
        }
        Ok(())
    }

    fn into_parts(self) -> Vec<MultipartPart> {
        vec![
            MultipartPart::text("format", self.format),
            MultipartPart::text("page", self.page),
            MultipartPart::text("density", self.density),
            MultipartPart::text("height", self.height),
            MultipartPart::text("width", self.width),
            MultipartPart::text("background", self.background),
            MultipartPart::text("quality", self.quality),
        ]
    }
}

/// Client for the pdf2img service.
#[derive(Debug, Clone)]
pub struct Pdf2ImgClient {
    endpoint: ServiceEndpoint,
}

impl Pdf2ImgClient {
    /// Renders one page of a PDF and returns the image bytes.
    #[instrument(skip(self, pdf), fields(size = pdf.data.len(), page = options.page, format = %options.format))]
    pub async fn convert(
        &self,
        pdf: Document,
        options: Pdf2ImgOptions,
    ) -> ServicesCloudResult<Vec<u8>> {
        if pdf.is_empty() {
            return Err(ServicesCloudError::validation("The PDF is empty"));
        }
        options.validate()?;

        let mut parts = vec![MultipartPart::file(
            "file",
            pdf.filename,
            pdf.content_type,
            pdf.data,
        )];
        parts.extend(options.into_parts());

        let response = self.endpoint.post_multipart("convert", parts).await?;
        Ok(response.body)
    }
}

#[async_trait]
impl ServiceClient for Pdf2ImgClient {
    const DESCRIPTOR: ServiceDescriptor = ServiceDescriptor::new("pdf2img", "v1");

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
