//! Image watermarking service.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::document::{Document, ImageFormat};
use super::endpoint::ServiceEndpoint;
use super::ServiceClient;
use crate::config::ServiceDescriptor;
use crate::errors::{ServicesCloudError, ServicesCloudResult};
use crate::transport::{HttpTransport, MultipartPart};

/// Placement of the watermark on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Centered.
    #[default]
    Center,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    BottomRight,
}

impl Position {
    /// Value sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::Top => "top",
            Position::Bottom => "bottom",
            Position::Left => "left",
            Position::Right => "right",
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }
}

/// Watermarking options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOptions {
    /// Watermark size as a percentage of the image, 1 to 100.
    pub size: u8,
    /// Watermark placement.
    pub position: Position,
    /// Output format.
    pub format: ImageFormat,
    /// Output quality, 0 to 100.
    pub quality: u8,
    /// Blur radius applied to the watermark.
    pub blur: u32,
    /// Watermark opacity percentage, 0 to 100.
    pub opacity: u8,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            size: 75,
            position: Position::Center,
            format: ImageFormat::Png,
            quality: 100,
            blur: 0,
            opacity: 75,
        }
    }
}

impl WatermarkOptions {
    /// Sets the size percentage.
    pub fn size(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    /// Sets the placement.
    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the output quality.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the blur radius.
    pub fn blur(mut self, blur: u32) -> Self {
        self.blur = blur;
        self
    }

    /// Sets the opacity.
    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> ServicesCloudResult<()> {
        if !(1..=100).contains(&self.size) {
            return Err(ServicesCloudError::validation("size must be between 1 and 100"));
        }
        if self.quality > 100 {
            return Err(ServicesCloudError::validation("quality must be between 0 and 100"));
        }
        if self.opacity > 100 {
            return Err(ServicesCloudError::validation("opacity must be between 0 and 100"));
        }
        Ok(())
    }

    fn into_parts(self) -> Vec<MultipartPart> {
        vec![
            MultipartPart::text("size", self.size),
            MultipartPart::text("position", self.position.as_str()),
            MultipartPart::text("format", self.format),
            MultipartPart::text("quality", self.quality),
            MultipartPart::text("blur", self.blur),
            MultipartPart::text("opacity", self.opacity),
        ]
    }
}

/// Client for the watermarker service.
#[derive(Debug, Clone)]
pub struct WatermarkerClient {
    endpoint: ServiceEndpoint,
}

impl WatermarkerClient {
    /// Applies `watermark` over `image` and returns the resulting image bytes.
    #[instrument(
        skip(self, image, watermark),
        fields(image = %image.filename, watermark = %watermark.filename, position = options.position.as_str())
    )]
    pub async fn apply(
        &self,
        image: Document,
        watermark: Document,
        options: WatermarkOptions,
    ) -> ServicesCloudResult<Vec<u8>> {
        if image.is_empty() || watermark.is_empty() {
            return Err(ServicesCloudError::validation(
                "The image and the watermark must not be empty",
            ));
        }
        options.validate()?;

        let mut parts = vec![
            MultipartPart::file("image", image.filename, image.content_type, image.data),
            MultipartPart::file(
                "watermark",
                watermark.filename,
                watermark.content_type,
                watermark.data,
            ),
        ];
        parts.extend(options.into_parts());

        let response = self.endpoint.post_multipart("apply", parts).await?;
        Ok(response.body)
    }
}

#[async_trait]
impl ServiceClient for WatermarkerClient {
    const DESCRIPTOR: ServiceDescriptor = ServiceDescriptor::new("watermarker", "v1");

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};

    #[test]
    fn test_options_validation() {
        assert!(WatermarkOptions::default().validate().is_ok());
        assert!(WatermarkOptions::default().size(0).validate().is_err());
        assert!(WatermarkOptions::default().opacity(150).validate().is_err());
        assert!(WatermarkOptions::default().quality(101).validate().is_err());
    }

    #[tokio::test]
    async fn test_apply_sends_both_files() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::bytes(vec![1, 2, 3], &ImageFormat::Jpeg.mime_type()));
        let client = WatermarkerClient::new("https://gw/watermarker/v1/".to_string(), mock.clone());

        let output = client
            .apply(
                Document::new("photo.jpg", vec![9; 16]),
                Document::new("logo.png", vec![7; 8]),
                WatermarkOptions::default()
                    .position(Position::BottomRight)
                    .format(ImageFormat::Jpeg)
                    .opacity(40),
            )
            .await
            .unwrap();

        assert_eq!(output, vec![1, 2, 3]);
        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "https://gw/watermarker/v1/apply");
        assert_eq!(&request.form_fields()[..2], &["image", "watermark"]);
        assert_eq!(request.form_text("position"), Some("bottom-right"));
        assert_eq!(request.form_text("format"), Some("jpeg"));
        assert_eq!(request.form_text("opacity"), Some("40"));
    }

    #[tokio::test]
    async fn test_apply_empty_watermark_rejected() {
        let mock = Arc::new(MockTransport::new());
        let client = WatermarkerClient::new("https://gw/watermarker/v1/".to_string(), mock.clone());

        let result = client
            .apply(
                Document::new("photo.jpg", vec![1]),
                Document::new("logo.png", vec![]),
                WatermarkOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(ServicesCloudError::Validation { .. })));
        assert_eq!(mock.request_count(), 0);
    }
}
