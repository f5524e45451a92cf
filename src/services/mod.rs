//! Sub-clients for the services behind the gateway.
//!
//! Each sub-client owns the endpoint URL of its service and a handle to the
//! shared authenticated transport.

mod document;
mod endpoint;
mod office2pdf;
mod pdf2img;
mod pdf2txt;
mod watermarker;

pub use document::{Document, ImageFormat};
pub use office2pdf::{Office2PdfClient, SUPPORTED_EXTENSIONS};
pub use pdf2img::{Pdf2ImgClient, Pdf2ImgOptions};
pub use pdf2txt::{OutputFormat, Pdf2TxtClient, Pdf2TxtOptions, Pdf2TxtOutput};
pub use watermarker::{Position, WatermarkOptions, WatermarkerClient};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ServiceDescriptor;
use crate::transport::HttpTransport;

/// Common surface of the per-service clients.
#[async_trait]
pub trait ServiceClient: Send + Sync + Sized {
    /// Name and version of the service.
    const DESCRIPTOR: ServiceDescriptor;

    /// Creates a client for the service reachable at `base_url`.
    fn new(base_url: String, transport: Arc<dyn HttpTransport>) -> Self;

    /// Returns the endpoint URL the client was created with.
    fn base_url(&self) -> &str;

    /// Returns the transport requests are sent through.
    fn transport(&self) -> &Arc<dyn HttpTransport>;

    /// Probes the service's `health` endpoint.
    ///
    /// Returns `false` rather than failing when the service cannot be reached.
    async fn check_service_health(&self) -> bool;
}
