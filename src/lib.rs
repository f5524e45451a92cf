//! ServicesCloud Client Library
//!
//! An async Rust client for the ServicesCloud API gateway, which exposes
//! document-processing services: office documents to PDF, PDF to images,
//! PDF to text, and image watermarking.
//!
//! # Features
//!
//! - **Single credential**: the `X-Api-Key` header is added by one
//!   authenticated transport shared by every service client
//! - **Environment configuration**: `SERVICES_CLOUD_API_KEY` and
//!   `SERVICES_CLOUD_API_URL` are used when no explicit value is given
//! - **Lazy service clients**: each service client is created on first use
//! - **Health checks**: per service or for all services at once
//! - **Pluggable transport**: any [`transport::HttpTransport`] can be injected
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use services_cloud_client::ServicesCloudClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads SERVICES_CLOUD_API_KEY and SERVICES_CLOUD_API_URL
//!     let client = ServicesCloudClient::from_env()?;
//!
//!     for (service, healthy) in client.check_services_health().await.iter() {
//!         println!("{service}: {healthy}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod services;
pub mod transport;

// Re-exports for convenience
pub use auth::{ApiKeyAuth, AuthenticatedTransport, API_KEY_HEADER};
pub use client::{ServicesCloudClient, ServicesCloudClientBuilder, ServicesHealth};
pub use config::{ServiceDescriptor, ServicesCloudConfig, DEFAULT_API_URL};
pub use errors::{ServicesCloudError, ServicesCloudResult};
pub use services::{
    Document, ImageFormat, Office2PdfClient, OutputFormat, Pdf2ImgClient, Pdf2ImgOptions,
    Pdf2TxtClient, Pdf2TxtOptions, Pdf2TxtOutput, Position, ServiceClient, WatermarkOptions,
    WatermarkerClient,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
