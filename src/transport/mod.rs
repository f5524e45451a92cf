//! HTTP transport layer for the ServicesCloud client.
//!
//! Provides the transport abstraction every sub-client sends through and the
//! default reqwest-backed implementation.

mod http;

pub use http::{
    HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartPart,
    ReqwestTransport,
};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
