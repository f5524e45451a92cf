//! Error types for the ServicesCloud client.
//!
//! Configuration problems are reported when the client is built. Transport
//! failures are passed through untouched; this crate never retries.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for ServicesCloud operations.
pub type ServicesCloudResult<T> = Result<T, ServicesCloudError>;

/// Error type for ServicesCloud client operations.
#[derive(Debug, Error)]
pub enum ServicesCloudError {
    /// Configuration error (missing API key, invalid API URL, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Failure reported by the underlying HTTP transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A service answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Request options failed validation before sending.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the invalid option.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl ServicesCloudError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        ServicesCloudError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServicesCloudError::Validation {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ServicesCloudError::Configuration { .. })
    }

    /// Returns the HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServicesCloudError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body returned by the gateway and the services.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Human readable message.
    #[serde(alias = "error")]
    pub message: String,
}

impl From<serde_json::Error> for ServicesCloudError {
    fn from(err: serde_json::Error) -> Self {
        ServicesCloudError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ServicesCloudError {
    fn from(err: url::ParseError) -> Self {
        ServicesCloudError::Configuration {
            message: format!("The API URL is not valid: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configuration() {
        assert!(ServicesCloudError::configuration("missing").is_configuration());
        assert!(!ServicesCloudError::validation("bad").is_configuration());
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let error: ServicesCloudError = TransportError::Connection {
            message: "connection refused".to_string(),
        }
        .into();

        assert_eq!(error.to_string(), "Connection error: connection refused");
    }

    #[test]
    fn test_status() {
        let error = ServicesCloudError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert_eq!(error.status(), Some(403));
        assert_eq!(ServicesCloudError::validation("x").status(), None);
    }

    #[test]
    fn test_url_parse_error_maps_to_configuration() {
        let error: ServicesCloudError = url::Url::parse("not a url").unwrap_err().into();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("The API URL is not valid"));
    }

    #[test]
    fn test_api_error_response_accepts_error_field() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"error": "Invalid API key"}"#).unwrap();
        assert_eq!(body.message, "Invalid API key");
    }
}
