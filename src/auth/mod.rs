//! Authentication for the ServicesCloud gateway.
//!
//! The gateway authenticates every call with an `X-Api-Key` header. The
//! header is added in one place, [`AuthenticatedTransport`], which every
//! sub-client sends through.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::instrument;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Name of the header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// API key credential.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: SecretString,
}

impl ApiKeyAuth {
    /// Creates a new API key credential.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Creates from a string API key.
    pub fn from_string(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
        }
    }

    /// Sets the `X-Api-Key` header, overwriting any existing value.
    pub fn apply_auth(&self, request: &mut HttpRequest) {
        request.set_header(API_KEY_HEADER, self.api_key.expose_secret().as_str());
    }

    /// Gets a hint of the API key for debugging (last 4 characters).
    pub fn key_hint(&self) -> String {
        key_hint(self.api_key.expose_secret())
    }
}

pub(crate) fn key_hint(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 4 {
        format!("...{}", chars[chars.len() - 4..].iter().collect::<String>())
    } else {
        "****".to_string()
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"[REDACTED]")
            .field("key_hint", &self.key_hint())
            .finish()
    }
}

/// Transport decorator injecting the API key into every request.
///
/// Errors and responses of the wrapped transport are returned unchanged.
pub struct AuthenticatedTransport {
    inner: Arc<dyn HttpTransport>,
    auth: ApiKeyAuth,
}

impl AuthenticatedTransport {
    /// Wraps `inner`, authenticating with `auth`.
    pub fn new(inner: Arc<dyn HttpTransport>, auth: ApiKeyAuth) -> Self {
        Self { inner, auth }
    }

    /// Returns the wrapped transport.
    pub fn inner(&self) -> &Arc<dyn HttpTransport> {
        &self.inner
    }
}

#[async_trait]
impl HttpTransport for AuthenticatedTransport {
    #[instrument(skip(self, request), fields(url = %request.url, key_hint = %self.auth.key_hint()))]
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.auth.apply_auth(&mut request);
        self.inner.send(request).await
    }
}

impl std::fmt::Debug for AuthenticatedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedTransport")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
