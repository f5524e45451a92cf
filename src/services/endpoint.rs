//! Request plumbing shared by the sub-clients.

use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{ApiErrorResponse, ServicesCloudError, ServicesCloudResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, MultipartPart};

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Base URL of one service plus the transport it is reached through.
#[derive(Clone)]
pub(crate) struct ServiceEndpoint {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl ServiceEndpoint {
    pub(crate) fn new(base_url: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Joins `path` onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// `GET health`; healthy only on HTTP 200 with `{"status": "up"}`.
    ///
    /// Never fails: transport errors and unexpected answers count as unhealthy.
    pub(crate) async fn check_health(&self) -> bool {
        let url = self.url("health");
        match self.transport.send(HttpRequest::get(&url)).await {
            Ok(response) if response.status == 200 => match response.json::<HealthResponse>() {
                Ok(health) => health.status == "up",
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Unreadable health response");
                    false
                }
            },
            Ok(response) => {
                tracing::warn!(url = %url, status = response.status, "Service reported unhealthy");
                false
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Health probe failed");
                false
            }
        }
    }

    /// Posts a multipart form and returns the successful response.
    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        parts: Vec<MultipartPart>,
    ) -> ServicesCloudResult<HttpResponse> {
        let request = HttpRequest::post(self.url(path)).with_multipart(parts);
        let response = self.transport.send(request).await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(api_error(&response))
        }
    }
}

fn api_error(response: &HttpResponse) -> ServicesCloudError {
    let message = match response.json::<ApiErrorResponse>() {
        Ok(body) => body.message,
        Err(_) if !response.body.is_empty() => response.text(),
        Err(_) => format!("HTTP {}", response.status),
    };

    ServicesCloudError::Api {
        status: response.status,
        message,
    }
}

impl std::fmt::Debug for ServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEndpoint")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::transport::TransportError;

    fn endpoint(mock: &Arc<MockTransport>) -> ServiceEndpoint {
        ServiceEndpoint::new("https://gw.example.com/pdf2txt/v1/".to_string(), mock.clone())
    }

    #[test]
    fn test_url_join() {
        let mock = Arc::new(MockTransport::new());
        assert_eq!(
            endpoint(&mock).url("/health"),
            "https://gw.example.com/pdf2txt/v1/health"
        );

        let bare = ServiceEndpoint::new("https://gw.example.com/x".to_string(), mock);
        assert_eq!(bare.url("health"), "https://gw.example.com/x/health");
    }

    #[tokio::test]
    async fn test_health_up() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::healthy());

        assert!(endpoint(&mock).check_health().await);
        assert_eq!(
            mock.last_request().unwrap().url,
            "https://gw.example.com/pdf2txt/v1/health"
        );
    }

    #[tokio::test]
    async fn test_health_down_variants() {
        let mock = Arc::new(MockTransport::new());
        let endpoint = endpoint(&mock);

        mock.queue(MockResponse::json(&serde_json::json!({"status": "down"})));
        assert!(!endpoint.check_health().await);

        mock.queue(MockResponse::error(403, "Forbidden"));
        assert!(!endpoint.check_health().await);

        mock.queue(MockResponse::bytes(b"<html>".to_vec(), "text/html"));
        assert!(!endpoint.check_health().await);

        mock.fail_with(TransportError::Connection {
            message: "refused".to_string(),
        });
        assert!(!endpoint.check_health().await);
    }

    #[tokio::test]
    async fn test_post_multipart_maps_api_error() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::error(400, "Unsupported file"));

        let err = endpoint(&mock)
            .post_multipart("extract", vec![MultipartPart::text("format", "text")])
            .await
            .unwrap_err();

        match err {
            ServicesCloudError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Unsupported file");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_post_multipart_plain_text_error() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::bytes(b"Bad gateway".to_vec(), "text/plain").with_status(502));

        let err = endpoint(&mock).post_multipart("extract", vec![]).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Bad gateway"));
    }
}
