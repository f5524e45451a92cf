//! Mock implementations for testing.
//!
//! Provides a recording mock transport so the facade and the sub-clients can
//! be unit tested without reaching the gateway.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::transport::{
    HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: HttpBody,
}

impl RecordedRequest {
    /// Returns a header value, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of a multipart text field.
    pub fn form_text(&self, field: &str) -> Option<&str> {
        match &self.body {
            HttpBody::Multipart(parts) => parts.iter().find_map(|part| match part {
                crate::transport::MultipartPart::Text { name, value } if name == field => {
                    Some(value.as_str())
                }
                _ => None,
            }),
            _ => None,
        }
    }

    /// Returns the names of the multipart fields in order.
    pub fn form_fields(&self) -> Vec<&str> {
        match &self.body {
            HttpBody::Multipart(parts) => parts.iter().map(|p| p.name()).collect(),
            _ => Vec::new(),
        }
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            status: 200,
            headers,
            body,
        }
    }

    /// Creates a successful binary response.
    pub fn bytes(body: Vec<u8>, content_type: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());

        Self {
            status: 200,
            headers,
            body,
        }
    }

    /// Creates an error response shaped like the gateway's.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(&serde_json::json!({ "message": message })).with_status(status)
    }

    /// Healthy `/health` answer.
    pub fn healthy() -> Self {
        Self::json(&serde_json::json!({ "status": "up" }))
    }

    /// Creates a response with custom status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Mock HTTP transport for testing.
///
/// Answers in this order: a route whose suffix matches the URL, the next
/// queued response, the default response, else HTTP 500.
pub struct MockTransport {
    routes: Mutex<Vec<(String, MockResponse)>>,
    responses: Mutex<Vec<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
    failure: Mutex<Option<TransportError>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    /// Answers every request whose URL ends with `url_suffix`.
    pub fn route(&self, url_suffix: impl Into<String>, response: MockResponse) {
        lock(&self.routes).push((url_suffix.into(), response));
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push(response);
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Makes the next request fail with `error`.
    pub fn fail_with(&self, error: TransportError) {
        *lock(&self.failure) = Some(error);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn get_response(&self, url: &str) -> MockResponse {
        if let Some((_, response)) = lock(&self.routes)
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
        {
            return response.clone();
        }

        let mut responses = lock(&self.responses);
        if responses.is_empty() {
            lock(&self.default_response)
                .clone()
                .unwrap_or_else(|| MockResponse::error(500, "No mock response configured"))
        } else {
            responses.remove(0)
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });

        if let Some(error) = lock(&self.failure).take() {
            return Err(error);
        }

        let response = self.get_response(&request.url);
        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}
