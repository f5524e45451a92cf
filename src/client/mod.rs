//! ServicesCloud API client.
//!
//! Provides the facade giving access to every service behind the gateway.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::auth::{ApiKeyAuth, AuthenticatedTransport};
use crate::config::{EnvLookup, ServicesCloudConfig, ServicesCloudConfigBuilder};
use crate::errors::{ServicesCloudError, ServicesCloudResult};
use crate::services::{
    Office2PdfClient, Pdf2ImgClient, Pdf2TxtClient, ServiceClient, WatermarkerClient,
};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Health of every service, keyed by service name.
///
/// Produced fresh by each [`ServicesCloudClient::check_services_health`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServicesHealth {
    services: Vec<(&'static str, bool)>,
}

impl ServicesHealth {
    fn push(&mut self, service: &'static str, healthy: bool) {
        self.services.push((service, healthy));
    }

    /// Returns the health of one service.
    pub fn get(&self, service: &str) -> Option<bool> {
        self.services
            .iter()
            .find(|(name, _)| *name == service)
            .map(|(_, healthy)| *healthy)
    }

    /// Iterates over the services in check order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.services.iter().copied()
    }

    /// Number of services checked.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if no service was checked.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns true if every service is healthy.
    pub fn all_healthy(&self) -> bool {
        self.services.iter().all(|(_, healthy)| *healthy)
    }

    /// Converts to a map.
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.iter()
            .map(|(name, healthy)| (name.to_string(), healthy))
            .collect()
    }
}

/// The ServicesCloud client.
///
/// Holds one authenticated transport shared by the sub-clients. Each
/// sub-client is created on first access and reused afterwards.
///
/// # Example
///
/// ```rust,no_run
/// use services_cloud_client::{Document, Pdf2TxtOptions, ServicesCloudClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ServicesCloudClient::builder()
///         .api_key("your_api_key")
///         .build()?;
///
///     let text = client
///         .pdf2txt()
///         .extract(Document::pdf(std::fs::read("file.pdf")?), Pdf2TxtOptions::default())
///         .await?;
///     println!("{:?}", text.as_text());
///     Ok(())
/// }
/// ```
pub struct ServicesCloudClient {
    config: ServicesCloudConfig,
    transport: Arc<dyn HttpTransport>,
    office2pdf: OnceCell<Office2PdfClient>,
    pdf2img: OnceCell<Pdf2ImgClient>,
    pdf2txt: OnceCell<Pdf2TxtClient>,
    watermarker: OnceCell<WatermarkerClient>,
}

impl ServicesCloudClient {
    /// Creates a new client builder.
    pub fn builder() -> ServicesCloudClientBuilder {
        ServicesCloudClientBuilder::new()
    }

    /// Creates a client, falling back to the environment for missing values.
    ///
    /// `api_key` defaults to `SERVICES_CLOUD_API_KEY`, `api_url` to
    /// `SERVICES_CLOUD_API_URL` then the EU gateway, and `transport` to a
    /// reqwest transport.
    pub fn new(
        api_key: Option<&str>,
        api_url: Option<&str>,
        transport: Option<Arc<dyn HttpTransport>>,
    ) -> ServicesCloudResult<Self> {
        let mut builder = ServicesCloudClientBuilder::new();
        if let Some(api_key) = api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(api_url) = api_url {
            builder = builder.api_url(api_url);
        }
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        builder.build()
    }

    /// Creates a client from environment variables.
    pub fn from_env() -> ServicesCloudResult<Self> {
        ServicesCloudClientBuilder::new().build()
    }

    /// Creates a client from an API key.
    pub fn from_api_key(api_key: impl Into<String>) -> ServicesCloudResult<Self> {
        ServicesCloudClientBuilder::new().api_key(api_key).build()
    }

    fn service<'a, C: ServiceClient>(&'a self, slot: &'a OnceCell<C>) -> &'a C {
        slot.get_or_init(|| {
            let url = self.config.service_url(&C::DESCRIPTOR);
            tracing::debug!(service = C::DESCRIPTOR.name, url = %url, "Creating service client");
            C::new(url, Arc::clone(&self.transport))
        })
    }

    /// Returns the office2pdf client.
    pub fn office2pdf(&self) -> &Office2PdfClient {
        self.service(&self.office2pdf)
    }

    /// Returns the pdf2img client.
    pub fn pdf2img(&self) -> &Pdf2ImgClient {
        self.service(&self.pdf2img)
    }

    /// Returns the pdf2txt client.
    pub fn pdf2txt(&self) -> &Pdf2TxtClient {
        self.service(&self.pdf2txt)
    }

    /// Returns the watermarker client.
    pub fn watermarker(&self) -> &WatermarkerClient {
        self.service(&self.watermarker)
    }

    /// Checks the health of every service, in a fixed order.
    #[instrument(skip(self))]
    pub async fn check_services_health(&self) -> ServicesHealth {
        let mut health = ServicesHealth::default();
        health.push(
            Office2PdfClient::DESCRIPTOR.name,
            self.office2pdf().check_service_health().await,
        );
        health.push(
            Pdf2ImgClient::DESCRIPTOR.name,
            self.pdf2img().check_service_health().await,
        );
        health.push(
            Pdf2TxtClient::DESCRIPTOR.name,
            self.pdf2txt().check_service_health().await,
        );
        health.push(
            WatermarkerClient::DESCRIPTOR.name,
            self.watermarker().check_service_health().await,
        );

        tracing::info!(all_healthy = health.all_healthy(), "Checked services health");
        health
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServicesCloudConfig {
        &self.config
    }

    /// Returns the authenticated transport shared by the sub-clients.
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }
}

impl std::fmt::Debug for ServicesCloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicesCloudClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for the ServicesCloud client.
pub struct ServicesCloudClientBuilder {
    config_builder: ServicesCloudConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ServicesCloudClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: ServicesCloudConfigBuilder::new(),
            transport: None,
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self
    }

    /// Sets the API URL.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_url(api_url);
        self
    }

    /// Sets the request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Replaces the environment lookup used for fallbacks.
    pub fn env_lookup(mut self, env: EnvLookup) -> Self {
        self.config_builder = self.config_builder.env_lookup(env);
        self
    }

    /// Sets the transport the authenticated transport delegates to.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> ServicesCloudResult<ServicesCloudClient> {
        let config = self.config_builder.build()?;

        let inner: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(config.timeout).map_err(|e| {
                ServicesCloudError::configuration(e.to_string())
            })?),
        };

        let transport: Arc<dyn HttpTransport> = Arc::new(AuthenticatedTransport::new(
            inner,
            ApiKeyAuth::from_string(config.api_key()),
        ));

        Ok(ServicesCloudClient {
            config,
            transport,
            office2pdf: OnceCell::new(),
            pdf2img: OnceCell::new(),
            pdf2txt: OnceCell::new(),
            watermarker: OnceCell::new(),
        })
    }
}

impl Default for ServicesCloudClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_ENV, API_URL_ENV};
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;

    fn no_env() -> EnvLookup {
        Arc::new(|_| None)
    }

    fn client_with(mock: &Arc<MockTransport>) -> ServicesCloudClient {
        ServicesCloudClient::builder()
            .api_key("sc_test_key")
            .api_url("https://example.com")
            .env_lookup(no_env())
            .transport(mock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_api_key_is_configuration_error() {
        let result = ServicesCloudClient::builder()
            .api_key("")
            .env_lookup(no_env())
            .build();
        assert!(matches!(result, Err(ServicesCloudError::Configuration { .. })));
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let result = ServicesCloudClient::builder().env_lookup(no_env()).build();
        assert!(matches!(result, Err(ServicesCloudError::Configuration { .. })));
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = ServicesCloudClient::builder()
            .api_key("key")
            .api_url("not a url")
            .env_lookup(no_env())
            .build();
        assert!(matches!(result, Err(ServicesCloudError::Configuration { .. })));
    }

    #[test]
    fn test_env_fallback() {
        let env: EnvLookup = Arc::new(|name| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            API_URL_ENV => Some("https://env.example.com/".to_string()),
            _ => None,
        });
        let client = ServicesCloudClient::builder()
            .env_lookup(env)
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();

        assert_eq!(client.config().api_key(), "env-key");
        assert_eq!(
            client.pdf2img().base_url(),
            "https://env.example.com/pdf2img/v1/"
        );
    }

    #[test]
    fn test_accessor_returns_cached_instance() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        assert!(std::ptr::eq(client.office2pdf(), client.office2pdf()));
        assert!(std::ptr::eq(client.pdf2img(), client.pdf2img()));
        assert!(std::ptr::eq(client.pdf2txt(), client.pdf2txt()));
        assert!(std::ptr::eq(client.watermarker(), client.watermarker()));
    }

    #[test]
    fn test_service_urls() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        assert_eq!(client.office2pdf().base_url(), "https://example.com/office2pdf/v1/");
        assert_eq!(client.pdf2img().base_url(), "https://example.com/pdf2img/v1/");
        assert_eq!(client.pdf2txt().base_url(), "https://example.com/pdf2txt/v1/");
        assert_eq!(
            client.watermarker().base_url(),
            "https://example.com/watermarker/v1/"
        );
    }

    #[test]
    fn test_sub_clients_share_transport() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        assert!(Arc::ptr_eq(client.office2pdf().transport(), client.transport()));
        assert!(Arc::ptr_eq(client.watermarker().transport(), client.transport()));
    }

    #[test]
    fn test_concurrent_first_access_creates_one_instance() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| client.pdf2txt() as *const Pdf2TxtClient as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_requests_carry_api_key() {
        let mock = Arc::new(MockTransport::new());
        mock.set_default(MockResponse::healthy());
        let client = client_with(&mock);

        client.check_services_health().await;

        let requests = mock.requests();
        assert_eq!(requests.len(), 4);
        for request in requests {
            assert_eq!(request.header("X-Api-Key"), Some("sc_test_key"));
        }
    }

    #[tokio::test]
    async fn test_check_services_health_mixed() {
        let mock = Arc::new(MockTransport::new());
        mock.route("/pdf2img/v1/health", MockResponse::error(503, "Service unavailable"));
        mock.set_default(MockResponse::healthy());
        let client = client_with(&mock);

        let health = client.check_services_health().await;

        assert_eq!(
            health.iter().collect::<Vec<_>>(),
            vec![
                ("office2pdf", true),
                ("pdf2img", false),
                ("pdf2txt", true),
                ("watermarker", true),
            ]
        );
        assert!(!health.all_healthy());
        assert_eq!(health.get("pdf2img"), Some(false));
        assert_eq!(health.get("unknown"), None);
    }

    #[tokio::test]
    async fn test_check_services_health_is_not_cached() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let first = client.check_services_health().await;
        mock.set_default(MockResponse::healthy());
        let second = client.check_services_health().await;

        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|(_, healthy)| !healthy));
        assert!(second.all_healthy());
        assert_eq!(mock.request_count(), 8);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("sc_test_key"));
    }
}
