//! Configuration module for the ServicesCloud client.
//!
//! Every setting is resolved from an ordered list of sources: an explicit
//! value, then the environment, then (where one exists) a built-in default.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::{ServicesCloudError, ServicesCloudResult};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SERVICES_CLOUD_API_KEY";

/// Environment variable holding the API URL.
pub const API_URL_ENV: &str = "SERVICES_CLOUD_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "SERVICES_CLOUD_TIMEOUT";

/// EU gateway.
pub const EU_API_URL: &str = "https://services-cloud-v3-eu-byzteify.ew.gateway.dev";

/// Gateway used when no URL is configured.
pub const DEFAULT_API_URL: &str = EU_API_URL;

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed by the caller.
    Explicit,
    /// Read from an environment variable.
    Environment,
    /// Built-in default.
    Default,
}

/// Environment lookup used during resolution.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|name| std::env::var(name).ok())
}

fn non_empty_env(env: &EnvLookup, name: &str) -> Option<String> {
    env(name).filter(|value| !value.is_empty())
}

/// Resolves the API key from the explicit value, then `SERVICES_CLOUD_API_KEY`.
pub fn resolve_api_key(
    explicit: Option<String>,
    env: &EnvLookup,
) -> ServicesCloudResult<(SecretString, ConfigSource)> {
    match explicit {
        Some(key) if key.is_empty() => Err(ServicesCloudError::configuration(
            "The API key can not be empty",
        )),
        Some(key) => Ok((SecretString::new(key), ConfigSource::Explicit)),
        None => non_empty_env(env, API_KEY_ENV)
            .map(|key| (SecretString::new(key), ConfigSource::Environment))
            .ok_or_else(|| {
                ServicesCloudError::configuration(format!(
                    "The API key must be provided as an argument or configured in the {} environment variable",
                    API_KEY_ENV
                ))
            }),
    }
}

/// Resolves the API URL from the explicit value, then `SERVICES_CLOUD_API_URL`,
/// then [`DEFAULT_API_URL`].
pub fn resolve_api_url(
    explicit: Option<String>,
    env: &EnvLookup,
) -> ServicesCloudResult<(Url, ConfigSource)> {
    let (raw, source) = match explicit {
        Some(url) => (url, ConfigSource::Explicit),
        None => match env(API_URL_ENV) {
            Some(url) => (url, ConfigSource::Environment),
            None => (DEFAULT_API_URL.to_string(), ConfigSource::Default),
        },
    };

    Ok((parse_api_url(&raw)?, source))
}

/// Parses an absolute API URL and normalizes its path to end with exactly
/// one `/`. URLs with a query or fragment are rejected.
pub fn parse_api_url(raw: &str) -> ServicesCloudResult<Url> {
    let mut url = Url::parse(raw)?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ServicesCloudError::configuration(format!(
            "The API URL '{}' is not valid: an absolute URL with a host is required",
            raw
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ServicesCloudError::configuration(format!(
            "The API URL '{}' is not valid: a query or fragment is not allowed",
            raw
        )));
    }

    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);

    Ok(url)
}

/// Name and version of a service behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service name, first path segment.
    pub name: &'static str,
    /// Version segment.
    pub version: &'static str,
}

impl ServiceDescriptor {
    /// Creates a descriptor.
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }

    /// Returns `{base}/{name}/{version}/` with exactly one separator after the base.
    pub fn endpoint_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/",
            base.trim_end_matches('/'),
            self.name,
            self.version
        )
    }
}

/// Configuration for the ServicesCloud client.
#[derive(Clone)]
pub struct ServicesCloudConfig {
    api_key: SecretString,
    api_url: Url,
    /// Request timeout applied to the default transport.
    pub timeout: Duration,
}

impl ServicesCloudConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServicesCloudConfigBuilder {
        ServicesCloudConfigBuilder::new()
    }

    /// Creates a configuration from environment variables only.
    ///
    /// # Environment Variables
    ///
    /// - `SERVICES_CLOUD_API_KEY` (required): API key
    /// - `SERVICES_CLOUD_API_URL` (optional): gateway URL
    /// - `SERVICES_CLOUD_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> ServicesCloudResult<Self> {
        ServicesCloudConfigBuilder::new().build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the API key hint (last 4 characters) for debugging.
    pub fn api_key_hint(&self) -> String {
        crate::auth::key_hint(self.api_key.expose_secret())
    }

    /// Returns the gateway URL.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the endpoint URL of a service.
    pub fn service_url(&self, service: &ServiceDescriptor) -> String {
        service.endpoint_url(self.api_url.as_str())
    }
}

impl std::fmt::Debug for ServicesCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicesCloudConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for `ServicesCloudConfig`.
pub struct ServicesCloudConfigBuilder {
    api_key: Option<String>,
    api_url: Option<String>,
    timeout: Option<Duration>,
    env: EnvLookup,
}

impl ServicesCloudConfigBuilder {
    /// Creates a new configuration builder reading the process environment.
    pub fn new() -> Self {
        Self {
            api_key: None,
            api_url: None,
            timeout: None,
            env: process_env(),
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the API URL.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the environment lookup.
    pub fn env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ServicesCloudResult<ServicesCloudConfig> {
        let (api_key, key_source) = resolve_api_key(self.api_key, &self.env)?;
        let (api_url, url_source) = resolve_api_url(self.api_url, &self.env)?;

        let timeout = self.timeout.unwrap_or_else(|| {
            non_empty_env(&self.env, TIMEOUT_ENV)
                .and_then(|secs| secs.parse::<u64>().ok())
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
        });

        tracing::debug!(
            api_key_source = ?key_source,
            api_url_source = ?url_source,
            api_url = %api_url,
            "Resolved ServicesCloud configuration"
        );

        Ok(ServicesCloudConfig {
            api_key,
            api_url,
            timeout,
        })
    }
}

impl Default for ServicesCloudConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
