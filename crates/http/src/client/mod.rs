//! Storefront HTTP client

pub mod auth;
pub mod error;
pub mod request;

pub use error::ClientError;
pub use request::PendingRequest;

use reqwest::{Client, ClientBuilder, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use storefront_core::StorefrontConfig;

const USER_AGENT: &str = concat!("storefront-client/", env!("CARGO_PKG_VERSION"));

/// Storefront API client.
///
/// Holds no credentials; callers pass the bearer token per request so the
/// session layer stays the single owner of the token.
#[derive(Clone, Debug)]
pub struct StorefrontClient {
    client: Client,
    base_url: String,
}

impl StorefrontClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a client from the shared configuration
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(config.api_base_url.clone())
            .timeout(config.request_timeout())
            .build()
    }

    /// Create a new client builder
    pub fn builder() -> StorefrontClientBuilder {
        StorefrontClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder, attaching the bearer token when given
    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Execute a request and handle common errors.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<T>`
    /// work for endpoints that answer 204.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let body = if text.trim().is_empty() { "null" } else { &text };
            Ok(serde_json::from_str(body)?)
        } else {
            Err(ClientError::from_status(status, &text))
        }
    }

    /// Issue a described request with the given bearer token
    pub async fn send<T: DeserializeOwned>(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let mut request = self.request(pending.method.clone(), &pending.path, token);
        if !pending.query.is_empty() {
            request = request.query(&pending.query);
        }
        if let Some(body) = &pending.body {
            request = request.json(body);
        }
        tracing::debug!(method = %pending.method, path = %pending.path, "Sending request");
        self.execute(request).await
    }
}

/// Builder for StorefrontClient
#[derive(Default)]
pub struct StorefrontClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl StorefrontClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<StorefrontClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder =
            client_builder.user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));

        let client = client_builder.build()?;

        Ok(StorefrontClient { client, base_url })
    }
}
