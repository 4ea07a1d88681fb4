//! EDD Software Licensing API client.

use async_trait::async_trait;
use keymagic_core::ports::LicensingApi;
use keymagic_core::{ApiRequest, ApiResponse, Error, Result, key_prefix};
use std::time::Duration;
use tracing::{debug, warn};

/// Licensing API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store URL the licensing endpoint is served from.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify the server certificate.
    pub verify_tls: bool,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout: Duration::from_secs(15),
            verify_tls: true,
            user_agent: format!("keymagic/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }
}

/// Client for an EDD SL endpoint: HTTP GET with the request as query
/// parameters, JSON body back.
pub struct EddClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl EddClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.api_url).map_err(|e| {
            Error::Configuration(format!("Invalid licensing URL {:?}: {}", config.api_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl LicensingApi for EddClient {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        debug!(
            action = %request.action,
            key_prefix = key_prefix(&request.license),
            item_name = %request.item_name,
            "Calling licensing API"
        );

        let response = self
            .client
            .get(&self.config.api_url)
            .query(request)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, action = %request.action, "Licensing API returned an error status");
            return Err(Error::Transport(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(action = %request.action, error = %e, "Licensing API body is not JSON");
            Error::UnexpectedResponse(e.to_string())
        })
    }
}
