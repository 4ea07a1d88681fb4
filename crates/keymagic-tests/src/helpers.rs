//! Test helper functions and utilities.

use keymagic_licensing::{ClientConfig, EddClient, HashNonces, LicenseManager, ManagerConfig};
use keymagic_settings::FileStore;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "integration-secret";
pub const SITE_URL: &str = "https://awesome.test";

/// Mock EDD store answering by `edd_action`.
pub struct EddServer {
    server: MockServer,
}

impl EddServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mock_server(&self) -> &MockServer {
        &self.server
    }

    /// Answer `action` with a JSON body.
    pub async fn on(&self, action: &str, body: Value) {
        self.mount(action, ResponseTemplate::new(200).set_body_json(body))
            .await;
    }

    /// Answer `action` with an arbitrary body.
    pub async fn on_raw(&self, action: &str, body: &str) {
        self.mount(action, ResponseTemplate::new(200).set_body_string(body))
            .await;
    }

    /// Answer `action` with an empty body and `status`.
    pub async fn on_status(&self, action: &str, status: u16) {
        self.mount(action, ResponseTemplate::new(status)).await;
    }

    /// Answer `action` after `delay`.
    pub async fn on_delayed(&self, action: &str, body: Value, delay: Duration) {
        self.mount(
            action,
            ResponseTemplate::new(200).set_body_json(body).set_delay(delay),
        )
        .await;
    }

    async fn mount(&self, action: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(query_param("edd_action", action))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Drop every mounted answer and recorded request.
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// Query parameters of every request received, in order.
    pub async fn requests(&self) -> Vec<HashMap<String, String>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.query_pairs().into_owned().collect())
            .collect()
    }

    /// `edd_action` of every request received, in order.
    pub async fn actions(&self) -> Vec<String> {
        self.requests()
            .await
            .into_iter()
            .filter_map(|mut q| q.remove("edd_action"))
            .collect()
    }
}

pub fn site_config(api_url: &str) -> ManagerConfig {
    ManagerConfig {
        prefix: "awesome".to_string(),
        menu_slug: Some("awesome-plugin".to_string()),
        api_url: api_url.to_string(),
        version: "1.0.0".to_string(),
        item_name: "Awesome Plugin".to_string(),
        author: "CGD Inc.".to_string(),
        site_url: SITE_URL.to_string(),
    }
}

/// A site with its settings file in a temporary directory, talking to a
/// mock store over HTTP.
pub struct TestSite {
    pub manager: Arc<LicenseManager>,
    pub store_path: PathBuf,
    api_url: String,
    _dir: TempDir,
}

impl TestSite {
    pub async fn new(server: &EddServer) -> anyhow::Result<Self> {
        Self::with_client(server, ClientConfig::new(server.uri())).await
    }

    pub async fn with_client(server: &EddServer, client: ClientConfig) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let store_path = dir.path().join("site").join("settings.json");
        let manager = open_manager(&server.uri(), client, &store_path).await?;

        Ok(Self {
            manager,
            store_path,
            api_url: server.uri(),
            _dir: dir,
        })
    }

    /// A fresh manager over the same settings file, as after a restart.
    pub async fn reopen(&self) -> anyhow::Result<Arc<LicenseManager>> {
        open_manager(&self.api_url, ClientConfig::new(&self.api_url), &self.store_path).await
    }

    /// Raw contents of the settings file.
    pub fn stored(&self) -> anyhow::Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(&self.store_path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub async fn open_manager(
    api_url: &str,
    client: ClientConfig,
    store_path: &std::path::Path,
) -> anyhow::Result<Arc<LicenseManager>> {
    let store = Arc::new(FileStore::open(store_path).await?);
    let api = Arc::new(EddClient::new(client)?);
    let manager = LicenseManager::new(
        site_config(api_url),
        store,
        api,
        Arc::new(HashNonces::new(SECRET)),
    )?;
    Ok(Arc::new(manager))
}
