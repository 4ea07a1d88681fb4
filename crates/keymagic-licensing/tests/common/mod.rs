//! Shared fixtures for licensing tests.

#![allow(dead_code)]

use async_trait::async_trait;
use keymagic_core::ports::{LicensingApi, SettingsStore};
use keymagic_core::{ApiAction, ApiRequest, ApiResponse, Error, Result};
use keymagic_licensing::{HashNonces, LicenseManager, ManagerConfig};
use keymagic_settings::MemoryStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Licensing API answering from a table of canned responses per action.
#[derive(Default)]
pub struct ScriptedApi {
    responses: Mutex<HashMap<ApiAction, Result<ApiResponse>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, action: ApiAction, license: &str) {
        self.respond_with(
            action,
            ApiResponse {
                license: Some(license.to_string()),
                ..Default::default()
            },
        );
    }

    pub fn respond_with(&self, action: ApiAction, response: ApiResponse) {
        self.responses.lock().unwrap().insert(action, Ok(response));
    }

    pub fn fail(&self, action: ApiAction) {
        self.responses
            .lock()
            .unwrap()
            .insert(action, Err(Error::Transport("connection refused".to_string())));
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<ApiAction> {
        self.calls().iter().map(|c| c.action).collect()
    }
}

#[async_trait]
impl LicensingApi for ScriptedApi {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().get(&request.action) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(e)) => Err(Error::Transport(e.to_string())),
            None => Err(Error::UnexpectedResponse(format!("no script for {}", request.action))),
        }
    }
}

pub const SECRET: &str = "test-secret";

pub fn config() -> ManagerConfig {
    ManagerConfig {
        prefix: "awesome".to_string(),
        menu_slug: Some("awesome-plugin".to_string()),
        api_url: "https://store.test".to_string(),
        version: "1.0.0".to_string(),
        item_name: "Awesome Plugin".to_string(),
        author: "CGD Inc.".to_string(),
        site_url: "https://site.test".to_string(),
    }
}

pub struct Fixture {
    pub manager: Arc<LicenseManager>,
    pub api: Arc<ScriptedApi>,
    pub store: Arc<MemoryStore>,
}

pub fn fixture() -> Fixture {
    fixture_with_store(MemoryStore::new())
}

pub fn fixture_with_store(store: MemoryStore) -> Fixture {
    let api = ScriptedApi::new();
    let store = Arc::new(store);
    let manager = LicenseManager::new(
        config(),
        store.clone(),
        api.clone(),
        Arc::new(HashNonces::new(SECRET)),
    )
    .expect("valid config");

    Fixture {
        manager: Arc::new(manager),
        api,
        store,
    }
}

/// Settings store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Store("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}

pub struct FlakyFixture {
    pub manager: Arc<LicenseManager>,
    pub api: Arc<ScriptedApi>,
    pub store: Arc<FlakyStore>,
}

pub fn flaky_fixture() -> FlakyFixture {
    let api = ScriptedApi::new();
    let store = Arc::new(FlakyStore::default());
    let manager = LicenseManager::new(
        config(),
        store.clone(),
        api.clone(),
        Arc::new(HashNonces::new(SECRET)),
    )
    .expect("valid config");

    FlakyFixture {
        manager: Arc::new(manager),
        api,
        store,
    }
}
