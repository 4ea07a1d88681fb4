//! Port traits (hexagonal architecture).
//!
//! These traits describe what the host environment provides to the license
//! manager. Adapters live in `keymagic-settings`, `keymagic-licensing` and
//! `keymagic-scheduler`; tests substitute their own.

use crate::hooks::HookContext;
use crate::status::ApiAction;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Persistent key/value settings storage.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a value. `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Request sent to the remote licensing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    #[serde(rename = "edd_action")]
    pub action: ApiAction,
    pub license: String,
    pub item_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ApiRequest {
    pub fn new(
        action: ApiAction,
        license: impl Into<String>,
        item_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            action,
            license: license.into(),
            item_name: item_name.into(),
            url: url.into(),
            version: None,
            author: None,
        }
    }
}

/// Decoded body of a licensing service response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: Option<bool>,
    /// Status or result string (`valid`, `invalid`, `deactivated`, `failed`, ...).
    #[serde(default)]
    pub license: Option<String>,
    /// Activation error code.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    /// Number or `"unlimited"`.
    #[serde(default)]
    pub activations_left: Option<serde_json::Value>,
    #[serde(default)]
    pub new_version: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub sections: Option<serde_json::Value>,
}

impl ApiResponse {
    /// The `license` field, required for every license action.
    pub fn license_field(&self) -> Result<&str> {
        self.license
            .as_deref()
            .ok_or_else(|| Error::UnexpectedResponse("missing `license` field".to_string()))
    }
}

/// Remote licensing endpoint.
#[async_trait]
pub trait LicensingApi: Send + Sync {
    /// Send one request. Transport problems and undecodable bodies are
    /// reported as [`Error::Transport`] / [`Error::UnexpectedResponse`].
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Callback registered against a named hook.
#[async_trait]
pub trait HookCallback: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn call(&self, ctx: &mut HookContext) -> Result<()>;
}

/// Host registry of named hooks.
pub trait HookRegistry: Send + Sync {
    /// Register `callback` for `hook`. Lower priorities run first.
    fn add_action(&self, hook: &str, priority: i32, callback: Arc<dyn HookCallback>);

    /// Whether anything is registered for `hook`.
    fn has_action(&self, hook: &str) -> bool;
}

/// Issues and verifies CSRF tokens for form submissions.
pub trait NonceVerifier: Send + Sync {
    fn create(&self, action: &str) -> String;

    fn verify(&self, action: &str, token: &str) -> bool;
}

/// How often a scheduled hook fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Hourly,
    Daily,
    /// Six or seven field cron expression (seconds first).
    Cron(String),
}

impl Recurrence {
    pub fn cron_expression(&self) -> &str {
        match self {
            Recurrence::Hourly => "0 0 * * * *",
            Recurrence::Daily => "0 0 0 * * *",
            Recurrence::Cron(expr) => expr,
        }
    }
}

/// Background scheduler firing hooks on a recurrence.
#[async_trait]
pub trait EventScheduler: Send + Sync {
    /// Schedule `hook`. Scheduling an already scheduled hook replaces it.
    async fn schedule_event(&self, hook: &str, recurrence: Recurrence) -> Result<()>;

    /// Stop firing `hook`.
    async fn clear_scheduled_hook(&self, hook: &str) -> Result<()>;

    /// Next time `hook` fires, if scheduled.
    async fn next_scheduled(&self, hook: &str) -> Option<DateTime<Utc>>;
}

/// Newer release announced by the licensing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub item_name: String,
    pub current_version: String,
    pub new_version: String,
    pub package: Option<String>,
    pub homepage: Option<String>,
    pub changelog: Option<String>,
}

/// Something able to tell whether a newer version of a product exists.
#[async_trait]
pub trait UpdateCheck: Send + Sync {
    fn item_name(&self) -> &str;

    async fn check(&self) -> Result<Option<UpdateInfo>>;
}
