//! License manager: key lifecycle and persisted status.

use keymagic_core::ports::{LicensingApi, NonceVerifier, SettingsStore};
use keymagic_core::{
    ActivationError, AdminNotice, ApiAction, ApiRequest, ApiResponse, Error, KeyStatus,
    LicenseRecord, Result, key_prefix, scoped_key,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Store field holding the serialized [`LicenseRecord`].
pub const RECORD_FIELD: &str = "license";
pub const LICENSE_KEY_FIELD: &str = "license_key";
pub const KEY_STATUS_FIELD: &str = "key_status";

/// Everything a host passes when wiring the manager in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Short prefix keeping this product's settings apart from others.
    pub prefix: String,
    /// Parent menu to attach the "License" page to. `None` adds no page.
    #[serde(default)]
    pub menu_slug: Option<String>,
    /// Store URL hosting the licensing endpoint.
    pub api_url: String,
    /// Installed product version.
    pub version: String,
    /// Product name as known to the store.
    pub item_name: String,
    #[serde(default)]
    pub author: String,
    /// URL of the site the key is activated for.
    pub site_url: String,
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(Error::Configuration("No prefix specified".to_string()));
        }

        let missing: Vec<&str> = [
            ("api_url", &self.api_url),
            ("version", &self.version),
            ("item_name", &self.item_name),
            ("site_url", &self.site_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            )));
        }

        url::Url::parse(&self.api_url).map_err(|e| {
            Error::Configuration(format!("Invalid api_url {:?}: {}", self.api_url, e))
        })?;

        Ok(())
    }
}

/// Lifecycle action requested from the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseAction {
    Activate,
    Deactivate,
}

/// Result of an activation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    /// The service reported the key as invalid.
    Invalid,
    /// The service refused the activation with an error code.
    Rejected(ActivationError),
}

impl ActivationOutcome {
    fn from_response(response: &ApiResponse) -> Result<Self> {
        if let Some(code) = response.error.as_deref() {
            return Ok(ActivationOutcome::Rejected(ActivationError::from_code(code)));
        }

        Ok(match response.license_field()? {
            "invalid" => ActivationOutcome::Invalid,
            _ => ActivationOutcome::Activated,
        })
    }

    pub fn notice(&self) -> AdminNotice {
        match self {
            ActivationOutcome::Activated => AdminNotice::LicenseValid,
            ActivationOutcome::Invalid => AdminNotice::LicenseInvalid,
            ActivationOutcome::Rejected(err) => AdminNotice::ActivationFailed(err.clone()),
        }
    }
}

/// Result of a deactivation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationOutcome {
    Deactivated,
    Failed,
}

impl DeactivationOutcome {
    fn from_response(response: &ApiResponse) -> Result<Self> {
        Ok(match response.license_field()? {
            "failed" => DeactivationOutcome::Failed,
            _ => DeactivationOutcome::Deactivated,
        })
    }

    pub fn notice(&self) -> AdminNotice {
        match self {
            DeactivationOutcome::Deactivated => AdminNotice::Deactivated,
            DeactivationOutcome::Failed => AdminNotice::DeactivationFailed,
        }
    }
}

/// Status details returned by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCheck {
    pub status: KeyStatus,
    pub expires: Option<String>,
    pub activations_left: Option<String>,
}

/// Result of a status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCheck {
    /// No key entered; nothing was sent.
    NoKey,
    Checked(LicenseCheck),
}

impl StatusCheck {
    pub fn status(&self) -> Option<KeyStatus> {
        match self {
            StatusCheck::NoKey => None,
            StatusCheck::Checked(check) => Some(check.status),
        }
    }
}

/// License key manager for one product.
pub struct LicenseManager {
    config: ManagerConfig,
    prefix: String,
    store: Arc<dyn SettingsStore>,
    api: Arc<dyn LicensingApi>,
    nonces: Arc<dyn NonceVerifier>,
}

impl LicenseManager {
    /// Create a manager. An invalid configuration is logged and returned as
    /// an error; the host then leaves the manager out.
    pub fn new(
        config: ManagerConfig,
        store: Arc<dyn SettingsStore>,
        api: Arc<dyn LicensingApi>,
        nonces: Arc<dyn NonceVerifier>,
    ) -> Result<Self> {
        if let Err(e) = config.validate() {
            error!(prefix = %config.prefix, error = %e, "License manager disabled");
            return Err(e);
        }

        let prefix = format!("{}_", config.prefix.trim());
        info!(prefix = %prefix, item_name = %config.item_name, "License manager ready");

        Ok(Self {
            config,
            prefix,
            store,
            api,
            nonces,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Settings prefix, including its trailing underscore.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn item_name(&self) -> &str {
        &self.config.item_name
    }

    pub(crate) fn nonces(&self) -> &dyn NonceVerifier {
        self.nonces.as_ref()
    }

    pub(crate) fn api(&self) -> Arc<dyn LicensingApi> {
        Arc::clone(&self.api)
    }

    fn key(&self, field: &str) -> String {
        scoped_key(&self.prefix, field)
    }

    /// Load the persisted record, falling back to the split key/status
    /// layout written by older installs.
    pub async fn load_record(&self) -> Result<LicenseRecord> {
        if let Some(raw) = self.store.get(&self.key(RECORD_FIELD)).await? {
            let mut record: LicenseRecord = serde_json::from_str(&raw)?;
            record.license_key = record.license_key.trim().to_string();
            return Ok(record);
        }

        let legacy_key = self.store.get(&self.key(LICENSE_KEY_FIELD)).await?;
        let legacy_status = self.store.get(&self.key(KEY_STATUS_FIELD)).await?;
        if legacy_key.is_some() || legacy_status.is_some() {
            debug!(prefix = %self.prefix, "Loading license from legacy settings");
        }

        Ok(LicenseRecord::from_legacy(
            legacy_key.as_deref(),
            legacy_status.as_deref(),
        ))
    }

    /// Persist the record as a single write.
    pub async fn save_record(&self, record: &mut LicenseRecord) -> Result<()> {
        record.bump();
        let raw = serde_json::to_string(record)?;
        self.store.set(&self.key(RECORD_FIELD), &raw).await?;
        debug!(prefix = %self.prefix, revision = record.revision, "License record saved");
        Ok(())
    }

    /// Persisted license key, trimmed. Empty when none was entered.
    pub async fn license_key(&self) -> Result<String> {
        Ok(self.load_record().await?.license_key)
    }

    pub async fn key_status(&self) -> Result<Option<KeyStatus>> {
        Ok(self.load_record().await?.key_status)
    }

    /// Read a setting. The license fields come from the record.
    pub async fn get_field_value(&self, setting: &str) -> Result<Option<String>> {
        match setting {
            LICENSE_KEY_FIELD => {
                let key = self.license_key().await?;
                Ok((!key.is_empty()).then_some(key))
            }
            KEY_STATUS_FIELD => Ok(self.key_status().await?.map(|s| s.as_str().to_string())),
            RECORD_FIELD => Err(Error::ReadOnlySetting(setting.to_string())),
            other => self.store.get(&self.key(other)).await,
        }
    }

    /// Write a setting. `key_status` only ever comes from the licensing
    /// service and the record itself is only written whole, so both are
    /// rejected here.
    pub async fn set_field_value(&self, setting: &str, value: &str) -> Result<()> {
        match setting {
            LICENSE_KEY_FIELD => {
                let mut record = self.load_record().await?;
                record.set_license_key(value);
                self.save_record(&mut record).await
            }
            KEY_STATUS_FIELD | RECORD_FIELD => Err(Error::ReadOnlySetting(setting.to_string())),
            other => self.store.set(&self.key(other), value).await,
        }
    }

    fn request(&self, action: ApiAction, key: &str, item_name: &str, site_url: &str) -> ApiRequest {
        ApiRequest::new(action, key.trim(), item_name, site_url)
    }

    /// Bind `key` to `site_url`, then re-check the persisted key and store
    /// its status. The re-check uses the configured item name and site URL.
    pub async fn activate(
        &self,
        key: &str,
        item_name: &str,
        site_url: &str,
    ) -> Result<ActivationOutcome> {
        info!(key_prefix = key_prefix(key.trim()), item_name = %item_name, "Activating license");

        let response = self
            .api
            .call(&self.request(ApiAction::ActivateLicense, key, item_name, site_url))
            .await?;
        let outcome = ActivationOutcome::from_response(&response);

        match &outcome {
            Ok(ActivationOutcome::Activated) => info!("License activated"),
            Ok(other) => warn!(outcome = ?other, "License activation refused"),
            Err(e) => warn!(error = %e, "Activation response not understood"),
        }

        self.refresh_after_change().await?;
        outcome
    }

    /// Release the activation of `key` for `site_url`, then re-check the
    /// persisted key and store its status.
    pub async fn deactivate(
        &self,
        key: &str,
        item_name: &str,
        site_url: &str,
    ) -> Result<DeactivationOutcome> {
        info!(key_prefix = key_prefix(key.trim()), item_name = %item_name, "Deactivating license");

        let response = self
            .api
            .call(&self.request(ApiAction::DeactivateLicense, key, item_name, site_url))
            .await?;
        let outcome = DeactivationOutcome::from_response(&response);

        if let Ok(DeactivationOutcome::Failed) = outcome {
            warn!("License deactivation failed");
        }

        self.refresh_after_change().await?;
        outcome
    }

    /// Ask the service for the status of `key`. An empty key is answered
    /// with [`StatusCheck::NoKey`] without a request.
    pub async fn check_status(
        &self,
        key: &str,
        item_name: &str,
        site_url: &str,
    ) -> Result<StatusCheck> {
        let key = key.trim();
        if key.is_empty() {
            debug!("No license key entered, skipping status check");
            return Ok(StatusCheck::NoKey);
        }

        let response = self
            .api
            .call(&self.request(ApiAction::CheckLicense, key, item_name, site_url))
            .await?;

        let raw = response.license_field()?;
        let status: KeyStatus = raw.parse().map_err(Error::UnexpectedResponse)?;
        debug!(key_prefix = key_prefix(key), status = %status, "License status checked");

        Ok(StatusCheck::Checked(LicenseCheck {
            status,
            expires: response.expires.clone(),
            activations_left: response.activations_left.as_ref().map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }))
    }

    /// Check the persisted key and store the result.
    pub async fn refresh_and_persist(&self) -> Result<StatusCheck> {
        let key = self.license_key().await?;
        self.persist_check(&key, &self.config.item_name, &self.config.site_url)
            .await
    }

    /// Run a check for `key` and store the status if `key` is still the
    /// persisted key once the answer arrives.
    async fn persist_check(&self, key: &str, item_name: &str, site_url: &str) -> Result<StatusCheck> {
        let check = self.check_status(key, item_name, site_url).await?;

        if let StatusCheck::Checked(details) = &check {
            let mut record = self.load_record().await?;
            if record.license_key != key.trim() {
                debug!("License key changed during check, status not stored");
                return Ok(check);
            }

            record.apply_status(details.status, details.expires.clone());
            self.save_record(&mut record).await?;
            info!(status = %details.status, "License status stored");
        }

        Ok(check)
    }

    /// Re-check the persisted key after a lifecycle change. Remote failures
    /// keep the previous status; store failures are returned.
    async fn refresh_after_change(&self) -> Result<()> {
        match self.refresh_and_persist().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_remote() => {
                warn!(error = %e, "Status refresh failed, keeping previous status");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Activate or deactivate the persisted key and describe the result.
    pub async fn manage_license_activation(&self, action: LicenseAction) -> Result<AdminNotice> {
        let key = self.license_key().await?;
        let item_name = &self.config.item_name;
        let site_url = &self.config.site_url;

        Ok(match action {
            LicenseAction::Activate => self.activate(&key, item_name, site_url).await?.notice(),
            LicenseAction::Deactivate => {
                self.deactivate(&key, item_name, site_url).await?.notice()
            }
        })
    }
}
