//! License settings form: field names, nonce and submission handling.

use crate::manager::{
    KEY_STATUS_FIELD, LICENSE_KEY_FIELD, LicenseAction, LicenseManager, RECORD_FIELD,
};
use keymagic_core::{AdminNotice, Error, FormSubmission, Result};
use tracing::{debug, info, warn};

/// Submit button asking for activation.
pub const ACTIVATE_FLAG: &str = "activate_key";
/// Submit button asking for deactivation.
pub const DEACTIVATE_FLAG: &str = "deactivate_key";

impl LicenseManager {
    /// Form field name for `setting`.
    pub fn field_name(&self, setting: &str) -> String {
        format!("{}_mb_setting[{}]", self.prefix(), setting)
    }

    pub fn nonce_action(&self) -> String {
        format!("save_{}_mb_settings", self.prefix())
    }

    pub fn nonce_field(&self) -> String {
        format!("{}_mb_save", self.prefix())
    }

    /// Fresh token to embed in the settings form.
    pub fn nonce(&self) -> String {
        self.nonces().create(&self.nonce_action())
    }

    /// Settings posted for this manager, as `(setting, value)` pairs.
    pub fn posted_settings(&self, form: &FormSubmission) -> Vec<(String, String)> {
        let start = format!("{}_mb_setting[", self.prefix());
        form.fields
            .iter()
            .filter_map(|(name, value)| {
                let setting = name.strip_prefix(&start)?.strip_suffix(']')?;
                (!setting.is_empty()).then(|| (setting.to_string(), value.clone()))
            })
            .collect()
    }

    /// Handle a settings form submission.
    ///
    /// Does nothing when the form carries none of this manager's settings.
    /// Otherwise the nonce must verify before anything is written. Remote
    /// failures during the follow-up activation or check are logged and
    /// leave the stored status untouched.
    pub async fn save_settings(&self, form: &FormSubmission) -> Result<Vec<AdminNotice>> {
        let settings = self.posted_settings(form);
        if settings.is_empty() {
            return Ok(Vec::new());
        }

        let action = self.nonce_action();
        let token = form.get(&self.nonce_field()).unwrap_or_default();
        if !self.nonces().verify(&action, token) {
            warn!(prefix = %self.prefix(), "Rejected settings form with a bad nonce");
            return Err(Error::InvalidNonce(action));
        }

        for (setting, value) in &settings {
            if setting == KEY_STATUS_FIELD || setting == RECORD_FIELD {
                warn!(setting = %setting, "Ignoring posted read-only setting");
                continue;
            }
            debug!(setting = %setting, "Saving setting");
            self.set_field_value(setting, value).await?;
        }

        let mut notices = Vec::new();

        let requested = if form.contains(ACTIVATE_FLAG) {
            Some(LicenseAction::Activate)
        } else if form.contains(DEACTIVATE_FLAG) {
            Some(LicenseAction::Deactivate)
        } else {
            None
        };

        match requested {
            Some(action) => match self.manage_license_activation(action).await {
                Ok(notice) => notices.push(notice),
                Err(e) if e.is_remote() => {
                    warn!(error = %e, action = ?action, "License request failed");
                }
                Err(e) => return Err(e),
            },
            None => match self.refresh_and_persist().await {
                Ok(_) => {}
                Err(e) if e.is_remote() => warn!(error = %e, "License check failed"),
                Err(e) => return Err(e),
            },
        }

        notices.push(AdminNotice::SettingsSaved);
        info!(
            prefix = %self.prefix(),
            settings = settings.len(),
            key_set = settings.iter().any(|(s, _)| s == LICENSE_KEY_FIELD),
            "License settings saved"
        );
        Ok(notices)
    }
}
