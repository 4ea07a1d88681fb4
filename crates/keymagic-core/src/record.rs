//! Persisted license record.
//!
//! The key and its status are written together as one JSON document so a
//! reader never sees a key without the status that belongs to it.

use crate::status::KeyStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema of [`LicenseRecord`].
pub const RECORD_SCHEMA: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Record schema version.
    #[serde(default = "default_schema")]
    pub schema: u32,
    /// Incremented on every write.
    #[serde(default)]
    pub revision: u64,
    /// License key as entered, trimmed.
    #[serde(default)]
    pub license_key: String,
    /// Status from the last successful check, if any.
    #[serde(default)]
    pub key_status: Option<KeyStatus>,
    /// When the status was last confirmed by the licensing service.
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
    /// Expiry reported by the licensing service ("lifetime" or a date).
    #[serde(default)]
    pub expires: Option<String>,
}

fn default_schema() -> u32 {
    RECORD_SCHEMA
}

impl Default for LicenseRecord {
    fn default() -> Self {
        Self {
            schema: RECORD_SCHEMA,
            revision: 0,
            license_key: String::new(),
            key_status: None,
            checked_at: None,
            expires: None,
        }
    }
}

impl LicenseRecord {
    /// Build a record from the legacy layout where key and status were stored
    /// as two unrelated settings.
    pub fn from_legacy(license_key: Option<&str>, key_status: Option<&str>) -> Self {
        Self {
            license_key: license_key.map(str::trim).unwrap_or_default().to_string(),
            key_status: key_status.and_then(|s| s.trim().parse().ok()),
            ..Self::default()
        }
    }

    pub fn has_key(&self) -> bool {
        !self.license_key.trim().is_empty()
    }

    pub fn set_license_key(&mut self, key: &str) {
        self.license_key = key.trim().to_string();
    }

    /// Apply a status confirmed by the licensing service.
    pub fn apply_status(&mut self, status: KeyStatus, expires: Option<String>) {
        self.key_status = Some(status);
        self.expires = expires;
        self.checked_at = Some(Utc::now());
    }

    /// Advance the revision before a write.
    pub fn bump(&mut self) {
        self.schema = RECORD_SCHEMA;
        self.revision += 1;
    }
}
