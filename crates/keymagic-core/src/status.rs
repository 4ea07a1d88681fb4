//! License key statuses, activation error codes and API actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a license key for the current site, as reported by the
/// licensing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Invalid,
    Expired,
    Inactive,
    Disabled,
    SiteInactive,
    Valid,
}

impl KeyStatus {
    pub const ALL: [KeyStatus; 6] = [
        KeyStatus::Invalid,
        KeyStatus::Expired,
        KeyStatus::Inactive,
        KeyStatus::Disabled,
        KeyStatus::SiteInactive,
        KeyStatus::Valid,
    ];

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Invalid => "invalid",
            KeyStatus::Expired => "expired",
            KeyStatus::Inactive => "inactive",
            KeyStatus::Disabled => "disabled",
            KeyStatus::SiteInactive => "site_inactive",
            KeyStatus::Valid => "valid",
        }
    }

    /// Human-readable explanation shown next to the key.
    pub fn message(&self) -> &'static str {
        match self {
            KeyStatus::Invalid => "The entered license key is not valid.",
            KeyStatus::Expired => "Your key has expired and needs to be renewed.",
            KeyStatus::Inactive => "Your license key is valid, but is not active.",
            KeyStatus::Disabled => {
                "Your license key is currently disabled. Please contact support."
            }
            KeyStatus::SiteInactive => "Your license key is valid, but not active for this site.",
            KeyStatus::Valid => "Your license key is valid and active for this site.",
        }
    }

    /// The key exists but is not bound to this site yet.
    pub fn can_activate(&self) -> bool {
        matches!(self, KeyStatus::Inactive | KeyStatus::SiteInactive)
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown key status: {s}"))
    }
}

/// Error code returned by the licensing service when an activation is
/// refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationError {
    Missing,
    Revoked,
    NoActivationsLeft,
    Expired,
    KeyMismatch,
    /// A code this client does not know about.
    Unrecognized(String),
}

impl ActivationError {
    pub fn from_code(code: &str) -> Self {
        match code {
            "missing" => ActivationError::Missing,
            "revoked" => ActivationError::Revoked,
            "no_activations_left" => ActivationError::NoActivationsLeft,
            "expired" => ActivationError::Expired,
            "key_mismatch" => ActivationError::KeyMismatch,
            other => ActivationError::Unrecognized(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ActivationError::Missing => "missing",
            ActivationError::Revoked => "revoked",
            ActivationError::NoActivationsLeft => "no_activations_left",
            ActivationError::Expired => "expired",
            ActivationError::KeyMismatch => "key_mismatch",
            ActivationError::Unrecognized(code) => code,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ActivationError::Missing => "The provided license key does not seem to exist.".into(),
            ActivationError::Revoked => {
                "The provided license key has been revoked. Please contact support.".into()
            }
            ActivationError::NoActivationsLeft => {
                "This license key has been activated the maximum number of times.".into()
            }
            ActivationError::Expired => "This license key has expired.".into(),
            ActivationError::KeyMismatch | ActivationError::Unrecognized(_) => {
                format!("An unknown error has occurred: {}", self.code())
            }
        }
    }
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Actions understood by the remote licensing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiAction {
    ActivateLicense,
    DeactivateLicense,
    CheckLicense,
    GetVersion,
}

impl ApiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiAction::ActivateLicense => "activate_license",
            ApiAction::DeactivateLicense => "deactivate_license",
            ApiAction::CheckLicense => "check_license",
            ApiAction::GetVersion => "get_version",
        }
    }
}

impl fmt::Display for ApiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
