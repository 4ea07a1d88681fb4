//! Admin notices raised by license operations.

use crate::status::ActivationError;
use serde::{Deserialize, Serialize};

/// How a notice is presented to the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Updated,
    Error,
}

/// Notice shown to the administrator after a form submission or a license
/// lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "error", rename_all = "snake_case")]
pub enum AdminNotice {
    SettingsSaved,
    LicenseValid,
    LicenseInvalid,
    ActivationFailed(ActivationError),
    DeactivationFailed,
    Deactivated,
}

impl AdminNotice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            AdminNotice::SettingsSaved | AdminNotice::LicenseValid | AdminNotice::Deactivated => {
                NoticeKind::Updated
            }
            AdminNotice::LicenseInvalid
            | AdminNotice::ActivationFailed(_)
            | AdminNotice::DeactivationFailed => NoticeKind::Error,
        }
    }

    /// Render the notice text for the licensed product `item_name`.
    pub fn message(&self, item_name: &str) -> String {
        match self {
            AdminNotice::SettingsSaved => {
                format!("{item_name} license settings saved successfully.")
            }
            AdminNotice::LicenseValid => format!("{item_name} license successfully activated."),
            AdminNotice::LicenseInvalid => format!(
                "{item_name} license activation was not successful. \
                 Please check your key status below for more information."
            ),
            AdminNotice::ActivationFailed(err) => {
                format!("{item_name} license activation failed: {}", err.message())
            }
            AdminNotice::DeactivationFailed => format!(
                "{item_name} license deactivation failed. Please try again, or contact support."
            ),
            AdminNotice::Deactivated => format!("{item_name} license deactivated successfully."),
        }
    }
}
