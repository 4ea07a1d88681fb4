//! License settings page model.

use crate::manager::{LICENSE_KEY_FIELD, LicenseManager};
use keymagic_core::{KeyStatus, MenuPage, Result};
use serde::Serialize;

/// Button offered next to the key status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    Activate,
    Deactivate,
    None,
}

impl PageAction {
    /// Submit button name and label.
    pub fn button(&self) -> Option<(&'static str, &'static str)> {
        match self {
            PageAction::Activate => Some((crate::form::ACTIVATE_FLAG, "Activate Site")),
            PageAction::Deactivate => Some((crate::form::DEACTIVATE_FLAG, "Deactivate Site")),
            PageAction::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Bad,
}

/// Status row of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub status: KeyStatus,
    pub message: &'static str,
    pub action: PageAction,
    pub tone: Tone,
}

impl StatusLine {
    pub fn for_status(status: KeyStatus) -> Self {
        let (action, tone) = match status {
            KeyStatus::Inactive | KeyStatus::SiteInactive => (PageAction::Activate, Tone::Bad),
            KeyStatus::Valid => (PageAction::Deactivate, Tone::Good),
            _ => (PageAction::None, Tone::Bad),
        };

        Self {
            status,
            message: status.message(),
            action,
            tone,
        }
    }
}

/// Everything needed to draw the license settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicensePage {
    pub title: String,
    pub key_field: String,
    pub nonce_field: String,
    pub nonce: String,
    pub license_key: String,
    pub key_help: String,
    /// Absent until a status has been stored.
    pub status: Option<StatusLine>,
}

impl LicenseManager {
    pub async fn license_page(&self) -> Result<LicensePage> {
        let record = self.load_record().await?;

        Ok(LicensePage {
            title: format!("{} License Settings", self.item_name()),
            key_field: self.field_name(LICENSE_KEY_FIELD),
            nonce_field: self.nonce_field(),
            nonce: self.nonce(),
            license_key: record.license_key,
            key_help: format!("Your {} license key.", self.item_name()),
            status: record.key_status.map(StatusLine::for_status),
        })
    }

    /// Sub-page under the configured parent menu, if there is one.
    pub fn menu_page(&self) -> Option<MenuPage> {
        let parent = self.config().menu_slug.as_ref()?;
        Some(MenuPage {
            parent_slug: parent.clone(),
            page_title: format!("{} License Settings", self.item_name()),
            menu_title: "License".to_string(),
            capability: "manage_options".to_string(),
            menu_slug: format!("{}menu", self.prefix()),
        })
    }
}
