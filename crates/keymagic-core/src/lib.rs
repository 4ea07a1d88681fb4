//! Keymagic Core
//!
//! Domain types, port traits and error handling shared by the keymagic
//! crates. The license manager lives in `keymagic-licensing`; everything a
//! host has to provide (settings storage, the remote licensing endpoint, the
//! hook registry, nonces, scheduling) is described here as a trait.

pub mod error;
pub mod hooks;
pub mod notice;
pub mod ports;
pub mod record;
pub mod status;

pub use error::{Error, Result};
pub use hooks::{ActionRegistry, FormSubmission, HookContext, MenuPage, PostedNotice};
pub use notice::{AdminNotice, NoticeKind};
pub use ports::{ApiRequest, ApiResponse, Recurrence, UpdateInfo};
pub use record::{LicenseRecord, RECORD_SCHEMA};
pub use status::{ActivationError, ApiAction, KeyStatus};

/// Build the store key for a setting under a caller supplied prefix.
pub fn scoped_key(prefix: &str, field: &str) -> String {
    format!("{prefix}_{field}")
}

/// First characters of a license key, safe to put in logs.
pub fn key_prefix(key: &str) -> &str {
    let end = key
        .char_indices()
        .nth(8)
        .map(|(idx, _)| idx)
        .unwrap_or(key.len());
    &key[..end]
}
