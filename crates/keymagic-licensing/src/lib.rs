//! EDD Software Licensing key management for keymagic.
//!
//! [`LicenseManager`] owns a license key and its status for one product. It
//! activates, deactivates and checks the key against the remote licensing
//! service, keeps the result in the host's settings store and plugs into the
//! host through explicit hook registration.

pub mod client;
pub mod form;
pub mod hooks;
pub mod manager;
pub mod nonce;
pub mod page;
pub mod updater;

pub use client::{ClientConfig, EddClient};
pub use hooks::{ManagerHook, install};
pub use manager::{
    ActivationOutcome, DeactivationOutcome, LicenseAction, LicenseCheck, LicenseManager,
    ManagerConfig, StatusCheck,
};
pub use nonce::HashNonces;
pub use page::{LicensePage, PageAction, StatusLine, Tone};
pub use updater::{PluginUpdater, compare_versions};
