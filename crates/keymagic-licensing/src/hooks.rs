//! Hook bindings and scheduling of the daily license check.

use crate::manager::{LicenseManager, ManagerConfig};
use crate::updater::PluginUpdater;
use async_trait::async_trait;
use keymagic_core::ports::{
    EventScheduler, HookCallback, HookRegistry, LicensingApi, NonceVerifier, SettingsStore,
};
use keymagic_core::{HookContext, Recurrence, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ADMIN_INIT: &str = "admin_init";
pub const ADMIN_MENU: &str = "admin_menu";

/// Callbacks a manager registers with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerHook {
    UpdaterInit,
    AdminMenu,
    SaveSettings,
    CheckLicense,
}

impl ManagerHook {
    fn name(&self) -> &'static str {
        match self {
            ManagerHook::UpdaterInit => "updater_init",
            ManagerHook::AdminMenu => "admin_menu",
            ManagerHook::SaveSettings => "save_settings",
            ManagerHook::CheckLicense => "check_license",
        }
    }
}

struct HookBinding {
    manager: Arc<LicenseManager>,
    hook: ManagerHook,
    name: String,
}

#[async_trait]
impl HookCallback for HookBinding {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, ctx: &mut HookContext) -> Result<()> {
        let manager = &self.manager;

        match self.hook {
            ManagerHook::UpdaterInit => {
                let config = manager.config();
                let updater = PluginUpdater::new(
                    manager.api(),
                    &config.item_name,
                    &config.version,
                    manager.license_key().await?,
                    &config.author,
                    &config.site_url,
                );
                ctx.updaters.push(Arc::new(updater));
            }
            ManagerHook::AdminMenu => {
                if let Some(page) = manager.menu_page() {
                    ctx.menu_pages.push(page);
                }
            }
            ManagerHook::SaveSettings => {
                let Some(form) = ctx.form.as_ref() else {
                    return Ok(());
                };
                let notices = manager.save_settings(form).await?;
                for notice in notices {
                    ctx.notify(manager.item_name(), notice);
                }
            }
            ManagerHook::CheckLicense => match manager.refresh_and_persist().await {
                Ok(check) => debug!(status = ?check.status(), "Scheduled license check done"),
                Err(e) if e.is_remote() => {
                    warn!(error = %e, "Scheduled license check failed, keeping previous status");
                }
                Err(e) => return Err(e),
            },
        }

        Ok(())
    }
}

impl LicenseManager {
    /// Hook fired by the scheduler for the daily check.
    pub fn check_license_hook(&self) -> String {
        format!("{}_check_license", self.prefix())
    }

    /// Register this manager's callbacks with the host.
    pub fn register_hooks(self: &Arc<Self>, registry: &dyn HookRegistry) {
        let bind = |hook: ManagerHook| -> Arc<dyn HookCallback> {
            Arc::new(HookBinding {
                manager: Arc::clone(self),
                hook,
                name: format!("{}{}", self.prefix(), hook.name()),
            })
        };

        // Updater first so it sees the key before anything else runs.
        registry.add_action(ADMIN_INIT, 0, bind(ManagerHook::UpdaterInit));

        if self.config().menu_slug.is_some() {
            registry.add_action(ADMIN_MENU, 11, bind(ManagerHook::AdminMenu));
        }

        registry.add_action(ADMIN_INIT, 10, bind(ManagerHook::SaveSettings));
        registry.add_action(&self.check_license_hook(), 10, bind(ManagerHook::CheckLicense));

        info!(prefix = %self.prefix(), "License hooks registered");
    }

    /// (Re)schedule the daily license check.
    pub async fn set_license_check_cron(&self, scheduler: &dyn EventScheduler) -> Result<()> {
        self.unset_license_check_cron(scheduler).await?;
        scheduler
            .schedule_event(&self.check_license_hook(), Recurrence::Daily)
            .await
    }

    pub async fn unset_license_check_cron(&self, scheduler: &dyn EventScheduler) -> Result<()> {
        scheduler
            .clear_scheduled_hook(&self.check_license_hook())
            .await
    }
}

/// Build a manager and register its hooks. A bad configuration is logged by
/// [`LicenseManager::new`] and leaves the host without a manager.
pub fn install(
    config: ManagerConfig,
    store: Arc<dyn SettingsStore>,
    api: Arc<dyn LicensingApi>,
    nonces: Arc<dyn NonceVerifier>,
    registry: &dyn HookRegistry,
) -> Option<Arc<LicenseManager>> {
    let manager = Arc::new(LicenseManager::new(config, store, api, nonces).ok()?);
    manager.register_hooks(registry);
    Some(manager)
}
