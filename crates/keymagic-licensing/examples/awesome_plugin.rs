//! Awesome Plugin: a host extension wiring in the license manager.
//!
//! The plugin owns a top level "Awesome" menu, hands the manager its store,
//! licensing client and nonce source, and lets the manager attach a
//! "License" page under that menu plus a daily license check.
//!
//! ```text
//! AWESOME_STORE_URL=https://store.example cargo run -p keymagic-licensing --example awesome_plugin
//! ```

use keymagic_core::ports::{EventScheduler, HookCallback, HookRegistry};
use keymagic_core::{ActionRegistry, FormSubmission, HookContext, MenuPage, Result};
use keymagic_licensing::{
    ClientConfig, EddClient, HashNonces, LicenseManager, ManagerConfig, install,
};
use keymagic_scheduler::HookScheduler;
use keymagic_settings::MemoryStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MENU_SLUG: &str = "awesome-plugin";

/// The host plugin.
struct AwesomePlugin {
    updater: Option<Arc<LicenseManager>>,
}

struct AwesomeMenu;

#[async_trait::async_trait]
impl HookCallback for AwesomeMenu {
    fn name(&self) -> &str {
        "awesome_menu"
    }

    async fn call(&self, ctx: &mut HookContext) -> Result<()> {
        ctx.menu_pages.push(MenuPage {
            parent_slug: String::new(),
            page_title: "Awesome".to_string(),
            menu_title: "Awesome".to_string(),
            capability: "manage_options".to_string(),
            menu_slug: MENU_SLUG.to_string(),
        });
        Ok(())
    }
}

impl AwesomePlugin {
    fn new(registry: &ActionRegistry, store_url: &str) -> Result<Self> {
        registry.add_action("admin_menu", 10, Arc::new(AwesomeMenu));

        let api = Arc::new(EddClient::new(ClientConfig::new(store_url))?);
        let updater = install(
            ManagerConfig {
                prefix: "awesome".to_string(),
                menu_slug: Some(MENU_SLUG.to_string()),
                api_url: store_url.to_string(),
                version: "1.0.0".to_string(),
                item_name: "Awesome Plugin".to_string(),
                author: "CGD Inc.".to_string(),
                site_url: "https://awesome.example".to_string(),
            },
            Arc::new(MemoryStore::new()),
            api,
            Arc::new(HashNonces::new("awesome-site-secret")),
            registry,
        );

        Ok(Self { updater })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store_url =
        std::env::var("AWESOME_STORE_URL").unwrap_or_else(|_| "https://store.example".to_string());

    let registry = Arc::new(ActionRegistry::new());
    let plugin = AwesomePlugin::new(&registry, &store_url)?;
    let Some(manager) = plugin.updater else {
        return Err("license manager is disabled".into());
    };

    // Plugin activation: install the daily check.
    let scheduler = HookScheduler::new(Arc::clone(&registry));
    manager.set_license_check_cron(&scheduler).await?;
    if let Some(next) = scheduler.next_scheduled(&manager.check_license_hook()).await {
        println!("Next license check: {next}");
    }

    // Admin page load.
    let mut ctx = HookContext::new();
    registry.do_action("admin_menu", &mut ctx).await;
    for page in &ctx.menu_pages {
        println!("Menu: {} -> {} ({})", page.parent_slug, page.menu_title, page.menu_slug);
    }

    // License form submission.
    let form = FormSubmission::new()
        .with(manager.field_name("license_key"), "DEMO-KEY-0000")
        .with(manager.nonce_field(), manager.nonce());
    let mut ctx = HookContext::with_form(form);
    registry.do_action("admin_init", &mut ctx).await;
    for notice in &ctx.notices {
        println!("Notice: {}", notice.text());
    }

    let page = manager.license_page().await?;
    println!("{}", page.title);
    match page.status {
        Some(line) => println!("  {}: {}", line.status, line.message),
        None => println!("  No status yet"),
    }

    manager.unset_license_check_cron(&scheduler).await?;
    scheduler.shutdown();
    Ok(())
}
