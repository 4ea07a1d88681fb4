//! Command handlers.

use crate::config::CliConfig;
use console::style;
use keymagic_core::ports::{EventScheduler, UpdateCheck};
use keymagic_core::{ActionRegistry, AdminNotice, Error, NoticeKind, key_prefix};
use keymagic_licensing::{
    EddClient, HashNonces, LicenseAction, LicenseManager, PluginUpdater, StatusCheck, Tone,
};
use keymagic_scheduler::HookScheduler;
use keymagic_settings::FileStore;
use std::sync::Arc;
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs to talk to the store and the settings file.
struct Session {
    manager: Arc<LicenseManager>,
    api: Arc<EddClient>,
}

async fn session(config: &CliConfig) -> Result<Session, Box<dyn std::error::Error>> {
    let store = Arc::new(FileStore::open(config.store_path()?).await?);
    let api = Arc::new(EddClient::new(config.client_config())?);
    let manager = LicenseManager::new(
        config.manager_config(),
        store,
        api.clone(),
        Arc::new(HashNonces::new(config.secret.clone())),
    )?;

    Ok(Session {
        manager: Arc::new(manager),
        api,
    })
}

fn print_notice(item_name: &str, notice: &AdminNotice) {
    let text = notice.message(item_name);
    match notice.kind() {
        NoticeKind::Updated => println!("{} {}", style("✓").green(), text),
        NoticeKind::Error => println!("{} {}", style("✗").red(), text),
    }
}

fn print_remote_failure(err: &Error) {
    println!(
        "{} Could not reach the licensing service: {}",
        style("!").yellow(),
        err
    );
    println!("  The stored status was left unchanged.");
}

fn print_check(check: &StatusCheck) {
    match check {
        StatusCheck::NoKey => println!("{} No license key entered", style("!").yellow()),
        StatusCheck::Checked(details) => {
            println!("  Status: {}", style(details.status).bold());
            println!("  {}", details.status.message());
            if let Some(expires) = &details.expires {
                println!("  Expires: {}", expires);
            }
            if let Some(left) = &details.activations_left {
                println!("  Activations left: {}", left);
            }
        }
    }
}

/// Show the stored key and status.
pub async fn status(config: &CliConfig, json: bool) -> CliResult {
    let session = session(config).await?;
    let record = session.manager.load_record().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let page = session.manager.license_page().await?;
    println!("{}", style(&page.title).bold());

    if record.license_key.is_empty() {
        println!("  Key: {}", style("not set").dim());
    } else {
        println!("  Key: {}…", key_prefix(&record.license_key));
    }

    match page.status {
        Some(line) => {
            let message = match line.tone {
                Tone::Good => style(line.message).green(),
                Tone::Bad => style(line.message).red(),
            };
            println!("  Status: {} ({})", line.status, message);
            if let Some((_, label)) = line.action.button() {
                println!("  Available: {}", label);
            }
        }
        None => println!("  Status: {}", style("unknown").dim()),
    }

    if let Some(checked_at) = record.checked_at {
        println!("  Last checked: {}", checked_at.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(expires) = record.expires {
        println!("  Expires: {}", expires);
    }

    Ok(())
}

/// Store a key, then check it.
pub async fn set_key(config: &CliConfig, key: &str) -> CliResult {
    let session = session(config).await?;
    session.manager.set_field_value("license_key", key).await?;
    println!("{} License key saved", style("✓").green());

    match session.manager.refresh_and_persist().await {
        Ok(check) => print_check(&check),
        Err(e) if e.is_remote() => print_remote_failure(&e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Activate or deactivate the stored key.
pub async fn manage(config: &CliConfig, action: LicenseAction) -> CliResult {
    let session = session(config).await?;
    let item_name = session.manager.item_name().to_string();

    match session.manager.manage_license_activation(action).await {
        Ok(notice) => print_notice(&item_name, &notice),
        Err(e) if e.is_remote() => print_remote_failure(&e),
        Err(e) => return Err(e.into()),
    }

    if let Some(status) = session.manager.key_status().await? {
        println!("  {}", status.message());
    }
    Ok(())
}

/// Check the stored key.
pub async fn check(config: &CliConfig) -> CliResult {
    let session = session(config).await?;
    match session.manager.refresh_and_persist().await {
        Ok(check) => print_check(&check),
        Err(e) if e.is_remote() => print_remote_failure(&e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Ask the store for a newer release.
pub async fn update_check(config: &CliConfig) -> CliResult {
    let session = session(config).await?;
    let manager_config = session.manager.config();
    let updater = PluginUpdater::new(
        session.api.clone(),
        &manager_config.item_name,
        &manager_config.version,
        session.manager.license_key().await?,
        &manager_config.author,
        &manager_config.site_url,
    );

    match updater.check().await? {
        Some(update) => {
            println!(
                "{} {} {} is available (installed {})",
                style("↑").cyan(),
                update.item_name,
                style(&update.new_version).bold(),
                update.current_version
            );
            if let Some(package) = update.package {
                println!("  Package: {}", package);
            }
            if let Some(homepage) = update.homepage {
                println!("  Homepage: {}", homepage);
            }
        }
        None => println!(
            "{} {} {} is up to date",
            style("✓").green(),
            manager_config.item_name,
            manager_config.version
        ),
    }
    Ok(())
}

/// Install the daily check and run until Ctrl-C.
pub async fn watch(config: &CliConfig) -> CliResult {
    let session = session(config).await?;
    let registry = Arc::new(ActionRegistry::new());
    session.manager.register_hooks(registry.as_ref());

    let scheduler = HookScheduler::new(Arc::clone(&registry));
    session.manager.set_license_check_cron(&scheduler).await?;

    let hook = session.manager.check_license_hook();
    if let Some(next) = scheduler.next_scheduled(&hook).await {
        println!(
            "{} Daily license check scheduled, next run {}",
            style("▶").cyan(),
            next.format("%Y-%m-%d %H:%M UTC")
        );
    }
    info!(hook = %hook, "Watching license");

    tokio::signal::ctrl_c().await?;

    session.manager.unset_license_check_cron(&scheduler).await?;
    scheduler.shutdown();
    println!("{} Stopped", style("■").dim());
    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> CliResult {
    println!("{}", serde_yaml::to_string(&config.redacted())?);
    println!("Config file: {}", CliConfig::config_path()?.display());
    println!("Settings file: {}", config.store_path()?.display());
    Ok(())
}

/// Set a configuration value.
pub fn set_config(key: &str, value: &str) -> CliResult {
    let mut config = CliConfig::load_file()?;
    config.set(key, value)?;
    config.save()?;
    let shown = if key == "secret" { "********" } else { value };
    println!("{} Set {} = {}", style("✓").green(), key, shown);
    Ok(())
}
