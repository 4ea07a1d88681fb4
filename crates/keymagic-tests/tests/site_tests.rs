//! A host site wired up through hooks, talking to the store over HTTP.

use keymagic_core::ports::{EventScheduler, UpdateCheck};
use keymagic_core::{ActionRegistry, FormSubmission, HookContext, KeyStatus, Recurrence};
use keymagic_scheduler::HookScheduler;
use keymagic_tests::{EddServer, TestSite, fixtures, init_test_logging};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_form_activation_round_trip() {
    init_test_logging();
    let server = EddServer::start().await;
    server.on("activate_license", fixtures::activated()).await;
    server.on("check_license", fixtures::check("valid")).await;
    server.on("get_version", fixtures::version("1.0.0")).await;

    let site = TestSite::new(&server).await.unwrap();
    let registry = ActionRegistry::new();
    site.manager.register_hooks(&registry);

    let manager = &site.manager;
    let form = FormSubmission::new()
        .with(manager.field_name("license_key"), "ABC123")
        .with(manager.nonce_field(), manager.nonce())
        .with("activate_key", "Activate Site");
    let mut ctx = HookContext::with_form(form);
    registry.do_action("admin_init", &mut ctx).await;

    let texts: Vec<String> = ctx.notices.iter().map(|n| n.text()).collect();
    assert_eq!(
        texts,
        vec![
            "Awesome Plugin license successfully activated.",
            "Awesome Plugin license settings saved successfully.",
        ]
    );
    assert_eq!(manager.key_status().await.unwrap(), Some(KeyStatus::Valid));
    assert_eq!(ctx.updaters.len(), 1);

    let actions = server.actions().await;
    assert_eq!(actions, vec!["activate_license", "check_license"]);
}

#[tokio::test]
async fn test_updater_sees_newer_release() {
    let server = EddServer::start().await;
    server.on("get_version", fixtures::version("1.2.0")).await;

    let site = TestSite::new(&server).await.unwrap();
    site.manager.set_field_value("license_key", "ABC123").await.unwrap();

    let registry = ActionRegistry::new();
    site.manager.register_hooks(&registry);
    let mut ctx = HookContext::new();
    registry.do_action("admin_init", &mut ctx).await;

    let updater = ctx.updaters.pop().unwrap();
    let update = updater.check().await.unwrap().unwrap();
    assert_eq!(update.current_version, "1.0.0");
    assert_eq!(update.new_version, "1.2.0");
    assert_eq!(update.changelog.as_deref(), Some("<p>Faster.</p>"));

    let requests = server.requests().await;
    assert_eq!(requests[0]["edd_action"], "get_version");
    assert_eq!(requests[0]["license"], "ABC123");
    assert_eq!(requests[0]["version"], "1.0.0");
    assert_eq!(requests[0]["author"], "CGD Inc.");
}

#[tokio::test]
async fn test_scheduled_check_refreshes_status() {
    let server = EddServer::start().await;
    server.on("check_license", fixtures::check("disabled")).await;

    let site = TestSite::new(&server).await.unwrap();
    site.manager.set_field_value("license_key", "ABC123").await.unwrap();

    let registry = Arc::new(ActionRegistry::new());
    site.manager.register_hooks(registry.as_ref());

    let scheduler = HookScheduler::new(Arc::clone(&registry));
    scheduler
        .schedule_event(
            &site.manager.check_license_hook(),
            Recurrence::Cron("* * * * * *".to_string()),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.shutdown();

    assert_eq!(
        site.manager.key_status().await.unwrap(),
        Some(KeyStatus::Disabled)
    );
    assert!(!server.actions().await.is_empty());
}

#[tokio::test]
async fn test_daily_cron_install_and_removal() {
    let server = EddServer::start().await;
    let site = TestSite::new(&server).await.unwrap();

    let registry = Arc::new(ActionRegistry::new());
    let scheduler = HookScheduler::new(Arc::clone(&registry));
    let hook = site.manager.check_license_hook();

    site.manager.set_license_check_cron(&scheduler).await.unwrap();
    site.manager.set_license_check_cron(&scheduler).await.unwrap();
    assert_eq!(scheduler.scheduled(), vec![(hook.clone(), Recurrence::Daily)]);
    assert!(scheduler.next_scheduled(&hook).await.is_some());

    site.manager.unset_license_check_cron(&scheduler).await.unwrap();
    assert!(scheduler.scheduled().is_empty());
    assert!(server.requests().await.is_empty());
}
