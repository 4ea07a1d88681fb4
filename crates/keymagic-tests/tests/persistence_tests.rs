//! Settings persisted to disk across restarts.

use keymagic_core::ports::SettingsStore;
use keymagic_core::{KeyStatus, LicenseRecord, RECORD_SCHEMA};
use keymagic_licensing::ClientConfig;
use keymagic_settings::FileStore;
use keymagic_tests::{EddServer, TestSite, fixtures, open_manager};

#[tokio::test]
async fn test_key_survives_restart_trimmed() {
    let server = EddServer::start().await;
    let site = TestSite::new(&server).await.unwrap();

    site.manager.set_field_value("license_key", "  ABC123\n").await.unwrap();

    let reopened = site.reopen().await.unwrap();
    assert_eq!(reopened.license_key().await.unwrap(), "ABC123");
    assert_eq!(
        reopened.get_field_value("license_key").await.unwrap().as_deref(),
        Some("ABC123")
    );
}

#[tokio::test]
async fn test_record_written_as_one_document() {
    let server = EddServer::start().await;
    server.on("check_license", fixtures::check("valid")).await;

    let site = TestSite::new(&server).await.unwrap();
    site.manager.set_field_value("license_key", "ABC123").await.unwrap();
    site.manager.refresh_and_persist().await.unwrap();

    let stored = site.stored().unwrap();
    assert_eq!(stored.len(), 1);

    let record: LicenseRecord = serde_json::from_str(&stored["awesome__license"]).unwrap();
    assert_eq!(record.schema, RECORD_SCHEMA);
    assert_eq!(record.revision, 2);
    assert_eq!(record.license_key, "ABC123");
    assert_eq!(record.key_status, Some(KeyStatus::Valid));
}

#[tokio::test]
async fn test_status_survives_restart() {
    let server = EddServer::start().await;
    server.on("check_license", fixtures::check("expired")).await;

    let site = TestSite::new(&server).await.unwrap();
    site.manager.set_field_value("license_key", "ABC123").await.unwrap();
    site.manager.refresh_and_persist().await.unwrap();

    let reopened = site.reopen().await.unwrap();
    assert_eq!(reopened.key_status().await.unwrap(), Some(KeyStatus::Expired));

    let page = reopened.license_page().await.unwrap();
    let line = page.status.unwrap();
    assert_eq!(line.message, "Your key has expired and needs to be renewed.");
}

#[tokio::test]
async fn test_legacy_settings_are_migrated_on_write() {
    let server = EddServer::start().await;
    server.on("check_license", fixtures::check("valid")).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    {
        let store = FileStore::open(&path).await.unwrap();
        store.set("awesome__license_key", " LEGACY-KEY ").await.unwrap();
        store.set("awesome__key_status", "inactive").await.unwrap();
    }

    let manager = open_manager(&server.uri(), ClientConfig::new(server.uri()), &path)
        .await
        .unwrap();
    assert_eq!(manager.license_key().await.unwrap(), "LEGACY-KEY");
    assert_eq!(manager.key_status().await.unwrap(), Some(KeyStatus::Inactive));

    manager.refresh_and_persist().await.unwrap();

    let reopened = FileStore::open(&path).await.unwrap();
    let raw = reopened.get("awesome__license").await.unwrap().unwrap();
    let record: LicenseRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(record.license_key, "LEGACY-KEY");
    assert_eq!(record.key_status, Some(KeyStatus::Valid));
}

#[tokio::test]
async fn test_plain_settings_share_the_file() {
    let server = EddServer::start().await;
    let site = TestSite::new(&server).await.unwrap();

    site.manager.set_field_value("beta_updates", "1").await.unwrap();
    site.manager.set_field_value("license_key", "ABC123").await.unwrap();

    let stored = site.stored().unwrap();
    assert_eq!(stored["awesome__beta_updates"], "1");
    assert!(stored.contains_key("awesome__license"));

    let reopened = site.reopen().await.unwrap();
    assert_eq!(
        reopened.get_field_value("beta_updates").await.unwrap().as_deref(),
        Some("1")
    );
}
