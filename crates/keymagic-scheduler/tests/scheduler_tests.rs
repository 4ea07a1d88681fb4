//! Scheduler tests with real (short) recurrences.

use async_trait::async_trait;
use keymagic_core::ports::{EventScheduler, HookCallback, HookRegistry};
use keymagic_core::{ActionRegistry, Error, HookContext, Recurrence, Result};
use keymagic_scheduler::HookScheduler;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct Counter(Arc<AtomicUsize>);

#[async_trait]
impl HookCallback for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    async fn call(&self, _ctx: &mut HookContext) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn every_second() -> Recurrence {
    Recurrence::Cron("* * * * * *".to_string())
}

fn setup() -> (Arc<ActionRegistry>, Arc<AtomicUsize>) {
    let registry = Arc::new(ActionRegistry::new());
    let count = Arc::new(AtomicUsize::new(0));
    registry.add_action("demo_check_license", 10, Arc::new(Counter(Arc::clone(&count))));
    (registry, count)
}

#[tokio::test]
async fn test_scheduled_hook_fires() {
    let (registry, count) = setup();
    let scheduler = HookScheduler::new(registry);

    scheduler
        .schedule_event("demo_check_license", every_second())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(count.load(Ordering::SeqCst) >= 1);
    scheduler.shutdown();
}

#[tokio::test]
async fn test_cleared_hook_stops_firing() {
    let (registry, count) = setup();
    let scheduler = HookScheduler::new(registry);

    scheduler
        .schedule_event("demo_check_license", every_second())
        .await
        .unwrap();
    scheduler
        .clear_scheduled_hook("demo_check_license")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(scheduler.next_scheduled("demo_check_license").await.is_none());
}

#[tokio::test]
async fn test_daily_next_run_within_a_day() {
    let (registry, _) = setup();
    let scheduler = HookScheduler::new(registry);

    scheduler
        .schedule_event("demo_check_license", Recurrence::Daily)
        .await
        .unwrap();

    let next = scheduler
        .next_scheduled("demo_check_license")
        .await
        .expect("scheduled");
    let until = next - chrono::Utc::now();
    assert!(until > chrono::Duration::zero());
    assert!(until <= chrono::Duration::days(1));
}

#[tokio::test]
async fn test_rescheduling_replaces() {
    let (registry, _) = setup();
    let scheduler = HookScheduler::new(registry);

    scheduler
        .schedule_event("demo_check_license", Recurrence::Hourly)
        .await
        .unwrap();
    scheduler
        .schedule_event("demo_check_license", Recurrence::Daily)
        .await
        .unwrap();

    assert_eq!(
        scheduler.scheduled(),
        vec![("demo_check_license".to_string(), Recurrence::Daily)]
    );
}

#[test]
fn test_invalid_recurrence_rejected() {
    let (registry, _) = setup();
    let scheduler = HookScheduler::new(registry);

    // Parsing fails before any task is spawned, so no runtime is needed.
    let result = tokio_test::block_on(
        scheduler.schedule_event("demo_check_license", Recurrence::Cron("nope".to_string())),
    );

    let err = tokio_test::assert_err!(result);
    assert!(matches!(err, Error::Schedule(_)));
    assert!(scheduler.scheduled().is_empty());
}

#[tokio::test]
async fn test_schedule_after_shutdown_refused() {
    let (registry, count) = setup();
    let scheduler = HookScheduler::new(registry);
    scheduler.shutdown();

    let err = scheduler
        .schedule_event("demo_check_license", every_second())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Schedule(_)));
    assert!(scheduler.is_shut_down());
    assert!(scheduler.scheduled().is_empty());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
