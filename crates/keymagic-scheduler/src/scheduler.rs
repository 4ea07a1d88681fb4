//! Hook scheduler running on the tokio runtime.

use crate::recurrence::{next_fire, parse_recurrence};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use dashmap::DashMap;
use keymagic_core::ports::EventScheduler;
use keymagic_core::{ActionRegistry, Error, HookContext, Recurrence, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct ScheduledHook {
    recurrence: Recurrence,
    next_rx: watch::Receiver<Option<DateTime<Utc>>>,
    handle: JoinHandle<()>,
}

/// Fires scheduled hooks on an [`ActionRegistry`].
pub struct HookScheduler {
    registry: Arc<ActionRegistry>,
    hooks: DashMap<String, ScheduledHook>,
    shutdown_tx: watch::Sender<bool>,
}

impl HookScheduler {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            registry,
            hooks: DashMap::new(),
            shutdown_tx,
        }
    }

    /// Hooks currently scheduled, sorted by name.
    pub fn scheduled(&self) -> Vec<(String, Recurrence)> {
        let mut hooks: Vec<_> = self
            .hooks
            .iter()
            .map(|e| (e.key().clone(), e.value().recurrence.clone()))
            .collect();
        hooks.sort_by(|a, b| a.0.cmp(&b.0));
        hooks
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stop every scheduled hook. Later schedule requests are refused.
    pub fn shutdown(&self) {
        info!(hooks = self.hooks.len(), "Scheduler shutting down");
        self.shutdown_tx.send_replace(true);
        self.hooks.clear();
    }

    fn spawn(
        &self,
        hook: String,
        schedule: Schedule,
    ) -> (JoinHandle<()>, watch::Receiver<Option<DateTime<Utc>>>) {
        let (next_tx, next_rx) = watch::channel(next_fire(&schedule, Utc::now()));
        let registry = Arc::clone(&self.registry);
        let mut shutdown = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            while !*shutdown.borrow_and_update() {
                let Some(next) = next_fire(&schedule, Utc::now()) else {
                    warn!(hook = %hook, "Schedule has no upcoming fire time");
                    break;
                };
                let _ = next_tx.send(Some(next));

                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                debug!(hook = %hook, next = %next, "Waiting for next run");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        let mut ctx = HookContext::new();
                        let ran = registry.do_action(&hook, &mut ctx).await;
                        info!(hook = %hook, callbacks = ran, "Scheduled hook fired");
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!(hook = %hook, "Scheduled hook stopped");
                            break;
                        }
                    }
                }
            }
            let _ = next_tx.send(None);
        });

        (handle, next_rx)
    }
}

#[async_trait]
impl EventScheduler for HookScheduler {
    async fn schedule_event(&self, hook: &str, recurrence: Recurrence) -> Result<()> {
        if self.is_shut_down() {
            return Err(Error::Schedule(format!(
                "cannot schedule {}: scheduler is shut down",
                hook
            )));
        }
        let schedule = parse_recurrence(&recurrence)?;

        if let Some((_, previous)) = self.hooks.remove(hook) {
            previous.handle.abort();
            debug!(hook = %hook, "Replacing existing schedule");
        }

        let (handle, next_rx) = self.spawn(hook.to_string(), schedule);
        info!(hook = %hook, recurrence = ?recurrence, "Hook scheduled");

        self.hooks.insert(
            hook.to_string(),
            ScheduledHook {
                recurrence,
                next_rx,
                handle,
            },
        );
        Ok(())
    }

    async fn clear_scheduled_hook(&self, hook: &str) -> Result<()> {
        if let Some((_, scheduled)) = self.hooks.remove(hook) {
            scheduled.handle.abort();
            info!(hook = %hook, "Hook unscheduled");
        }
        Ok(())
    }

    async fn next_scheduled(&self, hook: &str) -> Option<DateTime<Utc>> {
        self.hooks.get(hook).and_then(|s| *s.next_rx.borrow())
    }
}

impl Drop for ScheduledHook {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
