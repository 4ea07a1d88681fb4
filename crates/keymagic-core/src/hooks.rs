//! In-process hook registry and the context passed to hook callbacks.

use crate::notice::AdminNotice;
use crate::ports::{HookCallback, HookRegistry, UpdateCheck};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Raw fields posted by an admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub fields: BTreeMap<String, String>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// Sub-page a callback asks the host to add to its admin menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPage {
    pub parent_slug: String,
    pub page_title: String,
    pub menu_title: String,
    pub capability: String,
    pub menu_slug: String,
}

/// Notice together with the product that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedNotice {
    pub item_name: String,
    pub notice: AdminNotice,
}

impl PostedNotice {
    pub fn text(&self) -> String {
        self.notice.message(&self.item_name)
    }
}

/// State shared by the callbacks of one hook invocation.
#[derive(Default)]
pub struct HookContext {
    /// Form posted with the current admin request, if any.
    pub form: Option<FormSubmission>,
    pub notices: Vec<PostedNotice>,
    pub menu_pages: Vec<MenuPage>,
    pub updaters: Vec<Arc<dyn UpdateCheck>>,
}

impl HookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: FormSubmission) -> Self {
        Self {
            form: Some(form),
            ..Self::default()
        }
    }

    pub fn notify(&mut self, item_name: &str, notice: AdminNotice) {
        self.notices.push(PostedNotice {
            item_name: item_name.to_string(),
            notice,
        });
    }
}

struct Registration {
    priority: i32,
    seq: u64,
    callback: Arc<dyn HookCallback>,
}

/// Hook registry running callbacks in priority order, then registration
/// order.
#[derive(Default)]
pub struct ActionRegistry {
    hooks: DashMap<String, Vec<Registration>>,
    seq: AtomicU64,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback registered for `hook`. Callback errors are logged
    /// and do not stop the remaining callbacks. Returns how many ran.
    pub async fn do_action(&self, hook: &str, ctx: &mut HookContext) -> usize {
        let callbacks: Vec<Arc<dyn HookCallback>> = match self.hooks.get(hook) {
            Some(registrations) => registrations
                .iter()
                .map(|r| Arc::clone(&r.callback))
                .collect(),
            None => {
                debug!(hook = %hook, "No callbacks registered");
                return 0;
            }
        };

        for callback in &callbacks {
            debug!(hook = %hook, callback = %callback.name(), "Running hook callback");
            if let Err(e) = callback.call(ctx).await {
                warn!(hook = %hook, callback = %callback.name(), error = %e, "Hook callback failed");
            }
        }

        callbacks.len()
    }

    /// Names of the callbacks registered for `hook`, in run order.
    pub fn callbacks(&self, hook: &str) -> Vec<String> {
        self.hooks
            .get(hook)
            .map(|r| r.iter().map(|r| r.callback.name().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

impl HookRegistry for ActionRegistry {
    fn add_action(&self, hook: &str, priority: i32, callback: Arc<dyn HookCallback>) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        debug!(hook = %hook, priority, callback = %callback.name(), "Registering hook callback");

        let mut entry = self.hooks.entry(hook.to_string()).or_default();
        entry.push(Registration {
            priority,
            seq,
            callback,
        });
        entry.sort_by_key(|r| (r.priority, r.seq));
    }

    fn has_action(&self, hook: &str) -> bool {
        self.hooks.get(hook).is_some_and(|r| !r.is_empty())
    }
}
