//! Recurring hook scheduler for keymagic.
//!
//! Stands in for the host's cron: each scheduled hook gets a tokio task that
//! sleeps until the next fire time and then runs the hook on an
//! [`ActionRegistry`](keymagic_core::ActionRegistry).

pub mod recurrence;
pub mod scheduler;

pub use recurrence::{next_fire, parse_recurrence};
pub use scheduler::HookScheduler;
