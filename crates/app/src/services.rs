//! Application services (use-case implementations).
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod actions;
pub mod auth_gate;
pub mod fetcher;
pub mod settings;

use relaydash_domain::notification::Notification;
use relaydash_domain::time::now;

use crate::state::StateCell;

/// Show `notification` as the current toast and hand it back to the caller.
pub(crate) fn publish(state: &StateCell, notification: Notification) -> Notification {
    if notification.is_failure() {
        tracing::warn!(text = %notification.text, "operation failed");
    } else {
        tracing::info!(text = %notification.text, "operation succeeded");
    }
    let shown = notification.clone();
    state.update(|s| s.show_toast(shown, now()));
    notification
}
