//! Explicit application state and the cell that publishes it.
//!
//! The state is only ever replaced through [`StateCell::update`], so a render
//! always sees a complete snapshot: a list is assigned after its payload has
//! been fully decoded, never piecemeal.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::watch;

use relaydash_domain::client::ClientConnection;
use relaydash_domain::filter::ClientFilter;
use relaydash_domain::notification::Notification;
use relaydash_domain::phone::Phone;
use relaydash_domain::time::Timestamp;

/// How long a toast stays visible, in seconds.
pub const TOAST_TTL_SECS: i64 = 2;

fn toast_ttl() -> Duration {
    Duration::seconds(TOAST_TTL_SECS)
}

/// The two polled resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Phones,
    Clients,
}

impl Resource {
    /// Relay path serving the resource.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Phones => "/phones",
            Self::Clients => "/clients",
        }
    }
}

/// A notification together with its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub notification: Notification,
    pub expires_at: Timestamp,
}

impl Toast {
    /// Whether the toast should still be shown at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Everything the dashboard knows at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// Phones from the most recent successful `/phones` fetch.
    pub phones: Vec<Phone>,
    /// When `phones` was last replaced.
    pub phones_updated_at: Option<Timestamp>,
    /// Clients from the most recent successful `/clients` fetch.
    pub clients: Vec<ClientConnection>,
    /// Active client filter.
    pub filter: ClientFilter,
    /// Last failure of the phones fetch, cleared on success.
    pub phones_error: Option<String>,
    /// Last failure of the clients fetch, cleared on success.
    pub clients_error: Option<String>,
    /// Most recent notification.
    pub toast: Option<Toast>,
    /// Set when the relay rejected the stored login.
    pub login_required: bool,
}

impl DashboardState {
    /// Replace the phone list and stamp the refresh time.
    pub fn apply_phones(&mut self, phones: Vec<Phone>, now: Timestamp) {
        self.phones = phones;
        self.phones_updated_at = Some(now);
        self.phones_error = None;
    }

    /// Replace the client list.
    pub fn apply_clients(&mut self, clients: Vec<ClientConnection>) {
        self.clients = clients;
        self.clients_error = None;
    }

    /// Record a failed fetch without touching the cached data.
    pub fn record_error(&mut self, resource: Resource, message: String) {
        match resource {
            Resource::Phones => self.phones_error = Some(message),
            Resource::Clients => self.clients_error = Some(message),
        }
    }

    /// Show a notification for [`TOAST_TTL_SECS`].
    pub fn show_toast(&mut self, notification: Notification, now: Timestamp) {
        self.toast = Some(Toast {
            notification,
            expires_at: now + toast_ttl(),
        });
    }
}

/// Shared, observable holder of the [`DashboardState`].
///
/// Cloning is cheap; all clones publish to the same subscribers.
#[derive(Clone)]
pub struct StateCell {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(DashboardState::default())
    }
}

impl StateCell {
    /// Create a cell holding `initial`.
    #[must_use]
    pub fn new(initial: DashboardState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Read a value from the current state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Mutate the state and wake every subscriber.
    pub fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        self.tx.send_modify(f);
    }

    /// Receiver woken on every [`update`](Self::update).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }
}
