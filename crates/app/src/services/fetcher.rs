//! Refreshes the cached phone and client lists.
//!
//! Each resource has its own in-flight lock: a poll requested while the
//! previous fetch of the same resource is still pending is skipped, so a slow
//! relay never accumulates overlapping requests. A reload forced by an action
//! waits for the pending fetch instead and then fetches again. A failed
//! refresh leaves the cached list untouched; the error is recorded next to
//! the resource and, for polls, shown as a toast.

use std::sync::Arc;

use tokio::sync::Mutex;

use relaydash_domain::error::DashError;
use relaydash_domain::notification::Notification;
use relaydash_domain::time::now;

use crate::ports::{RelayApi, SessionStore};
use crate::services::auth_gate::AuthGate;
use crate::services::publish;
use crate::state::{Resource, StateCell};

/// Outcome of a single refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The list was replaced with this many items.
    Updated(usize),
    /// A previous refresh of the same resource was still in flight.
    Skipped,
}

/// Outcome of refreshing both resources concurrently.
#[derive(Debug)]
pub struct RefreshReport {
    pub phones: Result<Refresh, DashError>,
    pub clients: Result<Refresh, DashError>,
}

/// Whether a failed fetch raises a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    Toast,
    Quiet,
}

/// Loads `/phones` and `/clients` into the shared state.
pub struct Fetcher<A, S> {
    api: Arc<A>,
    auth: Arc<AuthGate<S>>,
    state: StateCell,
    phones_flight: Mutex<()>,
    clients_flight: Mutex<()>,
}

impl<A, S> Fetcher<A, S>
where
    A: RelayApi + Send + Sync,
    S: SessionStore + Send + Sync,
{
    /// Create a fetcher writing into `state`.
    pub fn new(api: Arc<A>, auth: Arc<AuthGate<S>>, state: StateCell) -> Self {
        Self {
            api,
            auth,
            state,
            phones_flight: Mutex::new(()),
            clients_flight: Mutex::new(()),
        }
    }

    /// Refresh the phone list.
    ///
    /// # Errors
    ///
    /// Returns the relay error after recording it in the state.
    pub async fn refresh_phones(&self) -> Result<Refresh, DashError> {
        let Ok(_guard) = self.phones_flight.try_lock() else {
            tracing::debug!("phones refresh still in flight, skipping");
            return Ok(Refresh::Skipped);
        };
        self.load_phones(Report::Toast).await
    }

    /// Re-fetch the phone list after an action changed it.
    ///
    /// Never skipped: a pending poll is awaited and the list is fetched again
    /// afterwards. A failure only updates the error line, leaving the
    /// action's own toast in place.
    ///
    /// # Errors
    ///
    /// Returns the relay error after recording it in the state.
    pub async fn reload_phones(&self) -> Result<Refresh, DashError> {
        let _guard = self.phones_flight.lock().await;
        self.load_phones(Report::Quiet).await
    }

    async fn load_phones(&self, report: Report) -> Result<Refresh, DashError> {
        let credentials = self.auth.credentials();
        match self.api.fetch_phones(credentials.as_ref()).await {
            Ok(phones) => {
                let count = phones.len();
                self.state.update(|s| s.apply_phones(phones, now()));
                tracing::debug!(count, "phones refreshed");
                Ok(Refresh::Updated(count))
            }
            Err(err) => Err(self.fail(Resource::Phones, err, report)),
        }
    }

    /// Refresh the client list.
    ///
    /// # Errors
    ///
    /// Returns the relay error after recording it in the state.
    pub async fn refresh_clients(&self) -> Result<Refresh, DashError> {
        let Ok(_guard) = self.clients_flight.try_lock() else {
            tracing::debug!("clients refresh still in flight, skipping");
            return Ok(Refresh::Skipped);
        };
        let credentials = self.auth.credentials();
        match self.api.fetch_clients(credentials.as_ref()).await {
            Ok(clients) => {
                let count = clients.len();
                self.state.update(|s| s.apply_clients(clients));
                tracing::debug!(count, "clients refreshed");
                Ok(Refresh::Updated(count))
            }
            Err(err) => Err(self.fail(Resource::Clients, err, Report::Toast)),
        }
    }

    /// Refresh both lists concurrently.
    pub async fn refresh_all(&self) -> RefreshReport {
        let (phones, clients) = tokio::join!(self.refresh_phones(), self.refresh_clients());
        RefreshReport { phones, clients }
    }

    fn fail(&self, resource: Resource, err: DashError, report: Report) -> DashError {
        tracing::warn!(path = resource.path(), error = %err, "refresh failed");
        let message = format!("{}: {err}", resource.path());
        self.state.update(|s| s.record_error(resource, message));
        if report == Report::Toast {
            publish(&self.state, Notification::failure(format!("Ошибка: {err}")));
        }
        self.auth.observe(&err);
        err
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relaydash_domain::client::ClientConnection;
    use relaydash_domain::credentials::Credentials;
    use relaydash_domain::phone::Phone;

    use super::*;
    use crate::ports::Slot;
    use crate::testing::{FakeRelay, Failure, MemoryStore};

    type Fixture = (Arc<FakeRelay>, Fetcher<FakeRelay, MemoryStore>, StateCell);

    fn fetcher(relay: FakeRelay, store: MemoryStore) -> Fixture {
        let relay = Arc::new(relay);
        let state = StateCell::default();
        let auth = Arc::new(AuthGate::new(Arc::new(store), state.clone()));
        let fetcher = Fetcher::new(Arc::clone(&relay), auth, state.clone());
        (relay, fetcher, state)
    }

    #[tokio::test]
    async fn should_replace_phones_and_stamp_time() {
        let (_, fetcher, state) = fetcher(
            FakeRelay::with_phones(vec![Phone::new("1"), Phone::new("2")]),
            MemoryStore::default(),
        );

        let outcome = fetcher.refresh_phones().await.unwrap();

        assert_eq!(outcome, Refresh::Updated(2));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phones.len(), 2);
        assert!(snapshot.phones_updated_at.is_some());
    }

    #[tokio::test]
    async fn should_keep_cached_data_when_refresh_fails() {
        let (relay, fetcher, state) =
            fetcher(FakeRelay::with_phones(vec![Phone::new("1")]), MemoryStore::default());
        fetcher.refresh_phones().await.unwrap();
        let stamped = state.snapshot().phones_updated_at;

        *relay.phones.lock().unwrap() = Err(Failure::Status(500));
        let err = fetcher.refresh_phones().await.unwrap_err();

        assert!(matches!(err, DashError::Http { status: 500, .. }));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phones, vec![Phone::new("1")]);
        assert_eq!(snapshot.phones_updated_at, stamped);
        assert_eq!(
            snapshot.phones_error.as_deref(),
            Some("/phones: HTTP 500")
        );
        let toast = snapshot.toast.unwrap();
        assert_eq!(toast.notification.text, "Ошибка: HTTP 500");
    }

    #[tokio::test]
    async fn should_mark_login_required_on_unauthorized() {
        let relay = FakeRelay::default();
        *relay.clients.lock().unwrap() = Err(Failure::Unauthorized);
        let (_, fetcher, state) = fetcher(relay, MemoryStore::default());

        assert!(fetcher.refresh_clients().await.is_err());
        assert!(state.snapshot().login_required);
    }

    #[tokio::test]
    async fn should_send_stored_login_with_requests() {
        let blob = Credentials::new("admin", "pw").encode();
        let (relay, fetcher, _) =
            fetcher(FakeRelay::default(), MemoryStore::with(Slot::PanelAuth, &blob));

        fetcher.refresh_clients().await.unwrap();

        assert_eq!(relay.last_auth(), Some(Credentials::new("admin", "pw")));
    }

    #[tokio::test]
    async fn should_refresh_both_resources_independently() {
        let relay = FakeRelay::with_phones(vec![Phone::new("1")]);
        *relay.clients.lock().unwrap() = Err(Failure::Network);
        let (_, fetcher, state) = fetcher(relay, MemoryStore::default());

        let report = fetcher.refresh_all().await;

        assert_eq!(report.phones.unwrap(), Refresh::Updated(1));
        assert!(matches!(report.clients, Err(DashError::Network(_))));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phones.len(), 1);
        assert!(snapshot.clients_error.is_some());
        assert!(!snapshot.login_required);
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_refresh_while_previous_in_flight() {
        let relay = FakeRelay::with_phones(vec![Phone::new("1")]);
        *relay.phones_delay.lock().unwrap() = Some(Duration::from_secs(5));
        let (relay, fetcher, _) = fetcher(relay, MemoryStore::default());

        let (first, second) = tokio::join!(fetcher.refresh_phones(), async {
            tokio::task::yield_now().await;
            fetcher.refresh_phones().await
        });

        assert_eq!(first.unwrap(), Refresh::Updated(1));
        assert_eq!(second.unwrap(), Refresh::Skipped);
        assert_eq!(relay.call_count("phones"), 1);

        assert_eq!(fetcher.refresh_phones().await.unwrap(), Refresh::Updated(1));
        assert_eq!(relay.call_count("phones"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reload_after_pending_poll_instead_of_skipping() {
        let relay = FakeRelay::with_phones(vec![Phone::new("1")]);
        *relay.phones_delay.lock().unwrap() = Some(Duration::from_secs(2));
        let (relay, fetcher, _) = fetcher(relay, MemoryStore::default());

        let (poll, reload) = tokio::join!(fetcher.refresh_phones(), async {
            tokio::task::yield_now().await;
            fetcher.reload_phones().await
        });

        assert_eq!(poll.unwrap(), Refresh::Updated(1));
        assert_eq!(reload.unwrap(), Refresh::Updated(1));
        assert_eq!(relay.call_count("phones"), 2);
    }

    #[tokio::test]
    async fn should_record_reload_failure_without_toast() {
        let relay = FakeRelay::default();
        *relay.phones.lock().unwrap() = Err(Failure::Status(500));
        let (_, fetcher, state) = fetcher(relay, MemoryStore::default());

        assert!(fetcher.reload_phones().await.is_err());

        let snapshot = state.snapshot();
        assert_eq!(snapshot.phones_error.as_deref(), Some("/phones: HTTP 500"));
        assert!(snapshot.toast.is_none());
    }

    #[tokio::test]
    async fn should_replace_clients() {
        let relay = FakeRelay::default();
        *relay.clients.lock().unwrap() = Ok(vec![ClientConnection::default(); 3]);
        let (_, fetcher, state) = fetcher(relay, MemoryStore::default());

        assert_eq!(fetcher.refresh_clients().await.unwrap(), Refresh::Updated(3));
        assert_eq!(state.snapshot().clients.len(), 3);
    }
}
