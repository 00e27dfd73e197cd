//! The single authentication policy applied to every request.
//!
//! When a panel login is stored, it is attached to every call as Basic auth.
//! A 401 on any call marks the login as required; polling stays paused until
//! a login succeeds.

use std::sync::Arc;

use relaydash_domain::credentials::Credentials;
use relaydash_domain::error::DashError;
use relaydash_domain::notification::Notification;

use crate::ports::{RelayApi, SessionStore, Slot};
use crate::services::publish;
use crate::state::StateCell;

/// Chooses request credentials and reacts to authentication failures.
pub struct AuthGate<S> {
    store: Arc<S>,
    state: StateCell,
}

impl<S: SessionStore> AuthGate<S> {
    /// Create a gate backed by the given session store.
    pub fn new(store: Arc<S>, state: StateCell) -> Self {
        Self { store, state }
    }

    /// Credentials to attach to the next request, if a login is stored.
    ///
    /// An unreadable or corrupt slot counts as "no login".
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let blob = match self.store.get(Slot::PanelAuth) {
            Ok(blob) => blob?,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored login");
                return None;
            }
        };
        match Credentials::decode(&blob) {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring corrupt stored login");
                None
            }
        }
    }

    /// Persist `credentials` as the login used for future requests.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Storage`] when the session store fails.
    pub fn remember(&self, credentials: &Credentials) -> Result<(), DashError> {
        self.store.set(Slot::PanelAuth, &credentials.encode())
    }

    /// Forget the stored login.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Storage`] when the session store fails.
    pub fn forget(&self) -> Result<(), DashError> {
        self.store.remove(Slot::PanelAuth)
    }

    /// React to a failed request: a 401 marks the login as required.
    pub fn observe(&self, err: &DashError) {
        if err.is_unauthorized() {
            self.require_login();
        }
    }

    /// Whether the relay rejected the current login.
    #[must_use]
    pub fn login_required(&self) -> bool {
        self.state.read(|s| s.login_required)
    }

    fn require_login(&self) {
        if !self.login_required() {
            tracing::info!("relay rejected credentials, login required");
        }
        self.state.update(|s| s.login_required = true);
    }

    /// Store a new login and verify it against `/status`.
    ///
    /// A rejected login is forgotten again. Any other failure keeps it so the
    /// next successful request can use it.
    pub async fn login<A>(&self, api: &A, user: &str, pass: &str) -> Notification
    where
        A: RelayApi + Sync,
    {
        let Ok(credentials) = Credentials::login(user, pass) else {
            return publish(
                &self.state,
                Notification::failure("Введите логин и пароль"),
            );
        };
        if let Err(err) = self.remember(&credentials) {
            return publish(&self.state, Notification::failure(format!("Ошибка: {err}")));
        }

        match api.probe_status(Some(&credentials)).await {
            Ok(()) => {
                self.state.update(|s| s.login_required = false);
                publish(&self.state, Notification::success("Вход выполнен"))
            }
            Err(DashError::Unauthorized) => {
                if let Err(err) = self.forget() {
                    tracing::warn!(error = %err, "failed to clear rejected login");
                }
                self.require_login();
                publish(&self.state, Notification::failure("Неверный логин/пароль"))
            }
            Err(err) => publish(&self.state, Notification::failure(format!("Ошибка: {err}"))),
        }
    }

    /// Probe `/status` with the stored login.
    ///
    /// Returns `false` and marks the login as required on a 401 or when the
    /// relay cannot be reached. Other statuses count as authenticated.
    pub async fn ensure_authenticated<A>(&self, api: &A) -> bool
    where
        A: RelayApi + Sync,
    {
        let credentials = self.credentials();
        match api.probe_status(credentials.as_ref()).await {
            Ok(()) => {
                self.state.update(|s| s.login_required = false);
                true
            }
            Err(err @ (DashError::Unauthorized | DashError::Network(_))) => {
                tracing::warn!(error = %err, "status probe failed");
                self.require_login();
                false
            }
            Err(err) => {
                tracing::debug!(error = %err, "status probe answered with an error");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRelay, Failure, MemoryStore};

    fn gate(store: MemoryStore) -> (AuthGate<MemoryStore>, StateCell) {
        let state = StateCell::default();
        (AuthGate::new(Arc::new(store), state.clone()), state)
    }

    #[test]
    fn should_have_no_credentials_when_store_empty() {
        let (gate, _) = gate(MemoryStore::default());
        assert!(gate.credentials().is_none());
    }

    #[test]
    fn should_decode_stored_login() {
        let blob = Credentials::new("admin", "pw").encode();
        let (gate, _) = gate(MemoryStore::with(Slot::PanelAuth, &blob));
        assert_eq!(gate.credentials(), Some(Credentials::new("admin", "pw")));
    }

    #[test]
    fn should_ignore_corrupt_login() {
        let (gate, _) = gate(MemoryStore::with(Slot::PanelAuth, "!!!"));
        assert!(gate.credentials().is_none());
    }

    #[test]
    fn should_require_login_only_on_unauthorized() {
        let (gate, state) = gate(MemoryStore::default());
        gate.observe(&DashError::Http {
            status: 500,
            message: String::new(),
        });
        assert!(!state.snapshot().login_required);
        gate.observe(&DashError::Unauthorized);
        assert!(state.snapshot().login_required);
    }

    #[tokio::test]
    async fn should_reject_login_without_password() {
        let (gate, _) = gate(MemoryStore::default());
        let relay = FakeRelay::default();
        let note = gate.login(&relay, "admin", "").await;
        assert!(note.is_failure());
        assert_eq!(note.text, "Введите логин и пароль");
        assert_eq!(relay.call_count("status"), 0);
    }

    #[tokio::test]
    async fn should_store_login_and_clear_flag_on_success() {
        let (gate, state) = gate(MemoryStore::default());
        state.update(|s| s.login_required = true);
        let relay = FakeRelay::default();

        let note = gate.login(&relay, "admin", "pw").await;

        assert!(!note.is_failure());
        assert_eq!(note.text, "Вход выполнен");
        assert!(!state.snapshot().login_required);
        assert_eq!(gate.credentials(), Some(Credentials::new("admin", "pw")));
        assert_eq!(relay.last_auth(), Some(Credentials::new("admin", "pw")));
    }

    #[tokio::test]
    async fn should_forget_rejected_login() {
        let (gate, state) = gate(MemoryStore::default());
        let relay = FakeRelay::default();
        *relay.status.lock().unwrap() = Err(Failure::Unauthorized);

        let note = gate.login(&relay, "admin", "wrong").await;

        assert_eq!(note.text, "Неверный логин/пароль");
        assert!(gate.credentials().is_none());
        assert!(state.snapshot().login_required);
    }

    #[tokio::test]
    async fn should_flag_login_when_probe_unreachable() {
        let (gate, state) = gate(MemoryStore::default());
        let relay = FakeRelay::default();
        *relay.status.lock().unwrap() = Err(Failure::Network);

        assert!(!gate.ensure_authenticated(&relay).await);
        assert!(state.snapshot().login_required);
    }

    #[tokio::test]
    async fn should_treat_other_statuses_as_authenticated() {
        let (gate, state) = gate(MemoryStore::default());
        let relay = FakeRelay::default();
        *relay.status.lock().unwrap() = Err(Failure::Status(404));

        assert!(gate.ensure_authenticated(&relay).await);
        assert!(!state.snapshot().login_required);
    }
}
