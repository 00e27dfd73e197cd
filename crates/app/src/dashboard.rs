//! Composition of the dashboard use-cases around one shared state.
//!
//! [`Dashboard`] is what a presentation layer holds: it wires the auth gate,
//! fetcher, action dispatcher and settings service to the same
//! [`StateCell`] and exposes the filter and render operations.

use std::sync::Arc;
use std::time::Duration;

use relaydash_domain::credentials::CredentialDomain;
use relaydash_domain::filter::FilterField;
use relaydash_domain::notification::Notification;
use relaydash_domain::time::Timestamp;
use tokio::sync::watch;

use crate::poller::Poller;
use crate::ports::{RelayApi, SessionStore};
use crate::services::actions::{ActionDispatcher, ActionOutcome};
use crate::services::auth_gate::AuthGate;
use crate::services::fetcher::{Fetcher, RefreshReport};
use crate::services::settings::SettingsService;
use crate::state::{DashboardState, StateCell};
use crate::view::{DashboardView, render};

/// The admin dashboard: state, services and view derivation.
pub struct Dashboard<A, S> {
    api: Arc<A>,
    state: StateCell,
    auth: Arc<AuthGate<S>>,
    fetcher: Arc<Fetcher<A, S>>,
    actions: ActionDispatcher<A, S>,
    settings: SettingsService<A, S>,
}

impl<A, S> Dashboard<A, S>
where
    A: RelayApi + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    /// Build a dashboard talking to `api` and persisting into `store`.
    pub fn new(api: Arc<A>, store: Arc<S>) -> Self {
        let state = StateCell::default();
        let auth = Arc::new(AuthGate::new(Arc::clone(&store), state.clone()));
        let fetcher = Arc::new(Fetcher::new(
            Arc::clone(&api),
            Arc::clone(&auth),
            state.clone(),
        ));
        let actions = ActionDispatcher::new(
            Arc::clone(&api),
            Arc::clone(&store),
            Arc::clone(&auth),
            Arc::clone(&fetcher),
            state.clone(),
        );
        let settings =
            SettingsService::new(Arc::clone(&api), store, Arc::clone(&auth), state.clone());
        Self {
            api,
            state,
            auth,
            fetcher,
            actions,
            settings,
        }
    }

    #[must_use]
    pub fn state(&self) -> &StateCell {
        &self.state
    }

    #[must_use]
    pub fn auth(&self) -> &AuthGate<S> {
        &self.auth
    }

    #[must_use]
    pub fn fetcher(&self) -> &Fetcher<A, S> {
        &self.fetcher
    }

    #[must_use]
    pub fn actions(&self) -> &ActionDispatcher<A, S> {
        &self.actions
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService<A, S> {
        &self.settings
    }

    /// A poller refreshing this dashboard every `period`.
    #[must_use]
    pub fn poller(&self, period: Duration) -> Poller<A, S> {
        Poller::new(Arc::clone(&self.fetcher), self.state.clone(), period)
    }

    /// Refresh both resources once.
    pub async fn refresh(&self) -> RefreshReport {
        self.fetcher.refresh_all().await
    }

    /// Set one filter field. The view is recomputed from cached data.
    pub fn set_filter(&self, field: FilterField, value: &str) {
        self.state.update(|s| s.filter.set(field, value));
    }

    /// Clear every filter field.
    pub fn reset_filters(&self) {
        self.state.update(|s| s.filter.reset());
    }

    /// Derive the current view.
    #[must_use]
    pub fn view(&self, now: Timestamp) -> DashboardView {
        self.state.read(|s| render(s, now))
    }

    /// Receiver woken on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Log in with new panel credentials.
    pub async fn login(&self, user: &str, pass: &str) -> Notification {
        self.auth.login(self.api.as_ref(), user, pass).await
    }

    /// Probe the relay with the stored login.
    pub async fn ensure_authenticated(&self) -> bool {
        self.auth.ensure_authenticated(self.api.as_ref()).await
    }

    pub async fn rotate(&self) -> ActionOutcome {
        self.actions.rotate().await
    }

    pub async fn restart(&self) -> ActionOutcome {
        self.actions.restart().await
    }

    pub async fn save_credentials(
        &self,
        domain: CredentialDomain,
        user: &str,
        pass: &str,
    ) -> ActionOutcome {
        self.actions.save_credentials(domain, user, pass).await
    }
}
