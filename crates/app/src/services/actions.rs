//! Action dispatcher: rotate, restart, and saving relay credentials.
//!
//! Every action is guarded by its own busy flag, the equivalent of a button
//! that is disabled while its request is pending. Failures never propagate:
//! each action resolves to the notification it showed.

use std::sync::Arc;

use relaydash_domain::credentials::{CredentialDomain, Credentials};
use relaydash_domain::error::DashError;
use relaydash_domain::notification::Notification;

use crate::in_flight::InFlight;
use crate::ports::{RelayApi, SessionStore};
use crate::services::auth_gate::AuthGate;
use crate::services::fetcher::Fetcher;
use crate::services::publish;
use crate::services::settings::stored_rotation_token;
use crate::state::StateCell;

/// Result of invoking an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran and showed this notification.
    Done(Notification),
    /// The same action was still pending; nothing was sent.
    Busy,
}

impl ActionOutcome {
    /// The notification shown, if the action ran.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Done(notification) => Some(notification),
            Self::Busy => None,
        }
    }
}

/// Issues relay actions and reports their outcome as toasts.
pub struct ActionDispatcher<A, S> {
    api: Arc<A>,
    store: Arc<S>,
    auth: Arc<AuthGate<S>>,
    fetcher: Arc<Fetcher<A, S>>,
    state: StateCell,
    rotating: InFlight,
    restarting: InFlight,
    saving_proxy: InFlight,
    saving_panel: InFlight,
}

impl<A, S> ActionDispatcher<A, S>
where
    A: RelayApi + Send + Sync,
    S: SessionStore + Send + Sync,
{
    pub fn new(
        api: Arc<A>,
        store: Arc<S>,
        auth: Arc<AuthGate<S>>,
        fetcher: Arc<Fetcher<A, S>>,
        state: StateCell,
    ) -> Self {
        Self {
            api,
            store,
            auth,
            fetcher,
            state,
            rotating: InFlight::new(),
            restarting: InFlight::new(),
            saving_proxy: InFlight::new(),
            saving_panel: InFlight::new(),
        }
    }

    /// Rotate outbound IPs using the stored rotation token, if any.
    ///
    /// The phone list is re-fetched after any decodable reply, successful or
    /// not, since a partial rotation may still have changed addresses. The
    /// re-fetch waits out a pending poll and never replaces the rotation toast.
    pub async fn rotate(&self) -> ActionOutcome {
        let Some(_guard) = self.rotating.try_acquire() else {
            return ActionOutcome::Busy;
        };
        let token = stored_rotation_token(self.store.as_ref());
        let credentials = self.auth.credentials();
        tracing::info!(with_token = token.is_some(), "rotating outbound IPs");

        let notification = match self.api.rotate(token.as_ref(), credentials.as_ref()).await {
            Ok(reply) => {
                let notification = if reply.ok {
                    Notification::success(format!("IP сменён у: {}", reply.changed_count()))
                } else {
                    Notification::failure(format!("Ошибка: {}", reply.error_or("rotate failed")))
                };
                let shown = publish(&self.state, notification);
                if let Err(err) = self.fetcher.reload_phones().await {
                    tracing::debug!(error = %err, "phones refresh after rotate failed");
                }
                shown
            }
            Err(err) => self.action_failed(&err),
        };
        ActionOutcome::Done(notification)
    }

    /// Ask the relay to restart itself.
    pub async fn restart(&self) -> ActionOutcome {
        let Some(_guard) = self.restarting.try_acquire() else {
            return ActionOutcome::Busy;
        };
        let credentials = self.auth.credentials();
        tracing::info!("restarting relay");

        let notification = match self.api.restart(credentials.as_ref()).await {
            Ok(reply) if reply.is_success() => {
                publish(&self.state, Notification::success("Рестарт инициирован"))
            }
            Ok(reply) => publish(
                &self.state,
                Notification::failure(format!("Ошибка: {}", reply.error_or("restart failed"))),
            ),
            Err(err) => self.action_failed(&err),
        };
        ActionOutcome::Done(notification)
    }

    /// Save proxy or panel credentials on the relay.
    ///
    /// Both fields are trimmed; when both end up empty nothing is sent. Saving
    /// a complete panel login also replaces the login used by this client.
    pub async fn save_credentials(
        &self,
        domain: CredentialDomain,
        user: &str,
        pass: &str,
    ) -> ActionOutcome {
        let flag = match domain {
            CredentialDomain::Proxy => &self.saving_proxy,
            CredentialDomain::Panel => &self.saving_panel,
        };
        let Some(_guard) = flag.try_acquire() else {
            return ActionOutcome::Busy;
        };

        let Ok(update) = Credentials::for_update(user, pass) else {
            return ActionOutcome::Done(publish(
                &self.state,
                Notification::failure("Нечего сохранять"),
            ));
        };

        let credentials = self.auth.credentials();
        tracing::info!(%domain, "saving credentials");
        let notification = match self
            .api
            .set_credentials(domain, &update, credentials.as_ref())
            .await
        {
            Ok(_) => {
                if domain == CredentialDomain::Panel && update.is_complete() {
                    if let Err(err) = self.auth.remember(&update) {
                        tracing::warn!(error = %err, "failed to store new panel login");
                    }
                }
                Notification::success(match domain {
                    CredentialDomain::Proxy => "Прокси-учётки сохранены",
                    CredentialDomain::Panel => "Учётки панели сохранены",
                })
            }
            Err(err) => {
                tracing::warn!(%domain, error = %err, "saving credentials failed");
                self.auth.observe(&err);
                Notification::failure(match domain {
                    CredentialDomain::Proxy => "Ошибка сохранения прокси-учёток",
                    CredentialDomain::Panel => "Ошибка сохранения учёток панели",
                })
            }
        };
        ActionOutcome::Done(publish(&self.state, notification))
    }

    /// Whether any action is currently pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        [
            &self.rotating,
            &self.restarting,
            &self.saving_proxy,
            &self.saving_panel,
        ]
        .iter()
        .any(|flag| flag.is_busy())
    }

    fn action_failed(&self, err: &DashError) -> Notification {
        self.auth.observe(err);
        publish(&self.state, Notification::failure(format!("Ошибка: {err}")))
    }
}
