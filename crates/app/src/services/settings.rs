//! Settings service: the rotation token and masked credential lookups.

use std::sync::Arc;

use relaydash_domain::credentials::{CredentialDomain, RotationToken};
use relaydash_domain::notification::Notification;

use crate::ports::{RelayApi, SessionStore, Slot};
use crate::services::auth_gate::AuthGate;
use crate::services::publish;
use crate::state::StateCell;

/// Read the rotation token from `store`. Unreadable or blank values count
/// as unset.
pub(crate) fn stored_rotation_token<S: SessionStore>(store: &S) -> Option<RotationToken> {
    match store.get(Slot::RotationToken) {
        Ok(raw) => raw.and_then(|raw| RotationToken::try_from(raw).ok()),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read rotation token");
            None
        }
    }
}

/// Local settings kept in the session store, plus relay credential lookups.
pub struct SettingsService<A, S> {
    api: Arc<A>,
    store: Arc<S>,
    auth: Arc<AuthGate<S>>,
    state: StateCell,
}

impl<A, S> SettingsService<A, S>
where
    A: RelayApi + Send + Sync,
    S: SessionStore + Send + Sync,
{
    pub fn new(api: Arc<A>, store: Arc<S>, auth: Arc<AuthGate<S>>, state: StateCell) -> Self {
        Self {
            api,
            store,
            auth,
            state,
        }
    }

    /// The stored rotation token.
    #[must_use]
    pub fn rotation_token(&self) -> Option<RotationToken> {
        stored_rotation_token(self.store.as_ref())
    }

    /// Trim and store the rotation token used by future rotations.
    pub fn save_rotation_token(&self, raw: &str) -> Notification {
        let Ok(token) = RotationToken::try_from(raw) else {
            return publish(&self.state, Notification::failure("Токен пустой"));
        };
        let notification = match self.store.set(Slot::RotationToken, token.as_str()) {
            Ok(()) => Notification::success("rotate_token сохранён"),
            Err(err) => Notification::failure(format!("Ошибка: {err}")),
        };
        publish(&self.state, notification)
    }

    /// Remove the stored rotation token.
    pub fn clear_rotation_token(&self) -> Notification {
        let notification = match self.store.remove(Slot::RotationToken) {
            Ok(()) => Notification::success("rotate_token очищен"),
            Err(err) => Notification::failure(format!("Ошибка: {err}")),
        };
        publish(&self.state, notification)
    }

    /// Fetch the masked credentials of `domain` as the relay returns them.
    ///
    /// Failures are logged and yield `None`; nothing is shown to the user.
    pub async fn load_masked_credentials(
        &self,
        domain: CredentialDomain,
    ) -> Option<serde_json::Value> {
        let credentials = self.auth.credentials();
        match self.api.get_credentials(domain, credentials.as_ref()).await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::warn!(%domain, error = %err, "failed to load credentials");
                self.auth.observe(&err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRelay, MemoryStore};

    fn settings(store: MemoryStore) -> (SettingsService<FakeRelay, MemoryStore>, StateCell) {
        let store = Arc::new(store);
        let state = StateCell::default();
        let auth = Arc::new(AuthGate::new(Arc::clone(&store), state.clone()));
        let service = SettingsService::new(
            Arc::new(FakeRelay::default()),
            store,
            auth,
            state.clone(),
        );
        (service, state)
    }

    #[test]
    fn should_store_trimmed_token() {
        let (service, state) = settings(MemoryStore::default());

        let note = service.save_rotation_token("  abc  ");

        assert_eq!(note.text, "rotate_token сохранён");
        assert_eq!(service.rotation_token().unwrap().as_str(), "abc");
        assert!(state.snapshot().toast.is_some());
    }

    #[test]
    fn should_reject_blank_token() {
        let (service, _) = settings(MemoryStore::with(Slot::RotationToken, "old"));

        let note = service.save_rotation_token("   ");

        assert!(note.is_failure());
        assert_eq!(note.text, "Токен пустой");
        assert_eq!(service.rotation_token().unwrap().as_str(), "old");
    }

    #[test]
    fn should_clear_token() {
        let (service, _) = settings(MemoryStore::with(Slot::RotationToken, "old"));
        assert_eq!(service.clear_rotation_token().text, "rotate_token очищен");
        assert!(service.rotation_token().is_none());
    }

    #[tokio::test]
    async fn should_return_masked_body_as_sent() {
        let (service, _) = settings(MemoryStore::default());
        let body = service
            .load_masked_credentials(CredentialDomain::Proxy)
            .await
            .unwrap();
        assert_eq!(body["user"], "proxy-user");
    }
}
