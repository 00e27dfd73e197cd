//! In-memory port doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use relaydash_domain::client::ClientConnection;
use relaydash_domain::credentials::{CredentialDomain, Credentials, RotationToken};
use relaydash_domain::error::DashError;
use relaydash_domain::phone::Phone;
use relaydash_domain::reply::ActionReply;
use serde_json::{Value, json};

use crate::ports::{RelayApi, SessionStore, Slot};

/// How a scripted endpoint fails.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unauthorized,
    Status(u16),
    Network,
}

impl Failure {
    fn into_error(self) -> DashError {
        match self {
            Self::Unauthorized => DashError::Unauthorized,
            Self::Status(status) => DashError::Http {
                status,
                message: format!("HTTP {status}"),
            },
            Self::Network => DashError::Network("connection refused".into()),
        }
    }
}

/// A scripted relay recording every call it receives.
pub struct FakeRelay {
    pub phones: Mutex<Result<Vec<Phone>, Failure>>,
    pub clients: Mutex<Result<Vec<ClientConnection>, Failure>>,
    pub rotate_reply: Mutex<Result<Value, Failure>>,
    pub restart_reply: Mutex<Result<Value, Failure>>,
    pub status: Mutex<Result<(), Failure>>,
    pub set_reply: Mutex<Result<Value, Failure>>,
    /// Artificial latency applied to `/phones`.
    pub phones_delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,
    pub seen_auth: Mutex<Vec<Option<Credentials>>>,
    pub seen_tokens: Mutex<Vec<Option<String>>>,
    pub saved: Mutex<Vec<(CredentialDomain, Credentials)>>,
}

impl Default for FakeRelay {
    fn default() -> Self {
        Self {
            phones: Mutex::new(Ok(Vec::new())),
            clients: Mutex::new(Ok(Vec::new())),
            rotate_reply: Mutex::new(Ok(json!({"ok": true, "changed": []}))),
            restart_reply: Mutex::new(Ok(json!({"ok": true}))),
            status: Mutex::new(Ok(())),
            set_reply: Mutex::new(Ok(json!({"ok": true}))),
            phones_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            seen_auth: Mutex::new(Vec::new()),
            seen_tokens: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRelay {
    pub fn with_phones(phones: Vec<Phone>) -> Self {
        let relay = Self::default();
        *relay.phones.lock().unwrap() = Ok(phones);
        relay
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == name)
            .count()
    }

    pub fn last_auth(&self) -> Option<Credentials> {
        self.seen_auth.lock().unwrap().last().cloned().flatten()
    }

    fn record(&self, name: &str, auth: Option<&Credentials>) {
        self.calls.lock().unwrap().push(name.to_string());
        self.seen_auth.lock().unwrap().push(auth.cloned());
    }
}

impl RelayApi for FakeRelay {
    async fn fetch_phones(&self, auth: Option<&Credentials>) -> Result<Vec<Phone>, DashError> {
        self.record("phones", auth);
        let delay = *self.phones_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.phones.lock().unwrap().clone();
        result.map_err(Failure::into_error)
    }

    async fn fetch_clients(
        &self,
        auth: Option<&Credentials>,
    ) -> Result<Vec<ClientConnection>, DashError> {
        self.record("clients", auth);
        let result = self.clients.lock().unwrap().clone();
        result.map_err(Failure::into_error)
    }

    async fn rotate(
        &self,
        token: Option<&RotationToken>,
        auth: Option<&Credentials>,
    ) -> Result<ActionReply, DashError> {
        self.record("rotate", auth);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(token.map(|t| t.as_str().to_string()));
        let result = self.rotate_reply.lock().unwrap().clone();
        result
            .map(|body| ActionReply::from_value(&body))
            .map_err(Failure::into_error)
    }

    async fn restart(&self, auth: Option<&Credentials>) -> Result<ActionReply, DashError> {
        self.record("restart", auth);
        let result = self.restart_reply.lock().unwrap().clone();
        result
            .map(|body| ActionReply::from_value(&body))
            .map_err(Failure::into_error)
    }

    async fn probe_status(&self, auth: Option<&Credentials>) -> Result<(), DashError> {
        self.record("status", auth);
        let result = *self.status.lock().unwrap();
        result.map_err(Failure::into_error)
    }

    async fn get_credentials(
        &self,
        domain: CredentialDomain,
        auth: Option<&Credentials>,
    ) -> Result<Value, DashError> {
        self.record("get_credentials", auth);
        Ok(json!({"user": format!("{domain}-user"), "pass": "***"}))
    }

    async fn set_credentials(
        &self,
        domain: CredentialDomain,
        credentials: &Credentials,
        auth: Option<&Credentials>,
    ) -> Result<ActionReply, DashError> {
        self.record("set_credentials", auth);
        let result = self.set_reply.lock().unwrap().clone();
        let reply = result
            .map(|body| ActionReply::from_value(&body))
            .map_err(Failure::into_error)?;
        self.saved
            .lock()
            .unwrap()
            .push((domain, credentials.clone()));
        Ok(reply)
    }
}

/// Session store backed by a map.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn with(slot: Slot, value: &str) -> Self {
        let store = Self::default();
        store.set(slot, value).unwrap();
        store
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, DashError> {
        Ok(self.slots.lock().unwrap().get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), DashError> {
        self.slots
            .lock()
            .unwrap()
            .insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), DashError> {
        self.slots.lock().unwrap().remove(&slot);
        Ok(())
    }
}
