//! Periodic refresh of both resources.
//!
//! The poller is a plain scheduled task: every tick spawns a concurrent
//! refresh of phones and clients. Overlap is handled by the fetcher's
//! per-resource in-flight guards, so a slow relay skips ticks instead of
//! piling up requests. Ticks are skipped entirely while a login is required.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::ports::{RelayApi, SessionStore};
use crate::services::fetcher::Fetcher;
use crate::state::StateCell;

/// Default refresh period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(3);

/// Drives [`Fetcher::refresh_all`] on a fixed period.
pub struct Poller<A, S> {
    fetcher: Arc<Fetcher<A, S>>,
    state: StateCell,
    period: Duration,
}

impl<A, S> Poller<A, S>
where
    A: RelayApi + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<Fetcher<A, S>>, state: StateCell, period: Duration) -> Self {
        Self {
            fetcher,
            state,
            period,
        }
    }

    /// Start polling in the background. The first tick fires immediately.
    ///
    /// Aborting the returned handle stops polling; refreshes already started
    /// run to completion.
    #[must_use = "dropping the handle detaches the poller, abort it to stop polling"]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Poll forever on the current task.
    pub async fn run(self) {
        tracing::info!(period_ms = self.period.as_millis(), "poller started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }

    /// Start one background refresh of both resources.
    ///
    /// Returns `false` without issuing requests while a login is required.
    pub fn poll_once(&self) -> bool {
        if self.state.read(|s| s.login_required) {
            tracing::debug!("login required, skipping poll");
            return false;
        }
        let fetcher = Arc::clone(&self.fetcher);
        tokio::spawn(async move {
            fetcher.refresh_all().await;
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use relaydash_domain::phone::Phone;

    use super::*;
    use crate::services::auth_gate::AuthGate;
    use crate::testing::{FakeRelay, Failure, MemoryStore};

    fn poller(relay: FakeRelay) -> (Arc<FakeRelay>, Poller<FakeRelay, MemoryStore>, StateCell) {
        let relay = Arc::new(relay);
        let state = StateCell::default();
        let auth = Arc::new(AuthGate::new(Arc::new(MemoryStore::default()), state.clone()));
        let fetcher = Arc::new(Fetcher::new(Arc::clone(&relay), auth, state.clone()));
        let poller = Poller::new(fetcher, state.clone(), DEFAULT_PERIOD);
        (relay, poller, state)
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_both_resources_every_period() {
        let (relay, poller, _) = poller(FakeRelay::default());

        let handle = poller.spawn();
        tokio::time::sleep(Duration::from_millis(6_500)).await;
        handle.abort();

        assert_eq!(relay.call_count("phones"), 3);
        assert_eq!(relay.call_count("clients"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_coalesce_ticks_while_fetch_in_flight() {
        let relay = FakeRelay::with_phones(vec![Phone::new("1")]);
        *relay.phones_delay.lock().unwrap() = Some(Duration::from_secs(5));
        let (relay, poller, state) = poller(relay);

        let handle = poller.spawn();
        tokio::time::sleep(Duration::from_millis(6_500)).await;
        handle.abort();

        // ticks at 0 s, 3 s and 6 s; the 3 s phones poll found 0 s still pending
        assert_eq!(relay.call_count("phones"), 2);
        assert_eq!(relay.call_count("clients"), 3);
        assert_eq!(state.snapshot().phones.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_after_failures() {
        let relay = FakeRelay::default();
        *relay.phones.lock().unwrap() = Err(Failure::Status(500));
        let (relay, poller, state) = poller(relay);

        let handle = poller.spawn();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        handle.abort();

        assert_eq!(relay.call_count("phones"), 2);
        assert!(state.snapshot().phones_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn should_pause_while_login_required() {
        let relay = FakeRelay::default();
        *relay.clients.lock().unwrap() = Err(Failure::Unauthorized);
        let (relay, poller, state) = poller(relay);

        let handle = poller.spawn();
        tokio::time::sleep(Duration::from_millis(6_500)).await;

        assert!(state.snapshot().login_required);
        assert_eq!(relay.call_count("clients"), 1);

        state.update(|s| s.login_required = false);
        *relay.clients.lock().unwrap() = Ok(Vec::new());
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.abort();

        assert_eq!(relay.call_count("clients"), 2);
    }

    #[tokio::test]
    async fn should_refuse_single_poll_while_login_required() {
        let (relay, poller, state) = poller(FakeRelay::default());
        state.update(|s| s.login_required = true);

        assert!(!poller.poll_once());
        tokio::task::yield_now().await;
        assert_eq!(relay.call_count("phones"), 0);
    }
}
