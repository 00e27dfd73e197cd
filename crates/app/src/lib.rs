//! # relaydash-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RelayApi`: the relay's HTTP API (phones, clients, rotate, restart, auth)
//!   - `SessionStore`: persisted panel login and rotation token
//! - Hold the explicit **application state** (`DashboardState`) in a watch
//!   channel so every render reads a consistent snapshot
//! - Derive the declarative **view description** from state (pure)
//! - Provide the use-cases: fetcher, action dispatcher, auth gate, settings
//! - Drive periodic refreshes with an in-flight guard (poller)
//!
//! ## Dependency rule
//! Depends on `relaydash-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dashboard;
pub mod in_flight;
pub mod poller;
pub mod ports;
pub mod services;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
