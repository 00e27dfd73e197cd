//! # relaydash-adapter-http-reqwest
//!
//! HTTP client adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `RelayApi` port defined in `relaydash-app::ports`
//! - Resolve endpoint paths against the configured API base
//! - Attach `Cache-Control: no-store` and the optional Basic header to every request
//! - Map HTTP statuses and bodies onto the domain error taxonomy
//!
//! ## Dependency rule
//! Depends on `relaydash-app` (for the port trait) and `relaydash-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod base;
mod client;
mod error;

pub use base::ApiBase;
pub use client::{HttpConfig, ReqwestRelayApi};
pub use error::HttpError;
