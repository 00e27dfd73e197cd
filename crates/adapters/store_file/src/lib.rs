//! # relaydash-adapter-store-file
//!
//! Session persistence in a small TOML file.
//!
//! ## Responsibilities
//! - Implement the `SessionStore` port defined in `relaydash-app::ports`
//! - Keep the panel login and the rotation token between runs
//!
//! ## Dependency rule
//! Depends on `relaydash-app` (for the port trait) and `relaydash-domain` (for the error type).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod store;

pub use error::StoreError;
pub use store::FileSessionStore;
