//! # relaydash-domain
//!
//! Pure domain model for the relay admin dashboard.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, timestamps
//! - Define **Phones** and **Client connections** as reported by the relay
//! - Define the **client filter** (three substring predicates)
//! - Humanise byte counts, rates and ages for display
//! - Encode/decode **credentials** and interpret **action replies**
//! - Extract lists from loosely-shaped JSON payloads
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod client;
pub mod credentials;
pub mod filter;
pub mod format;
pub mod notification;
pub mod payload;
pub mod phone;
pub mod reply;

mod lenient;
