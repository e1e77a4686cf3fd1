//! Activation tracking and license issuance for SnapQ.
//!
//! This crate is the stateful half of the activation system:
//! - [`ActivationStore`]: durable package-id → activation mapping with
//!   atomic reserve-then-commit semantics ([`JsonFileStore`] on disk,
//!   [`MemoryStore`] for tests and embedding)
//! - [`LicenseIssuer`]: orchestrates check → encode → sign → record and
//!   returns the wire token
//!
//! # Exactly-once activation
//!
//! A package id activates at most once. The store's reserve step is
//! atomic, so concurrent issuance attempts for the same package id see
//! exactly one success; all others observe `AlreadyActivated`. A failed
//! commit withholds the signed token entirely. Administrative deletion is
//! the sole path back to an unactivated state.
//!
//! The pure payload/signing/verification pieces live in `snapq-license`.

mod error;
mod issuer;
mod record;
mod store;

pub use error::{ActivationError, ActivationResult};
pub use issuer::{
    default_expiration, LicenseIssuer, DEFAULT_PLAN, DEFAULT_VALIDITY_DAYS,
};
pub use record::ActivationRecord;
pub use store::{ActivationStore, JsonFileStore, MemoryStore};
