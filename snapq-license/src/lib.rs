//! License core for SnapQ activation.
//!
//! This crate is the pure, stateless half of the activation system:
//! - Canonical payload encoding/decoding (the exact bytes that get signed)
//! - RSA private key loading from PEM configuration
//! - RSASSA-PSS/SHA-256 signing and token verification
//!
//! # Token format
//!
//! `pkg=<id>;mid=<id>;exp=<date>[;plan=<tag>]|<base64 signature>`
//!
//! The part before the last `|` is the canonical payload; the signature
//! covers exactly those bytes. Signing is salted, so repeated signing of
//! the same payload yields different tokens that all verify.
//!
//! Activation bookkeeping (the one-license-per-package rule) lives in
//! `snapq-activation`; this crate has no mutable state.

mod error;
mod key;
mod payload;
mod token;

pub use error::{LicenseError, LicenseResult};
pub use key::{verifying_key_from_pem, SigningKeyProvider, VerifyingKey, PRIVATE_KEY_ENV};
pub use payload::LicensePayload;
pub use token::{verify_token, SignedLicense};
