//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rsa::RsaPrivateKey;
use snapq_license::{LicensePayload, SigningKeyProvider};
use std::sync::OnceLock;

/// Test key size. 2048-bit generation is slow, so keys are generated once
/// per test binary and cloned.
const TEST_KEY_BITS: usize = 2048;

static TEST_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
static OTHER_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

/// Returns the shared test RSA private key.
pub fn test_private_key() -> RsaPrivateKey {
    TEST_KEY
        .get_or_init(|| {
            RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS)
                .expect("generate test key")
        })
        .clone()
}

/// Returns a second, unrelated RSA private key (for wrong-key tests).
pub fn other_private_key() -> RsaPrivateKey {
    OTHER_KEY
        .get_or_init(|| {
            RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS)
                .expect("generate test key")
        })
        .clone()
}

/// Returns a signing key provider over the shared test key.
pub fn test_provider() -> SigningKeyProvider {
    SigningKeyProvider::from_key(test_private_key())
}

/// Shorthand date constructor.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A standard valid payload used across tests.
pub fn sample_payload() -> LicensePayload {
    LicensePayload::new("PKG-1", "MACHINE-A", date(2025, 1, 31), Some("pro"))
        .expect("valid payload")
}
