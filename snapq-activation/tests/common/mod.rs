//! Shared test helpers for activation tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rsa::RsaPrivateKey;
use snapq_activation::{ActivationStore, LicenseIssuer};
use snapq_license::SigningKeyProvider;
use std::sync::{Arc, OnceLock};

static TEST_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

/// Returns the shared test RSA private key (generated once per binary).
pub fn test_private_key() -> RsaPrivateKey {
    TEST_KEY
        .get_or_init(|| {
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate test key")
        })
        .clone()
}

/// Returns a signing key provider over the shared test key.
pub fn test_provider() -> SigningKeyProvider {
    SigningKeyProvider::from_key(test_private_key())
}

/// Builds an issuer over the given store.
pub fn issuer_with(store: Arc<dyn ActivationStore>) -> LicenseIssuer {
    LicenseIssuer::new(test_provider(), store)
}

/// Shorthand date constructor.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
