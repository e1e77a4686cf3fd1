//! License issuance: check, encode, sign, record.

use crate::error::ActivationResult;
use crate::record::ActivationRecord;
use crate::store::ActivationStore;
use chrono::{Duration, NaiveDate, Utc};
use snapq_license::{LicensePayload, SignedLicense, SigningKeyProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default license validity applied by the boundary layer when the caller
/// omits an expiration date. Policy, not core logic.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Default plan tag applied by the boundary layer.
pub const DEFAULT_PLAN: &str = "pro";

/// The default expiration for a license issued on `today`.
#[must_use]
pub fn default_expiration(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_VALIDITY_DAYS)
}

/// Issues signed, machine-bound licenses and enforces exactly-once
/// activation per package id.
///
/// Constructed once at startup with an injected key provider and store;
/// safe to share across concurrent request handlers (`&self` methods,
/// the store serializes its own critical section, the key is read-only).
pub struct LicenseIssuer {
    key: SigningKeyProvider,
    store: Arc<dyn ActivationStore>,
}

impl LicenseIssuer {
    /// Creates an issuer over the given key and store.
    #[must_use]
    pub fn new(key: SigningKeyProvider, store: Arc<dyn ActivationStore>) -> Self {
        Self { key, store }
    }

    /// Issues a license for `package_id` bound to `machine_id`.
    ///
    /// The sequence is reserve → encode → sign → commit. The reservation
    /// guarantees that concurrent calls for the same package id produce
    /// exactly one success; the losers fail with
    /// [`AlreadyActivated`](crate::ActivationError::AlreadyActivated)
    /// before any key material is touched. If the commit fails the signed
    /// token is not returned — a signed-but-unrecorded license would
    /// permit unbounded re-issuance.
    ///
    /// # Errors
    ///
    /// - [`ActivationError::License`](crate::ActivationError::License)
    ///   with `InvalidField` for empty fields or reserved delimiters.
    /// - [`ActivationError::AlreadyActivated`](crate::ActivationError::AlreadyActivated)
    ///   when a record exists for `package_id`.
    /// - [`ActivationError::Persistence`](crate::ActivationError::Persistence)
    ///   when the commit fails; retryable by the caller, never retried
    ///   here.
    pub fn issue(
        &self,
        package_id: &str,
        machine_id: &str,
        expiration_date: NaiveDate,
        plan: Option<&str>,
    ) -> ActivationResult<SignedLicense> {
        let payload = LicensePayload::new(package_id, machine_id, expiration_date, plan)?;

        self.store.reserve(package_id)?;

        let signed = match SignedLicense::sign(payload, &self.key) {
            Ok(signed) => signed,
            Err(e) => {
                self.store.release(package_id);
                return Err(e.into());
            }
        };

        let record =
            ActivationRecord::new(package_id, machine_id, Utc::now().date_naive());
        if let Err(e) = self.store.commit(record) {
            warn!(package_id, "activation commit failed, license withheld");
            return Err(e);
        }

        info!(package_id, machine_id, "license issued");
        Ok(signed)
    }

    /// All activation records, ordered by package id.
    ///
    /// # Errors
    ///
    /// [`ActivationError::Persistence`](crate::ActivationError::Persistence)
    /// when the store cannot be read.
    pub fn list_activations(&self) -> ActivationResult<Vec<ActivationRecord>> {
        self.store.list()
    }

    /// Deletes the activation record for `package_id`, permitting
    /// re-issuance. The log line is the only audit trail; this is a
    /// support workflow, not a normal-path transition.
    ///
    /// # Errors
    ///
    /// [`ActivationError::NotFound`](crate::ActivationError::NotFound)
    /// when no record exists.
    pub fn delete_activation(&self, package_id: &str) -> ActivationResult<()> {
        self.store.delete(package_id)?;
        warn!(package_id, "activation deleted, package may re-activate");
        Ok(())
    }

    /// Looks up a single activation record.
    pub fn get_activation(&self, package_id: &str) -> ActivationResult<Option<ActivationRecord>> {
        let record = self.store.get(package_id)?;
        debug!(package_id, found = record.is_some(), "activation lookup");
        Ok(record)
    }
}
