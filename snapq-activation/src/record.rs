//! Activation records and their on-disk row shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The durable binding of a package id to a machine id.
///
/// Created exactly once per package id at first successful issuance and
/// never mutated afterwards; only explicit administrative deletion removes
/// it (returning the package id to an unactivated state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRecord {
    /// The activated package identifier (the store key).
    pub package_id: String,
    /// The machine the license was bound to.
    pub machine_id: String,
    /// Calendar date of activation.
    pub activation_date: NaiveDate,
}

impl ActivationRecord {
    /// Builds a record for an activation happening on `activation_date`.
    #[must_use]
    pub fn new(
        package_id: impl Into<String>,
        machine_id: impl Into<String>,
        activation_date: NaiveDate,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            machine_id: machine_id.into(),
            activation_date,
        }
    }
}

/// On-disk row: the value stored under the package-id key.
///
/// `fecha` is the legacy field name existing activation files use; the
/// layout must stay keyed and human-inspectable for operational
/// compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredActivation {
    pub machine_id: String,
    #[serde(rename = "fecha")]
    pub activation_date: NaiveDate,
}

impl StoredActivation {
    pub(crate) fn into_record(self, package_id: &str) -> ActivationRecord {
        ActivationRecord {
            package_id: package_id.to_string(),
            machine_id: self.machine_id,
            activation_date: self.activation_date,
        }
    }

    pub(crate) fn from_record(record: &ActivationRecord) -> Self {
        Self {
            machine_id: record.machine_id.clone(),
            activation_date: record.activation_date,
        }
    }
}
