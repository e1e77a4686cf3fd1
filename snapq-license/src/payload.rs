//! Canonical license payload encoding and decoding.
//!
//! The canonical form is the exact byte sequence that gets signed:
//! `pkg=<id>;mid=<id>;exp=<YYYY-MM-DD>[;plan=<tag>]` — fixed field order,
//! `;` between pairs, `=` between key and value. Because the delimiters
//! carry structure, no field value may contain them.

use crate::error::{LicenseError, LicenseResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in the `exp` field (ISO 8601 calendar date).
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The structured fields of a license, prior to signing.
///
/// Serialization to the canonical string is deterministic and lossless:
/// `LicensePayload::decode(p.encode()?) == p` for every valid payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Caller-supplied package identifier, unique across the system.
    pub package_id: String,
    /// Identifier of the activating hardware.
    pub machine_id: String,
    /// License expiration date. Embedded only; enforcement is the
    /// consumer's concern.
    pub expiration_date: NaiveDate,
    /// Optional plan tag (e.g. a tier name).
    pub plan: Option<String>,
}

impl LicensePayload {
    /// Builds a validated payload.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidField`] if `package_id` or
    /// `machine_id` is empty, or if any field value contains a reserved
    /// delimiter (`;` or `=`).
    pub fn new(
        package_id: impl Into<String>,
        machine_id: impl Into<String>,
        expiration_date: NaiveDate,
        plan: Option<&str>,
    ) -> LicenseResult<Self> {
        let payload = Self {
            package_id: package_id.into(),
            machine_id: machine_id.into(),
            expiration_date,
            plan: plan.map(str::to_string),
        };
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> LicenseResult<()> {
        check_field("package_id", &self.package_id)?;
        check_field("machine_id", &self.machine_id)?;
        if let Some(plan) = &self.plan {
            check_field("plan", plan)?;
        }
        Ok(())
    }

    /// Encodes the payload into its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidField`] when a field is empty or
    /// contains `;` or `=` (possible for payloads built by struct literal
    /// rather than [`LicensePayload::new`]).
    pub fn encode(&self) -> LicenseResult<String> {
        self.validate()?;
        let mut out = format!(
            "pkg={};mid={};exp={}",
            self.package_id,
            self.machine_id,
            self.expiration_date.format(DATE_FORMAT)
        );
        if let Some(plan) = &self.plan {
            out.push_str(";plan=");
            out.push_str(plan);
        }
        Ok(out)
    }

    /// Parses a canonical payload string back into structured fields.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedPayload`] on any structural
    /// deviation: missing required field, unknown or out-of-order key,
    /// empty value, or an unparseable date.
    pub fn decode(canonical: &str) -> LicenseResult<Self> {
        let mut parts = canonical.split(';');

        let package_id = expect_pair(parts.next(), "pkg")?;
        let machine_id = expect_pair(parts.next(), "mid")?;
        let exp = expect_pair(parts.next(), "exp")?;
        let expiration_date = NaiveDate::parse_from_str(&exp, DATE_FORMAT)
            .map_err(|e| LicenseError::MalformedPayload(format!("invalid exp date: {e}")))?;

        let plan = match parts.next() {
            Some(pair) => Some(expect_pair(Some(pair), "plan")?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(LicenseError::MalformedPayload(
                "unexpected trailing fields".to_string(),
            ));
        }

        Ok(Self {
            package_id,
            machine_id,
            expiration_date,
            plan,
        })
    }
}

fn check_field(field: &'static str, value: &str) -> LicenseResult<()> {
    if value.is_empty() {
        return Err(LicenseError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.contains(';') || value.contains('=') {
        return Err(LicenseError::InvalidField {
            field,
            reason: "must not contain ';' or '='".to_string(),
        });
    }
    Ok(())
}

fn expect_pair(part: Option<&str>, key: &str) -> LicenseResult<String> {
    let part = part
        .ok_or_else(|| LicenseError::MalformedPayload(format!("missing field '{key}'")))?;
    let (k, v) = part
        .split_once('=')
        .ok_or_else(|| LicenseError::MalformedPayload(format!("expected '{key}=<value>'")))?;
    if k != key {
        return Err(LicenseError::MalformedPayload(format!(
            "expected key '{key}', found '{k}'"
        )));
    }
    if v.is_empty() {
        return Err(LicenseError::MalformedPayload(format!(
            "empty value for '{key}'"
        )));
    }
    // A second '=' inside the value is not producible by encode().
    if v.contains('=') {
        return Err(LicenseError::MalformedPayload(format!(
            "stray '=' in value for '{key}'"
        )));
    }
    Ok(v.to_string())
}
