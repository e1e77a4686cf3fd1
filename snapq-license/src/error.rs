//! Error types for the license core.

use thiserror::Error;

/// Errors from license encoding, key handling, and verification.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The private key source is absent or empty.
    #[error("private key missing: {0}")]
    KeyMissing(String),

    /// PEM or ASN.1 parsing of the private key failed.
    #[error("private key malformed: {0}")]
    KeyMalformed(String),

    /// The key parsed but is not an RSA key.
    #[error("unsupported private key algorithm: {0}")]
    KeyUnsupportedAlgorithm(String),

    /// A payload field is empty or contains a reserved delimiter.
    #[error("invalid license field {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The canonical payload string violates the fixed field order or
    /// delimiter rules.
    #[error("malformed license payload: {0}")]
    MalformedPayload(String),

    /// The token cannot be split into payload and signature parts.
    #[error("malformed license token: {0}")]
    MalformedToken(String),

    /// The signature does not verify against the canonical payload.
    #[error("license signature invalid")]
    SignatureInvalid,
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
