//! Wire token construction and verification.
//!
//! A token is `canonicalPayload|base64(signature)`: the canonical payload
//! string from [`LicensePayload::encode`], a single `|`, then the
//! RSASSA-PSS signature over the canonical payload bytes, base64-encoded
//! (standard alphabet). Any mutation of the payload portion invalidates
//! the signature.

use crate::error::{LicenseError, LicenseResult};
use crate::key::{SigningKeyProvider, VerifyingKey};
use crate::payload::LicensePayload;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pss::Signature;
use rsa::signature::Verifier;

/// A license payload together with its signature.
#[derive(Debug, Clone)]
pub struct SignedLicense {
    payload: LicensePayload,
    canonical: String,
    signature: Vec<u8>,
}

impl SignedLicense {
    /// Encodes `payload` canonically and signs it with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidField`] when the payload cannot be
    /// canonically encoded.
    pub fn sign(payload: LicensePayload, key: &SigningKeyProvider) -> LicenseResult<Self> {
        let canonical = payload.encode()?;
        let signature = key.sign(canonical.as_bytes());
        Ok(Self {
            payload,
            canonical,
            signature,
        })
    }

    /// Returns the signed payload.
    #[must_use]
    pub fn payload(&self) -> &LicensePayload {
        &self.payload
    }

    /// Returns the canonical payload string (the exact signed bytes).
    #[must_use]
    pub fn canonical_payload(&self) -> &str {
        &self.canonical
    }

    /// Returns the raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the base64-encoded signature.
    #[must_use]
    pub fn signature_base64(&self) -> String {
        BASE64.encode(&self.signature)
    }

    /// Renders the full wire token: `canonicalPayload|base64Signature`.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{}|{}", self.canonical, self.signature_base64())
    }
}

/// Verifies a wire token and returns its decoded payload.
///
/// Splits on the last `|`, base64-decodes the signature, decodes the
/// payload, and verifies the signature over the canonical payload bytes.
/// This is the consumer-side counterpart of issuance; the issuance path
/// itself never verifies.
///
/// # Errors
///
/// - [`LicenseError::MalformedToken`] when the token cannot be split or
///   the signature portion is not valid base64.
/// - [`LicenseError::MalformedPayload`] when the payload portion violates
///   the canonical encoding.
/// - [`LicenseError::SignatureInvalid`] when the signature does not
///   verify under `key`.
pub fn verify_token(token: &str, key: &VerifyingKey) -> LicenseResult<LicensePayload> {
    let (canonical, signature_b64) = token.rsplit_once('|').ok_or_else(|| {
        LicenseError::MalformedToken("missing '|' separator".to_string())
    })?;

    let signature_bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| LicenseError::MalformedToken(format!("invalid signature base64: {e}")))?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|e| LicenseError::MalformedToken(format!("invalid signature bytes: {e}")))?;

    let payload = LicensePayload::decode(canonical)?;

    key.verify(canonical.as_bytes(), &signature)
        .map_err(|_| LicenseError::SignatureInvalid)?;

    Ok(payload)
}
