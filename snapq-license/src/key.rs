//! RSA signing key loading and RSASSA-PSS signing.
//!
//! The private key arrives as PEM from a secure configuration source
//! (normally the `PRIVATE_KEY_PEM` environment variable) — never from
//! request input and never persisted alongside activation state. Signing
//! uses RSASSA-PSS over SHA-256 with a random salt, so two signatures
//! over identical input are expected to differ; verification, not byte
//! equality, is the correctness criterion.

use crate::error::{LicenseError, LicenseResult};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::der::asn1::ObjectIdentifier;
use rsa::pkcs8::{DecodePublicKey, PrivateKeyInfo, SecretDocument};
use rsa::pss::BlindedSigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{Keypair, RandomizedSigner, SignatureEncoding};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Environment variable holding the PEM private key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY_PEM";

/// Public half of the signing key, usable for token verification.
pub type VerifyingKey = rsa::pss::VerifyingKey<Sha256>;

/// `rsaEncryption` — the only private-key algorithm the signer accepts.
const RSA_ALGORITHM_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// An opaque handle over the loaded private key.
///
/// Immutable after construction and shareable across concurrent callers
/// without locking. Construct once at startup and inject it into the
/// issuer; a missing or malformed key is a startup-fatal condition for
/// the issuance capability.
pub struct SigningKeyProvider {
    signing_key: BlindedSigningKey<Sha256>,
}

impl SigningKeyProvider {
    /// Loads the private key from the [`PRIVATE_KEY_ENV`] environment
    /// variable.
    ///
    /// # Errors
    ///
    /// [`LicenseError::KeyMissing`] when the variable is unset or empty,
    /// otherwise the errors of [`SigningKeyProvider::from_pem`].
    pub fn from_env() -> LicenseResult<Self> {
        let pem = std::env::var(PRIVATE_KEY_ENV)
            .map_err(|_| LicenseError::KeyMissing(format!("{PRIVATE_KEY_ENV} is not set")))?;
        Self::from_pem(&pem)
    }

    /// Parses a PEM-encoded RSA private key (PKCS#8 `PRIVATE KEY` or
    /// PKCS#1 `RSA PRIVATE KEY`).
    ///
    /// # Errors
    ///
    /// - [`LicenseError::KeyMissing`] when `pem` is empty.
    /// - [`LicenseError::KeyMalformed`] when PEM or ASN.1 parsing fails.
    /// - [`LicenseError::KeyUnsupportedAlgorithm`] when the key is
    ///   well-formed but not RSA (e.g. an Ed25519 PKCS#8 key).
    pub fn from_pem(pem: &str) -> LicenseResult<Self> {
        let pem = pem.trim();
        if pem.is_empty() {
            return Err(LicenseError::KeyMissing("key source is empty".to_string()));
        }

        let (label, doc) = SecretDocument::from_pem(pem)
            .map_err(|e| LicenseError::KeyMalformed(e.to_string()))?;

        let private_key = match label {
            "PRIVATE KEY" => {
                let info: PrivateKeyInfo<'_> = doc
                    .decode_msg()
                    .map_err(|e| LicenseError::KeyMalformed(e.to_string()))?;
                if info.algorithm.oid != RSA_ALGORITHM_OID {
                    return Err(LicenseError::KeyUnsupportedAlgorithm(
                        info.algorithm.oid.to_string(),
                    ));
                }
                RsaPrivateKey::try_from(info)
                    .map_err(|e| LicenseError::KeyMalformed(e.to_string()))?
            }
            "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(doc.as_bytes())
                .map_err(|e| LicenseError::KeyMalformed(e.to_string()))?,
            other => {
                return Err(LicenseError::KeyUnsupportedAlgorithm(other.to_string()));
            }
        };

        Ok(Self {
            signing_key: BlindedSigningKey::<Sha256>::new(private_key),
        })
    }

    /// Wraps an already-parsed RSA private key.
    #[must_use]
    pub fn from_key(private_key: RsaPrivateKey) -> Self {
        Self {
            signing_key: BlindedSigningKey::<Sha256>::new(private_key),
        }
    }

    /// Signs `message` with RSASSA-PSS/SHA-256 using a fresh random salt.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key
            .sign_with_rng(&mut rand::thread_rng(), message)
            .to_vec()
    }

    /// Returns the public half of the key for verification.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl std::fmt::Debug for SigningKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyProvider")
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Parses an SPKI PEM public key (`PUBLIC KEY`) for consumer-side
/// verification.
///
/// # Errors
///
/// Returns [`LicenseError::KeyMalformed`] when the PEM cannot be parsed
/// as an RSA public key.
pub fn verifying_key_from_pem(pem: &str) -> LicenseResult<VerifyingKey> {
    let public_key = RsaPublicKey::from_public_key_pem(pem.trim())
        .map_err(|e| LicenseError::KeyMalformed(e.to_string()))?;
    Ok(VerifyingKey::new(public_key))
}
