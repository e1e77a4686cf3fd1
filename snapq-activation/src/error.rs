//! Error types for the activation layer.

use snapq_license::LicenseError;
use thiserror::Error;

/// Errors from activation bookkeeping and license issuance.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// A license was already issued for this package id. A business-rule
    /// rejection, not a system fault.
    #[error("package {0} is already activated")]
    AlreadyActivated(String),

    /// No activation record exists for this package id.
    #[error("no activation record for package {0}")]
    NotFound(String),

    /// The store could not be read or durably written. Retryable by the
    /// caller; never retried automatically.
    #[error("activation store failure: {0}")]
    Persistence(String),

    /// An error from the license core (codec, key, signing).
    #[error(transparent)]
    License(#[from] LicenseError),
}

/// Result type for activation operations.
pub type ActivationResult<T> = Result<T, ActivationError>;
