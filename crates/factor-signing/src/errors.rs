//! Signing session errors
//!
//! Only recoverable outcomes live here. Invariant violations inside a
//! running session (a broken factor-source index, a skip the entity never
//! permitted) panic instead, since they signal a logic defect rather than
//! bad input.

use factor_core::{EntityAddress, FactorError, FactorSourceId};

/// Errors surfaced by a signing session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// An entity references a factor source missing from the catalog
    #[error("Factor source {id} used by {entity} is not in the catalog")]
    UnknownFactorSource {
        /// The missing factor source
        id: FactorSourceId,
        /// Entity that referenced it
        entity: EntityAddress,
    },

    /// A factor source failed to produce its signatures
    #[error("Signing with {factor_source} failed: {reason}")]
    SigningFailed {
        /// Factor source that was asked to sign
        factor_source: FactorSourceId,
        /// Failure reported by the signer
        reason: String,
    },

    /// A factor source returned a signature that does not belong to the
    /// requested batch or does not verify
    #[error("Invalid signature from {factor_source} for {entity}")]
    InvalidSignature {
        /// Factor source that produced the signature
        factor_source: FactorSourceId,
        /// Entity the signature claims to be for
        entity: EntityAddress,
    },

    /// `sign_transaction` was called on a session that already ran
    #[error("Signing session already used; create a new session per transaction")]
    SessionAlreadyUsed,

    /// Invalid session configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Invalid factor data
    #[error(transparent)]
    Factor(#[from] FactorError),
}

impl SigningError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a signing failure for `factor_source`
    pub fn signing_failed(factor_source: FactorSourceId, reason: impl Into<String>) -> Self {
        Self::SigningFailed {
            factor_source,
            reason: reason.into(),
        }
    }
}

/// Standard Result type for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors reported by a [`FactorSourceSigner`](crate::FactorSourceSigner)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The signer holds no key material for this factor source
    #[error("No key material for factor source {id}")]
    UnknownFactorSource {
        /// The factor source asked to sign
        id: FactorSourceId,
    },

    /// Key derived at the instance index does not match the instance public key
    #[error("Derived key for {id} at index {index} does not match the factor instance")]
    KeyMismatch {
        /// The factor source asked to sign
        id: FactorSourceId,
        /// Derivation index of the instance
        index: u32,
    },

    /// The factor source could not be reached or the user declined
    #[error("Factor source unavailable: {message}")]
    Unavailable {
        /// Error message from the device or prompt
        message: String,
    },

    /// Key derivation failed
    #[error(transparent)]
    Factor(#[from] FactorError),
}

impl SignerError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factor_core::FactorSourceKind;

    #[test]
    fn test_error_messages() {
        let id = FactorSourceId::new(FactorSourceKind::Ledger, [0u8; 32]);
        let err = SigningError::signing_failed(id, "device unplugged");
        assert!(matches!(err, SigningError::SigningFailed { .. }));
        assert_eq!(
            err.to_string(),
            "Signing with ledger:0000000000000000 failed: device unplugged"
        );

        let err = SigningError::from(FactorError::EmptyThresholdFactors);
        assert!(matches!(err, SigningError::Factor(_)));
    }
}
