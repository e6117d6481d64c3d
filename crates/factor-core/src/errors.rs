//! Unified error type for factor-core
//!
//! Construction-time validation failures for entity security structures and
//! the factor source catalog. These are recoverable: they reject bad input
//! before any signing session begins.

use crate::FactorSourceId;
use serde::{Deserialize, Serialize};

/// Errors raised while building factor-core data types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FactorError {
    /// Threshold is zero or exceeds the number of threshold factors
    #[error("Invalid threshold {threshold} for {factor_count} threshold factors")]
    InvalidThreshold {
        /// The rejected threshold
        threshold: usize,
        /// Number of threshold factors declared
        factor_count: usize,
    },

    /// A securified entity declared no threshold factors
    #[error("Securified entity must declare at least one threshold factor")]
    EmptyThresholdFactors,

    /// The same factor source was supplied twice where identities must be unique
    #[error("Duplicate factor source: {id}")]
    DuplicateFactorSource {
        /// The repeated factor source
        id: FactorSourceId,
    },

    /// Factor sources used both as threshold and as override factors
    #[error("Factor sources used as both threshold and override factors: {ids:?}")]
    OverlappingFactorSources {
        /// Every factor source found in both sets
        ids: Vec<FactorSourceId>,
    },

    /// Key material could not be derived or decoded
    #[error("Crypto error: {message}")]
    Crypto {
        /// Error message describing the cryptographic failure
        message: String,
    },
}

impl FactorError {
    /// Create an invalid threshold error
    pub fn invalid_threshold(threshold: usize, factor_count: usize) -> Self {
        Self::InvalidThreshold {
            threshold,
            factor_count,
        }
    }

    /// Create a duplicate factor source error
    pub fn duplicate(id: FactorSourceId) -> Self {
        Self::DuplicateFactorSource { id }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }
}

/// Standard Result type for factor-core operations
pub type Result<T> = std::result::Result<T, FactorError>;
