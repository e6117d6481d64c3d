//! Identifier types for factor sources, entities and transactions

use crate::FactorSourceKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identity of a factor source.
///
/// The body is a digest of the factor source's root public key, so two
/// factor sources never share an id in practice. The kind is carried along
/// so it can be read without a catalog lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactorSourceId {
    kind: FactorSourceKind,
    body: [u8; 32],
}

impl FactorSourceId {
    /// Create an id from a kind and a 32-byte body
    pub fn new(kind: FactorSourceKind, body: [u8; 32]) -> Self {
        Self { kind, body }
    }

    /// Derive the id of a factor source from its root public key bytes
    pub fn from_root_public_key(kind: FactorSourceKind, root_public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"factor:v1:source-id:");
        hasher.update([kind.discriminant()]);
        hasher.update(root_public_key);
        Self::new(kind, hasher.finalize().into())
    }

    /// The kind of the identified factor source
    pub fn kind(&self) -> FactorSourceKind {
        self.kind
    }

    /// Raw id body
    pub fn body(&self) -> &[u8; 32] {
        &self.body
    }
}

impl fmt::Display for FactorSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, hex::encode(&self.body[..8]))
    }
}

impl fmt::Debug for FactorSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactorSourceId({self})")
    }
}

/// Address of an entity (account or identity).
///
/// Opaque to the signing core; only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityAddress(String);

impl EntityAddress {
    /// Create a new entity address
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl From<&str> for EntityAddress {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

/// Digest of the transaction every factor source signs.
///
/// The transaction format itself belongs to the caller; the signing core
/// only ever sees this hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionIntentHash([u8; 32]);

impl TransactionIntentHash {
    /// Wrap an already computed digest
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash an encoded transaction payload
    pub fn of_payload(payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"factor:v1:intent:");
        hasher.update(payload);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionIntentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionIntentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionIntentHash({})", hex::encode(&self.0[..8]))
    }
}
