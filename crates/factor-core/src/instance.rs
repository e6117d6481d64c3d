//! Factor instances: per-entity keys derived from a factor source

use crate::{EntityAddress, FactorSeed, FactorSourceId, FactorSourceKind, PublicKey, Result};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A key derived from a factor source for one entity.
///
/// Equality and hashing use the derived public key only. Two instances
/// with different `(index, factor_source_id)` never share a key in
/// practice, so this is also an identity on those pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorInstance {
    index: u32,
    factor_source_id: FactorSourceId,
    public_key: PublicKey,
}

impl FactorInstance {
    /// Create an instance from already derived key material
    pub fn new(index: u32, factor_source_id: FactorSourceId, public_key: PublicKey) -> Self {
        Self {
            index,
            factor_source_id,
            public_key,
        }
    }

    /// Derive the instance at `index` from a software-held seed
    pub fn derive(seed: &FactorSeed, kind: FactorSourceKind, index: u32) -> Result<Self> {
        Ok(Self::new(
            index,
            seed.factor_source_id(kind)?,
            seed.derive_public_key(index)?,
        ))
    }

    /// Derivation index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The factor source this instance was derived from
    pub fn factor_source_id(&self) -> FactorSourceId {
        self.factor_source_id
    }

    /// Kind of the owning factor source
    pub fn kind(&self) -> FactorSourceKind {
        self.factor_source_id.kind()
    }

    /// Derived public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl PartialEq for FactorInstance {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for FactorInstance {}

impl Hash for FactorInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key.hash(state);
    }
}

/// A factor instance together with the entity that owns it.
///
/// Produced on demand by a signing process, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnedFactorInstance {
    owner: EntityAddress,
    factor_instance: FactorInstance,
}

impl OwnedFactorInstance {
    /// Pair an instance with its owner
    pub fn new(owner: EntityAddress, factor_instance: FactorInstance) -> Self {
        Self {
            owner,
            factor_instance,
        }
    }

    /// Owning entity
    pub fn owner(&self) -> &EntityAddress {
        &self.owner
    }

    /// The owned instance
    pub fn factor_instance(&self) -> &FactorInstance {
        &self.factor_instance
    }

    /// The factor source the instance belongs to
    pub fn factor_source_id(&self) -> FactorSourceId {
        self.factor_instance.factor_source_id()
    }
}
