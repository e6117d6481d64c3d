//! Signatures attributed to an entity and one of its factor instances

use crate::{
    EntityAddress, FactorInstance, FactorSourceId, FactorSourceKind, OwnedFactorInstance, Signature,
    TransactionIntentHash,
};
use serde::{Deserialize, Serialize};

/// A signature produced by one factor instance on behalf of one entity.
///
/// The set of these per entity is the running proof of its partial
/// authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureByFactorOfEntity {
    entity_address: EntityAddress,
    factor_instance: FactorInstance,
    signature: Signature,
}

impl SignatureByFactorOfEntity {
    /// Attribute `signature` to an entity's factor instance
    pub fn new(
        entity_address: EntityAddress,
        factor_instance: FactorInstance,
        signature: Signature,
    ) -> Self {
        Self {
            entity_address,
            factor_instance,
            signature,
        }
    }

    /// Attribute `signature` to an owned factor instance
    pub fn for_owned(owned: &OwnedFactorInstance, signature: Signature) -> Self {
        Self::new(
            owned.owner().clone(),
            owned.factor_instance().clone(),
            signature,
        )
    }

    /// The signing entity
    pub fn entity_address(&self) -> &EntityAddress {
        &self.entity_address
    }

    /// The instance that produced the signature
    pub fn factor_instance(&self) -> &FactorInstance {
        &self.factor_instance
    }

    /// The raw signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Factor source of the producing instance
    pub fn factor_source_id(&self) -> FactorSourceId {
        self.factor_instance.factor_source_id()
    }

    /// Kind of the producing factor source
    pub fn kind(&self) -> FactorSourceKind {
        self.factor_instance.kind()
    }

    /// Whether this signature was produced by `owned`
    pub fn is_for(&self, owned: &OwnedFactorInstance) -> bool {
        &self.entity_address == owned.owner() && &self.factor_instance == owned.factor_instance()
    }

    /// Check the signature against the instance public key
    pub fn verify(&self, intent: &TransactionIntentHash) -> bool {
        self.factor_instance
            .public_key()
            .verify(intent.as_bytes(), &self.signature)
    }
}
