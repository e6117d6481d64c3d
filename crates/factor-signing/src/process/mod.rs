//! Per-entity signing processes
//!
//! One process per entity tracks which signatures it has collected, which of
//! its factor sources were skipped, and whether it is authorized yet. The two
//! security structures share one capability surface, [`SigningProcess`], and
//! are dispatched through the [`EntitySigningProcess`] sum type.
//!
//! Violating a precondition of this surface (asking for an instance the
//! entity does not own, skipping a factor source the entity does not permit
//! skipping) means the session's factor-source index is broken, so these
//! methods panic rather than return errors.

mod securified;
mod unsecurified;

pub use securified::SecurifiedSigningProcess;
pub use unsecurified::UnsecurifiedSigningProcess;

use factor_core::{
    Entity, EntityAddress, FactorSourceId, OwnedFactorInstance, SecurityState,
    SignatureByFactorOfEntity,
};
use indexmap::IndexSet;

/// Capability surface of a per-entity signing process
pub trait SigningProcess {
    /// Address of the entity being authorized
    fn address(&self) -> &EntityAddress;

    /// The instance this entity owns under factor source `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not one of the entity's declared factors.
    fn owned_factor_instance_of_factor_source(&self, id: FactorSourceId) -> OwnedFactorInstance;

    /// Whether the collected signatures authorize the entity
    fn is_finished_signing(&self) -> bool;

    /// Whether factor source `id` may be left out for this entity
    fn can_skip_factor_source(&self, id: FactorSourceId) -> bool;

    /// Record that factor source `id` will not sign for this entity.
    ///
    /// # Panics
    ///
    /// Panics unless [`can_skip_factor_source`](Self::can_skip_factor_source)
    /// returns true for `id`.
    fn skip_factor_source(&mut self, id: FactorSourceId);

    /// Record a produced signature.
    ///
    /// # Panics
    ///
    /// Panics if the signature belongs to another entity or to a factor
    /// source this entity does not declare.
    fn add_signature(&mut self, signature: SignatureByFactorOfEntity);

    /// Signatures collected so far, in the order they were added
    fn signatures(&self) -> &IndexSet<SignatureByFactorOfEntity>;
}

/// Signing process of one entity, by security structure
#[derive(Debug, Clone)]
pub enum EntitySigningProcess {
    /// Entity controlled by a single factor
    Unsecurified(UnsecurifiedSigningProcess),
    /// Entity controlled by threshold and override factors
    Securified(SecurifiedSigningProcess),
}

impl EntitySigningProcess {
    /// Start a process for `entity` with nothing signed or skipped
    pub fn for_entity(entity: &Entity) -> Self {
        let address = entity.address().clone();
        match entity.security_state() {
            SecurityState::Unsecurified(control) => Self::Unsecurified(
                UnsecurifiedSigningProcess::new(address, control.clone()),
            ),
            SecurityState::Securified(control) => {
                Self::Securified(SecurifiedSigningProcess::new(address, control.clone()))
            }
        }
    }

    fn inner(&self) -> &dyn SigningProcess {
        match self {
            Self::Unsecurified(process) => process,
            Self::Securified(process) => process,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SigningProcess {
        match self {
            Self::Unsecurified(process) => process,
            Self::Securified(process) => process,
        }
    }
}

impl SigningProcess for EntitySigningProcess {
    fn address(&self) -> &EntityAddress {
        self.inner().address()
    }

    fn owned_factor_instance_of_factor_source(&self, id: FactorSourceId) -> OwnedFactorInstance {
        self.inner().owned_factor_instance_of_factor_source(id)
    }

    fn is_finished_signing(&self) -> bool {
        self.inner().is_finished_signing()
    }

    fn can_skip_factor_source(&self, id: FactorSourceId) -> bool {
        self.inner().can_skip_factor_source(id)
    }

    fn skip_factor_source(&mut self, id: FactorSourceId) {
        self.inner_mut().skip_factor_source(id);
    }

    fn add_signature(&mut self, signature: SignatureByFactorOfEntity) {
        self.inner_mut().add_signature(signature);
    }

    fn signatures(&self) -> &IndexSet<SignatureByFactorOfEntity> {
        self.inner().signatures()
    }
}

/// Panics when `signature` is attributed to a different entity.
fn assert_signature_owner(address: &EntityAddress, signature: &SignatureByFactorOfEntity) {
    assert!(
        signature.entity_address() == address,
        "signature for {} routed to the signing process of {address}; the session's \
         factor-source index is incorrectly set up",
        signature.entity_address()
    );
}
