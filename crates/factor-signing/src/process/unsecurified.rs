use super::{assert_signature_owner, SigningProcess};
use factor_core::{
    EntityAddress, FactorSourceId, OwnedFactorInstance, SignatureByFactorOfEntity,
    UnsecurifiedEntityControl,
};
use indexmap::IndexSet;

/// Signing process of an entity controlled by a single factor.
///
/// The sole factor is mandatory: it can never be skipped, and the entity
/// is finished once that factor has signed.
#[derive(Debug, Clone)]
pub struct UnsecurifiedSigningProcess {
    address: EntityAddress,
    control: UnsecurifiedEntityControl,
    signatures: IndexSet<SignatureByFactorOfEntity>,
}

impl UnsecurifiedSigningProcess {
    /// Start a process with no signature
    pub fn new(address: EntityAddress, control: UnsecurifiedEntityControl) -> Self {
        Self {
            address,
            control,
            signatures: IndexSet::new(),
        }
    }

    /// Control structure of the entity
    pub fn control(&self) -> &UnsecurifiedEntityControl {
        &self.control
    }

    fn factor_source_id(&self) -> FactorSourceId {
        self.control.factor().factor_source_id()
    }
}

impl SigningProcess for UnsecurifiedSigningProcess {
    fn address(&self) -> &EntityAddress {
        &self.address
    }

    fn owned_factor_instance_of_factor_source(&self, id: FactorSourceId) -> OwnedFactorInstance {
        assert!(
            self.factor_source_id() == id,
            "{} is controlled by {}, not {id}; the session's factor-source index is \
             incorrectly set up",
            self.address,
            self.factor_source_id()
        );
        OwnedFactorInstance::new(self.address.clone(), self.control.factor().clone())
    }

    fn is_finished_signing(&self) -> bool {
        !self.signatures.is_empty()
    }

    fn can_skip_factor_source(&self, _id: FactorSourceId) -> bool {
        false
    }

    fn skip_factor_source(&mut self, id: FactorSourceId) {
        panic!(
            "cannot skip {id} for unsecurified entity {}: its only factor is mandatory",
            self.address
        );
    }

    fn add_signature(&mut self, signature: SignatureByFactorOfEntity) {
        assert_signature_owner(&self.address, &signature);
        assert!(
            signature.factor_instance() == self.control.factor(),
            "signature from {} does not belong to the factor of {}",
            signature.factor_source_id(),
            self.address
        );
        assert!(
            self.signatures.is_empty() || self.signatures.contains(&signature),
            "unsecurified entity {} already holds a signature",
            self.address
        );
        self.signatures.insert(signature);
    }

    fn signatures(&self) -> &IndexSet<SignatureByFactorOfEntity> {
        &self.signatures
    }
}
