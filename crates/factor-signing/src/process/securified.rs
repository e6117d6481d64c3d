use super::{assert_signature_owner, SigningProcess};
use factor_core::{
    EntityAddress, FactorSourceId, OwnedFactorInstance, SecurifiedEntityControl,
    SignatureByFactorOfEntity,
};
use indexmap::IndexSet;
use std::collections::BTreeSet;

/// Signing process of an entity controlled by threshold and override factors.
///
/// The entity is finished once any override factor has signed, or once
/// `threshold` distinct threshold factors have signed. Skips only grow: a
/// factor source skipped once stays skipped for the rest of the session.
#[derive(Debug, Clone)]
pub struct SecurifiedSigningProcess {
    address: EntityAddress,
    control: SecurifiedEntityControl,
    threshold_ids: BTreeSet<FactorSourceId>,
    override_ids: BTreeSet<FactorSourceId>,
    skipped: BTreeSet<FactorSourceId>,
    signatures: IndexSet<SignatureByFactorOfEntity>,
}

impl SecurifiedSigningProcess {
    /// Start a process with nothing signed or skipped
    pub fn new(address: EntityAddress, control: SecurifiedEntityControl) -> Self {
        Self {
            address,
            threshold_ids: control.threshold_factor_source_ids(),
            override_ids: control.override_factor_source_ids(),
            control,
            skipped: BTreeSet::new(),
            signatures: IndexSet::new(),
        }
    }

    /// Control structure of the entity
    pub fn control(&self) -> &SecurifiedEntityControl {
        &self.control
    }

    /// Factor sources skipped so far
    pub fn skipped_factor_sources(&self) -> &BTreeSet<FactorSourceId> {
        &self.skipped
    }

    fn is_override_factor(&self, id: &FactorSourceId) -> bool {
        self.override_ids.contains(id)
    }

    fn is_threshold_factor(&self, id: &FactorSourceId) -> bool {
        self.threshold_ids.contains(id)
    }

    /// Distinct override factor sources that have signed
    pub fn signed_override_factors(&self) -> BTreeSet<FactorSourceId> {
        self.signed_factor_sources_in(&self.override_ids)
    }

    /// Distinct threshold factor sources that have signed
    pub fn signed_threshold_factors(&self) -> BTreeSet<FactorSourceId> {
        self.signed_factor_sources_in(&self.threshold_ids)
    }

    fn signed_factor_sources_in(&self, ids: &BTreeSet<FactorSourceId>) -> BTreeSet<FactorSourceId> {
        self.signatures
            .iter()
            .map(SignatureByFactorOfEntity::factor_source_id)
            .filter(|id| ids.contains(id))
            .collect()
    }
}

impl SigningProcess for SecurifiedSigningProcess {
    fn address(&self) -> &EntityAddress {
        &self.address
    }

    fn owned_factor_instance_of_factor_source(&self, id: FactorSourceId) -> OwnedFactorInstance {
        let instance = self
            .control
            .override_factors()
            .iter()
            .chain(self.control.threshold_factors())
            .find(|instance| instance.factor_source_id() == id)
            .unwrap_or_else(|| {
                panic!(
                    "{} declares no factor instance of {id}; the session's factor-source \
                     index is incorrectly set up",
                    self.address
                )
            });
        OwnedFactorInstance::new(self.address.clone(), instance.clone())
    }

    fn is_finished_signing(&self) -> bool {
        !self.signed_override_factors().is_empty()
            || self.signed_threshold_factors().len() >= self.control.threshold()
    }

    fn can_skip_factor_source(&self, id: FactorSourceId) -> bool {
        if self.skipped.contains(&id) {
            return false;
        }
        if self.is_finished_signing() {
            return true;
        }

        if self.is_override_factor(&id) {
            // `id` is itself unskipped here, so this always permits the skip,
            // even for the last remaining override factor. Kept as-is pending
            // product review.
            let remaining = self.override_ids.difference(&self.skipped).count();
            remaining > 0
        } else if self.is_threshold_factor(&id) {
            // Counts `id` itself: skipping it must leave `threshold` behind.
            let remaining = self.threshold_ids.difference(&self.skipped).count();
            remaining > self.control.threshold()
        } else {
            panic!(
                "{id} is neither a threshold nor an override factor of {}",
                self.address
            );
        }
    }

    fn skip_factor_source(&mut self, id: FactorSourceId) {
        assert!(
            self.can_skip_factor_source(id),
            "{} does not permit skipping {id}",
            self.address
        );
        self.skipped.insert(id);
    }

    fn add_signature(&mut self, signature: SignatureByFactorOfEntity) {
        assert_signature_owner(&self.address, &signature);
        let id = signature.factor_source_id();
        assert!(
            self.is_threshold_factor(&id) || self.is_override_factor(&id),
            "signature from {id} does not belong to a factor of {}",
            self.address
        );
        self.signatures.insert(signature);
    }

    fn signatures(&self) -> &IndexSet<SignatureByFactorOfEntity> {
        &self.signatures
    }
}
