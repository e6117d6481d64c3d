//! Signing session orchestration
//!
//! A [`SigningSession`] walks the needed factor sources in signing order.
//! For each one it asks the skip policy whether to try skipping it; the skip
//! happens only if every entity owning the factor source permits it.
//! Otherwise the factor source signs once for all of its owners.
//!
//! A session is single use. Build a fresh one for every transaction.

use crate::config::SigningConfig;
use crate::index::FactorSourceIndex;
use crate::ordering::FactorSourcesOfKinds;
use crate::policy::SkipPolicy;
use crate::process::{EntitySigningProcess, SigningProcess};
use crate::signer::FactorSourceSigner;
use crate::{Result, SigningError};
use factor_core::{
    Entity, EntityAddress, FactorSource, FactorSourceCatalog, FactorSourceId, OwnedFactorInstance,
    SignatureByFactorOfEntity, TransactionIntentHash,
};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Ready,
    Completed,
    Aborted,
}

/// Result summary of a signing session
#[derive(Debug, Clone, Serialize)]
pub struct SigningOutcome {
    /// Every collected signature, in entity order
    pub signatures: IndexSet<SignatureByFactorOfEntity>,
    /// Factor sources skipped, in decision order
    pub skipped_factor_sources: Vec<FactorSourceId>,
    /// Factor sources that signed, in signing order
    pub signed_factor_sources: Vec<FactorSourceId>,
    /// Completion of each entity
    pub entities_finished: IndexMap<EntityAddress, bool>,
}

impl SigningOutcome {
    /// Whether every entity is authorized
    pub fn is_finished_signing(&self) -> bool {
        self.entities_finished.values().all(|finished| *finished)
    }
}

/// One signing attempt over a batch of entities
pub struct SigningSession {
    processes: IndexMap<EntityAddress, EntitySigningProcess>,
    index: FactorSourceIndex,
    policy: Box<dyn SkipPolicy>,
    verify_signatures: bool,
    skipped: IndexSet<FactorSourceId>,
    signed: IndexSet<FactorSourceId>,
    state: SessionState,
}

impl SigningSession {
    /// Create a session for `entities` using factor sources from `catalog`.
    ///
    /// Entities are kept in the order given. A repeated address replaces
    /// the earlier entity. Fails with [`SigningError::UnknownFactorSource`]
    /// if an entity uses a factor source the catalog lacks.
    pub fn new<P>(
        catalog: &FactorSourceCatalog,
        entities: impl IntoIterator<Item = Entity>,
        skip_policy: P,
    ) -> Result<Self>
    where
        P: SkipPolicy + 'static,
    {
        Self::with_boxed_policy(catalog, entities, Box::new(skip_policy))
    }

    /// Create a session whose skip policy and verification follow `config`
    pub fn from_config(
        catalog: &FactorSourceCatalog,
        entities: impl IntoIterator<Item = Entity>,
        config: &SigningConfig,
    ) -> Result<Self> {
        config.validate()?;
        let session = Self::with_boxed_policy(catalog, entities, config.skip_policy())?;
        Ok(session.with_signature_verification(config.verify_signatures))
    }

    fn with_boxed_policy(
        catalog: &FactorSourceCatalog,
        entities: impl IntoIterator<Item = Entity>,
        policy: Box<dyn SkipPolicy>,
    ) -> Result<Self> {
        let mut by_address: IndexMap<EntityAddress, Entity> = IndexMap::new();
        for entity in entities {
            let address = entity.address().clone();
            if by_address.insert(address.clone(), entity).is_some() {
                warn!(entity = %address, "Duplicate entity address, keeping the later entity");
            }
        }

        let index = FactorSourceIndex::build(catalog, by_address.values())?;
        let processes = by_address
            .iter()
            .map(|(address, entity)| (address.clone(), EntitySigningProcess::for_entity(entity)))
            .collect();

        Ok(Self {
            processes,
            index,
            policy,
            verify_signatures: true,
            skipped: IndexSet::new(),
            signed: IndexSet::new(),
            state: SessionState::Ready,
        })
    }

    /// Turn signature verification on or off (on by default)
    pub fn with_signature_verification(mut self, verify: bool) -> Self {
        self.verify_signatures = verify;
        self
    }

    /// Collect signatures for `intent`, engaging factor sources through `signer`.
    ///
    /// Returns every collected signature. A signer failure or an invalid
    /// signature aborts the session; signatures collected before the
    /// failure stay available through [`signatures`](Self::signatures).
    /// Fails with [`SigningError::SessionAlreadyUsed`] on a second call.
    #[tracing::instrument(skip_all, fields(intent = %intent))]
    pub async fn sign_transaction<S>(
        &mut self,
        intent: &TransactionIntentHash,
        signer: &S,
    ) -> Result<IndexSet<SignatureByFactorOfEntity>>
    where
        S: FactorSourceSigner + ?Sized,
    {
        if self.state != SessionState::Ready {
            return Err(SigningError::SessionAlreadyUsed);
        }

        let order: Vec<FactorSource> = self
            .index
            .factor_sources_of_kinds()
            .iter()
            .cloned()
            .collect();
        info!(
            entities = self.processes.len(),
            factor_sources = order.len(),
            "Starting signing session"
        );

        for factor_source in &order {
            let id = factor_source.id();
            if self.skipped.contains(&id) {
                debug!(factor_source = %id, "Factor source already skipped");
                continue;
            }
            if self.policy.should_attempt_skip(factor_source) && self.can_skip_factor_source(id) {
                debug!(factor_source = %id, "Skipping factor source");
                self.skip_factor_source(id);
                continue;
            }

            if let Err(err) = self.bulk_sign(factor_source, intent, signer).await {
                warn!(factor_source = %id, error = %err, "Signing session aborted");
                self.state = SessionState::Aborted;
                return Err(err);
            }
        }

        self.state = SessionState::Completed;
        let signatures = self.signatures();
        info!(
            signatures = signatures.len(),
            skipped = self.skipped.len(),
            finished = self.is_finished_signing(),
            "Signing session complete"
        );
        Ok(signatures)
    }

    async fn bulk_sign<S>(
        &mut self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        signer: &S,
    ) -> Result<()>
    where
        S: FactorSourceSigner + ?Sized,
    {
        let id = factor_source.id();
        let owned: Vec<OwnedFactorInstance> = self
            .owners(id)
            .iter()
            .map(|address| self.process_of(address).owned_factor_instance_of_factor_source(id))
            .collect();
        debug!(factor_source = %id, owners = owned.len(), "Signing with factor source");

        let produced = signer
            .bulk_sign(factor_source, intent, &owned)
            .await
            .map_err(|e| SigningError::signing_failed(id, e.to_string()))?;
        self.check_batch(id, intent, &owned, &produced)?;

        for signature in produced {
            let address = signature.entity_address().clone();
            self.process_of_mut(&address).add_signature(signature);
        }
        self.signed.insert(id);
        Ok(())
    }

    /// Every signature must answer one requested instance, and every
    /// requested instance must be answered exactly once.
    fn check_batch(
        &self,
        id: FactorSourceId,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
        produced: &[SignatureByFactorOfEntity],
    ) -> Result<()> {
        let invalid = |signature: &SignatureByFactorOfEntity| SigningError::InvalidSignature {
            factor_source: id,
            entity: signature.entity_address().clone(),
        };

        let mut answered: Vec<Option<&SignatureByFactorOfEntity>> = vec![None; owned.len()];
        for signature in produced {
            let position = owned
                .iter()
                .position(|instance| signature.is_for(instance))
                .ok_or_else(|| invalid(signature))?;
            if self.verify_signatures && !signature.verify(intent) {
                return Err(invalid(signature));
            }
            let previous = answered[position].replace(signature);
            if previous.is_some_and(|existing| existing != signature) {
                return Err(invalid(signature));
            }
        }

        match answered.iter().position(Option::is_none) {
            Some(missing) => Err(SigningError::signing_failed(
                id,
                format!("no signature returned for {}", owned[missing].owner()),
            )),
            None => Ok(()),
        }
    }

    /// Whether every entity owning `id` permits skipping it.
    ///
    /// False for a factor source no entity in the session uses.
    pub fn can_skip_factor_source(&self, id: FactorSourceId) -> bool {
        match self.index.owners_of(&id) {
            Some(owners) => owners
                .iter()
                .all(|address| self.process_of(address).can_skip_factor_source(id)),
            None => false,
        }
    }

    /// Skip `id` for every entity owning it.
    ///
    /// # Panics
    ///
    /// Panics unless [`can_skip_factor_source`](Self::can_skip_factor_source)
    /// returns true for `id`.
    pub fn skip_factor_source(&mut self, id: FactorSourceId) {
        assert!(
            self.can_skip_factor_source(id),
            "factor source {id} may not be skipped by every owner"
        );
        let owners = self.owners(id).clone();
        for address in &owners {
            self.process_of_mut(address).skip_factor_source(id);
        }
        self.skipped.insert(id);
    }

    /// Union of the signatures of every entity, in entity order
    pub fn signatures(&self) -> IndexSet<SignatureByFactorOfEntity> {
        self.processes
            .values()
            .flat_map(|process| process.signatures().iter().cloned())
            .collect()
    }

    /// Whether every entity is authorized
    pub fn is_finished_signing(&self) -> bool {
        self.processes
            .values()
            .all(EntitySigningProcess::is_finished_signing)
    }

    /// Whether the entity at `address` is authorized; `None` if unknown
    pub fn is_entity_finished(&self, address: &EntityAddress) -> Option<bool> {
        self.processes
            .get(address)
            .map(EntitySigningProcess::is_finished_signing)
    }

    /// Factor sources skipped so far, in decision order
    pub fn skipped_factor_sources(&self) -> &IndexSet<FactorSourceId> {
        &self.skipped
    }

    /// Factor sources that signed so far, in signing order
    pub fn signed_factor_sources(&self) -> &IndexSet<FactorSourceId> {
        &self.signed
    }

    /// The needed factor sources grouped by kind, in signing order
    pub fn factor_sources_of_kind(&self) -> &FactorSourcesOfKinds {
        self.index.factor_sources_of_kinds()
    }

    /// Entities owning factor source `id`
    pub fn owners_of(&self, id: &FactorSourceId) -> Option<&IndexSet<EntityAddress>> {
        self.index.owners_of(id)
    }

    /// Signing process of the entity at `address`
    pub fn process(&self, address: &EntityAddress) -> Option<&EntitySigningProcess> {
        self.processes.get(address)
    }

    /// Snapshot of the session's results
    pub fn outcome(&self) -> SigningOutcome {
        SigningOutcome {
            signatures: self.signatures(),
            skipped_factor_sources: self.skipped.iter().copied().collect(),
            signed_factor_sources: self.signed.iter().copied().collect(),
            entities_finished: self
                .processes
                .iter()
                .map(|(address, process)| (address.clone(), process.is_finished_signing()))
                .collect(),
        }
    }

    fn owners(&self, id: FactorSourceId) -> &IndexSet<EntityAddress> {
        self.index.owners_of(&id).unwrap_or_else(|| {
            panic!("factor source {id} has no owners; the factor-source index is incorrectly set up")
        })
    }

    fn process_of(&self, address: &EntityAddress) -> &EntitySigningProcess {
        self.processes.get(address).unwrap_or_else(|| {
            panic!("no signing process for {address}; the factor-source index is incorrectly set up")
        })
    }

    fn process_of_mut(&mut self, address: &EntityAddress) -> &mut EntitySigningProcess {
        self.processes.get_mut(address).unwrap_or_else(|| {
            panic!("no signing process for {address}; the factor-source index is incorrectly set up")
        })
    }
}

impl fmt::Debug for SigningSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSession")
            .field("entities", &self.processes.keys().collect::<Vec<_>>())
            .field("factor_sources", &self.index.len())
            .field("verify_signatures", &self.verify_signatures)
            .field("skipped", &self.skipped)
            .field("signed", &self.signed)
            .field("state", &self.state)
            .finish()
    }
}
