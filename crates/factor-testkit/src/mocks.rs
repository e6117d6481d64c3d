//! Mock signers
//!
//! All mocks wrap a [`SeededSigner`] and alter its behaviour for one target
//! factor source.

use async_trait::async_trait;
use factor_core::{
    EntityAddress, FactorSource, FactorSourceId, OwnedFactorInstance, SignatureByFactorOfEntity,
    TransactionIntentHash,
};
use factor_signing::{FactorSourceSigner, SeededSigner, SignerError};
use std::sync::Mutex;

/// One `bulk_sign` call seen by a [`RecordingSigner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Factor source asked to sign
    pub factor_source: FactorSourceId,
    /// Owners of the requested instances, in request order
    pub owners: Vec<EntityAddress>,
}

/// Delegates to a keyring and records every request
#[derive(Debug)]
pub struct RecordingSigner {
    inner: SeededSigner,
    requests: Mutex<Vec<SignRequest>>,
}

impl RecordingSigner {
    /// Wrap `inner`
    pub fn new(inner: SeededSigner) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<SignRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactorSourceSigner for RecordingSigner {
    async fn bulk_sign(
        &self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
    ) -> Result<Vec<SignatureByFactorOfEntity>, SignerError> {
        self.requests.lock().unwrap().push(SignRequest {
            factor_source: factor_source.id(),
            owners: owned.iter().map(|o| o.owner().clone()).collect(),
        });
        self.inner.bulk_sign(factor_source, intent, owned).await
    }
}

/// Fails whenever the target factor source is asked to sign
#[derive(Debug)]
pub struct FailingSigner {
    inner: SeededSigner,
    target: FactorSourceId,
}

impl FailingSigner {
    /// Fail on `target`, delegate everything else to `inner`
    pub fn new(inner: SeededSigner, target: FactorSourceId) -> Self {
        Self { inner, target }
    }
}

#[async_trait]
impl FactorSourceSigner for FailingSigner {
    async fn bulk_sign(
        &self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
    ) -> Result<Vec<SignatureByFactorOfEntity>, SignerError> {
        if factor_source.id() == self.target {
            return Err(SignerError::unavailable("user cancelled signing"));
        }
        self.inner.bulk_sign(factor_source, intent, owned).await
    }
}

/// How a [`ForgingSigner`] corrupts the target's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forgery {
    /// Sign a different intent
    WrongIntent,
    /// Leave out the last signature of the batch
    Omit,
    /// Attribute the first signature to an entity that was never asked
    Misattribute,
}

/// Returns corrupted signatures for the target factor source
#[derive(Debug)]
pub struct ForgingSigner {
    inner: SeededSigner,
    target: FactorSourceId,
    forgery: Forgery,
}

impl ForgingSigner {
    /// Corrupt replies of `target` with `forgery`
    pub fn new(inner: SeededSigner, target: FactorSourceId, forgery: Forgery) -> Self {
        Self {
            inner,
            target,
            forgery,
        }
    }
}

#[async_trait]
impl FactorSourceSigner for ForgingSigner {
    async fn bulk_sign(
        &self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
    ) -> Result<Vec<SignatureByFactorOfEntity>, SignerError> {
        if factor_source.id() != self.target {
            return self.inner.bulk_sign(factor_source, intent, owned).await;
        }

        match self.forgery {
            Forgery::WrongIntent => {
                let other = TransactionIntentHash::of_payload(b"a different transaction");
                self.inner.bulk_sign(factor_source, &other, owned).await
            }
            Forgery::Omit => {
                let mut signatures = self.inner.bulk_sign(factor_source, intent, owned).await?;
                signatures.pop();
                Ok(signatures)
            }
            Forgery::Misattribute => {
                let mut signatures = self.inner.bulk_sign(factor_source, intent, owned).await?;
                if let Some(first) = signatures.first_mut() {
                    *first = SignatureByFactorOfEntity::new(
                        EntityAddress::new("Mallory"),
                        first.factor_instance().clone(),
                        *first.signature(),
                    );
                }
                Ok(signatures)
            }
        }
    }
}
