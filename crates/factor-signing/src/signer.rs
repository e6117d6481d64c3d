//! Signer seam
//!
//! A [`FactorSourceSigner`] performs the actual cryptographic work for a
//! factor source: prompting a ledger, tapping an arculus card, answering
//! security questions, or using a software key. The session only decides
//! *which* factor sources sign; it hands each one the whole batch of
//! instances it owns that round.

use crate::SignerError;
use async_trait::async_trait;
use factor_core::{
    FactorSeed, FactorSource, FactorSourceId, FactorSourceKind, OwnedFactorInstance, Signature,
    SignatureByFactorOfEntity, TransactionIntentHash,
};
use std::collections::HashMap;
use std::fmt;

/// Produces signatures for a batch of instances of one factor source
#[async_trait]
pub trait FactorSourceSigner: Send + Sync {
    /// Sign `intent` once per owned instance in `owned`.
    ///
    /// Every instance in `owned` belongs to `factor_source`. The returned
    /// signatures must cover the whole batch; the session rejects a reply
    /// that misses an instance or signs one it did not ask for.
    async fn bulk_sign(
        &self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
    ) -> Result<Vec<SignatureByFactorOfEntity>, SignerError>;
}

/// In-memory keyring of software factor sources
#[derive(Clone, Default)]
pub struct SeededSigner {
    seeds: HashMap<FactorSourceId, FactorSeed>,
}

impl SeededSigner {
    /// Empty keyring
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `seed` as a factor source of `kind` and return its id
    pub fn insert(
        &mut self,
        kind: FactorSourceKind,
        seed: FactorSeed,
    ) -> Result<FactorSourceId, factor_core::FactorError> {
        let id = seed.factor_source_id(kind)?;
        self.seeds.insert(id, seed);
        Ok(id)
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_seed(
        mut self,
        kind: FactorSourceKind,
        seed: FactorSeed,
    ) -> Result<Self, factor_core::FactorError> {
        self.insert(kind, seed)?;
        Ok(self)
    }

    /// Whether the keyring can sign for `id`
    pub fn contains(&self, id: &FactorSourceId) -> bool {
        self.seeds.contains_key(id)
    }

    fn sign_one(
        seed: &FactorSeed,
        intent: &TransactionIntentHash,
        owned: &OwnedFactorInstance,
    ) -> Result<SignatureByFactorOfEntity, SignerError> {
        let instance = owned.factor_instance();
        let index = instance.index();
        if &seed.derive_public_key(index)? != instance.public_key() {
            return Err(SignerError::KeyMismatch {
                id: instance.factor_source_id(),
                index,
            });
        }
        let key = seed.derive_signing_key(index)?;
        Ok(SignatureByFactorOfEntity::for_owned(
            owned,
            Signature::sign(&key, intent.as_bytes()),
        ))
    }
}

impl fmt::Debug for SeededSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededSigner")
            .field("factor_sources", &self.seeds.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl FactorSourceSigner for SeededSigner {
    async fn bulk_sign(
        &self,
        factor_source: &FactorSource,
        intent: &TransactionIntentHash,
        owned: &[OwnedFactorInstance],
    ) -> Result<Vec<SignatureByFactorOfEntity>, SignerError> {
        let id = factor_source.id();
        let seed = self
            .seeds
            .get(&id)
            .ok_or(SignerError::UnknownFactorSource { id })?;

        owned
            .iter()
            .map(|instance| Self::sign_one(seed, intent, instance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use factor_core::FactorInstance;

    fn keyring() -> (SeededSigner, FactorSource, FactorSeed) {
        let seed = FactorSeed::from_bytes([5u8; 32]);
        let mut signer = SeededSigner::new();
        let id = signer.insert(FactorSourceKind::Ledger, seed.clone()).unwrap();
        (signer, FactorSource::new(id, Utc::now()), seed)
    }

    #[tokio::test]
    async fn test_bulk_sign_covers_every_owner() {
        let (signer, source, seed) = keyring();
        let intent = TransactionIntentHash::of_payload(b"transfer 10");
        let owned = vec![
            OwnedFactorInstance::new(
                "Alice".into(),
                FactorInstance::derive(&seed, FactorSourceKind::Ledger, 0).unwrap(),
            ),
            OwnedFactorInstance::new(
                "Bob".into(),
                FactorInstance::derive(&seed, FactorSourceKind::Ledger, 1).unwrap(),
            ),
        ];

        let signatures = signer.bulk_sign(&source, &intent, &owned).await.unwrap();

        assert_eq!(signatures.len(), 2);
        for (signature, instance) in signatures.iter().zip(&owned) {
            assert!(signature.is_for(instance));
            assert!(signature.verify(&intent));
        }
    }

    #[tokio::test]
    async fn test_unknown_factor_source() {
        let (signer, _, _) = keyring();
        let other = FactorSeed::from_bytes([6u8; 32])
            .factor_source_id(FactorSourceKind::Device)
            .unwrap();
        let source = FactorSource::new(other, Utc::now());
        let result = signer
            .bulk_sign(&source, &TransactionIntentHash::of_payload(b"x"), &[])
            .await;
        assert_matches!(result, Err(SignerError::UnknownFactorSource { id }) if id == other);
    }

    #[tokio::test]
    async fn test_key_mismatch() {
        let (signer, source, _) = keyring();
        let stranger = FactorSeed::from_bytes([7u8; 32]);
        let mut instance = FactorInstance::derive(&stranger, FactorSourceKind::Ledger, 3).unwrap();
        // Claim the keyring's factor source with a foreign key.
        instance = FactorInstance::new(3, source.id(), *instance.public_key());
        let owned = [OwnedFactorInstance::new("Carol".into(), instance)];

        let result = signer
            .bulk_sign(&source, &TransactionIntentHash::of_payload(b"x"), &owned)
            .await;
        assert_matches!(result, Err(SignerError::KeyMismatch { index: 3, .. }));
    }

    #[tokio::test]
    async fn test_with_seed_builds_keyring() {
        let device = FactorSeed::from_bytes([8u8; 32]);
        let arculus = FactorSeed::from_bytes([9u8; 32]);
        let signer = SeededSigner::new()
            .with_seed(FactorSourceKind::Device, device.clone())
            .unwrap()
            .with_seed(FactorSourceKind::Arculus, arculus.clone())
            .unwrap();

        let device_id = device.factor_source_id(FactorSourceKind::Device).unwrap();
        let arculus_id = arculus.factor_source_id(FactorSourceKind::Arculus).unwrap();
        assert!(signer.contains(&device_id));
        assert!(signer.contains(&arculus_id));

        let intent = TransactionIntentHash::of_payload(b"built keyring");
        let owned = [OwnedFactorInstance::new(
            "Dave".into(),
            FactorInstance::derive(&arculus, FactorSourceKind::Arculus, 2).unwrap(),
        )];
        let source = FactorSource::new(arculus_id, Utc::now());
        let signatures = signer.bulk_sign(&source, &intent, &owned).await.unwrap();
        assert_eq!(signatures.len(), 1);
        assert!(signatures[0].verify(&intent));
    }

    #[test]
    fn test_debug_hides_seeds() {
        let (signer, source, _) = keyring();
        assert!(signer.contains(&source.id()));
        let debug = format!("{signer:?}");
        assert!(debug.contains(&source.id().to_string()));
        assert!(!debug.contains("FactorSeed"));
    }
}
