//! Cross-entity factor-source index
//!
//! Maps every factor source a session needs to the entities that depend on
//! it. A factor source is plural-owned when, for example, one person spends
//! from accounts `A` and `B` that are both controlled by factor source `X`:
//! the index then holds `X -> {A, B}` and `X` signs for both in one go.

use crate::ordering::FactorSourcesOfKinds;
use crate::{Result, SigningError};
use factor_core::{Entity, EntityAddress, FactorSource, FactorSourceCatalog, FactorSourceId};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Owners of each required factor source, plus the signing order
#[derive(Debug, Clone, Default)]
pub struct FactorSourceIndex {
    owners: HashMap<FactorSourceId, IndexSet<EntityAddress>>,
    factor_sources_of_kinds: FactorSourcesOfKinds,
}

impl FactorSourceIndex {
    /// Build the index from the catalog and the entities that must sign.
    ///
    /// Fails with [`SigningError::UnknownFactorSource`] when an entity uses a
    /// factor source the catalog does not contain.
    pub fn build<'a>(
        catalog: &FactorSourceCatalog,
        entities: impl IntoIterator<Item = &'a Entity>,
    ) -> Result<Self> {
        let mut owners: HashMap<FactorSourceId, IndexSet<EntityAddress>> = HashMap::new();
        let mut used: HashSet<FactorSourceId> = HashSet::new();

        for entity in entities {
            for instance in entity.factor_instances() {
                let id = instance.factor_source_id();
                if !catalog.contains(&id) {
                    return Err(SigningError::UnknownFactorSource {
                        id,
                        entity: entity.address().clone(),
                    });
                }
                used.insert(id);
                owners
                    .entry(id)
                    .or_default()
                    .insert(entity.address().clone());
            }
        }

        // Catalog order breaks ties the priority comparator leaves open.
        let needed: Vec<FactorSource> = catalog
            .iter()
            .filter(|source| used.contains(&source.id()))
            .cloned()
            .collect();

        Ok(Self {
            owners,
            factor_sources_of_kinds: FactorSourcesOfKinds::new(needed),
        })
    }

    /// Entities depending on factor source `id`, in entity order
    pub fn owners_of(&self, id: &FactorSourceId) -> Option<&IndexSet<EntityAddress>> {
        self.owners.get(id)
    }

    /// The needed factor sources grouped by kind, in signing order
    pub fn factor_sources_of_kinds(&self) -> &FactorSourcesOfKinds {
        &self.factor_sources_of_kinds
    }

    /// Number of distinct factor sources needed
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no factor source is needed
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use factor_core::{FactorInstance, FactorSeed, FactorSourceKind, SecurifiedEntityControl};

    fn seed(byte: u8) -> FactorSeed {
        FactorSeed::from_bytes([byte; 32])
    }

    fn catalog(entries: &[(u8, FactorSourceKind)]) -> FactorSourceCatalog {
        FactorSourceCatalog::new(entries.iter().map(|(byte, kind)| {
            FactorSource::new(
                seed(*byte).factor_source_id(*kind).unwrap(),
                Utc.timestamp_opt(1_000, 0).unwrap(),
            )
        }))
        .unwrap()
    }

    fn instance(byte: u8, kind: FactorSourceKind, index: u32) -> FactorInstance {
        FactorInstance::derive(&seed(byte), kind, index).unwrap()
    }

    #[test]
    fn test_shared_factor_source_has_every_owner() {
        let catalog = catalog(&[(1, FactorSourceKind::Device), (2, FactorSourceKind::Ledger)]);
        let alice = Entity::securified(
            "Alice",
            SecurifiedEntityControl::new(
                vec![instance(1, FactorSourceKind::Device, 0)],
                1,
                vec![instance(2, FactorSourceKind::Ledger, 0)],
            )
            .unwrap(),
        );
        let bob = Entity::unsecurified("Bob", instance(1, FactorSourceKind::Device, 1));

        let index = FactorSourceIndex::build(&catalog, [&alice, &bob]).unwrap();

        let device = seed(1).factor_source_id(FactorSourceKind::Device).unwrap();
        let owners: Vec<_> = index
            .owners_of(&device)
            .unwrap()
            .iter()
            .map(EntityAddress::as_str)
            .collect();
        assert_eq!(owners, vec!["Alice", "Bob"]);
        assert_eq!(index.len(), 2);

        let order: Vec<_> = index
            .factor_sources_of_kinds()
            .iter()
            .map(FactorSource::kind)
            .collect();
        assert_eq!(order, vec![FactorSourceKind::Ledger, FactorSourceKind::Device]);
    }

    #[test]
    fn test_unused_catalog_entries_are_left_out() {
        let catalog = catalog(&[
            (1, FactorSourceKind::Device),
            (2, FactorSourceKind::Ledger),
            (3, FactorSourceKind::Arculus),
        ]);
        let bob = Entity::unsecurified("Bob", instance(3, FactorSourceKind::Arculus, 0));

        let index = FactorSourceIndex::build(&catalog, [&bob]).unwrap();
        assert_eq!(index.factor_sources_of_kinds().len(), 1);
        let kinds: Vec<_> = index.factor_sources_of_kinds().kinds().collect();
        assert_eq!(kinds, vec![FactorSourceKind::Arculus]);
    }

    #[test]
    fn test_missing_catalog_entry_is_rejected() {
        let catalog = catalog(&[(1, FactorSourceKind::Device)]);
        let bob = Entity::unsecurified("Bob", instance(7, FactorSourceKind::Yubikey, 0));

        let result = FactorSourceIndex::build(&catalog, [&bob]);
        assert_matches!(
            result,
            Err(SigningError::UnknownFactorSource { entity, .. }) if entity.as_str() == "Bob"
        );
    }
}
