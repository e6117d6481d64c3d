//! Property test strategies for signing scenarios
//!
//! A strategy yields a [`ScenarioShape`]: the kinds and last-used times of a
//! pool of factor sources plus, per entity, which pool members it uses and
//! how. [`ScenarioShape::build`] turns the shape into a catalog, a keyring
//! and the entities, with deterministic seeds.

use crate::fixtures::{test_seed, test_time};
use factor_core::{
    Entity, FactorInstance, FactorSeed, FactorSource, FactorSourceCatalog, FactorSourceKind,
    SecurifiedEntityControl,
};
use factor_signing::SeededSigner;
use proptest::collection::vec;
use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

/// How one entity uses the factor-source pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityShape {
    /// Single factor: pool member `factor`
    Unsecurified {
        /// Pool index of the sole factor
        factor: usize,
    },
    /// Threshold and override factors, as pool indices
    Securified {
        /// Pool indices of the threshold factors
        threshold_factors: Vec<usize>,
        /// Required threshold signatures
        threshold: usize,
        /// Pool indices of the override factors
        override_factors: Vec<usize>,
    },
}

/// Factor-source pool and the entities drawing from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioShape {
    /// Kind of each pool member
    pub kinds: Vec<FactorSourceKind>,
    /// Last-used time of each pool member, in seconds
    pub last_used: Vec<i64>,
    /// One shape per entity
    pub entities: Vec<EntityShape>,
}

/// Built scenario, ready for a signing session
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Catalog of every pool member
    pub catalog: FactorSourceCatalog,
    /// Keyring for every pool member
    pub signer: SeededSigner,
    /// Entities named `entity-0`, `entity-1`, ...
    pub entities: Vec<Entity>,
}

impl ScenarioShape {
    /// Derive keys and assemble the scenario.
    ///
    /// Entity `i` uses derivation index `i` on every factor source, so two
    /// entities sharing a factor source still hold distinct instances.
    pub fn build(&self) -> Scenario {
        let seeds: Vec<FactorSeed> = (0..self.kinds.len())
            .map(|n| test_seed(1_000 + n as u32))
            .collect();

        let mut signer = SeededSigner::new();
        let mut sources = Vec::new();
        for ((seed, kind), secs) in seeds.iter().zip(&self.kinds).zip(&self.last_used) {
            let id = signer.insert(*kind, seed.clone()).unwrap();
            sources.push(FactorSource::new(id, test_time(*secs)));
        }

        let instance = |pool: usize, entity: usize| {
            FactorInstance::derive(&seeds[pool], self.kinds[pool], entity as u32).unwrap()
        };

        let entities = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let address = format!("entity-{i}");
                match shape {
                    EntityShape::Unsecurified { factor } => {
                        Entity::unsecurified(address, instance(*factor, i))
                    }
                    EntityShape::Securified {
                        threshold_factors,
                        threshold,
                        override_factors,
                    } => Entity::securified(
                        address,
                        SecurifiedEntityControl::new(
                            threshold_factors.iter().map(|f| instance(*f, i)).collect(),
                            *threshold,
                            override_factors.iter().map(|f| instance(*f, i)).collect(),
                        )
                        .unwrap(),
                    ),
                }
            })
            .collect();

        Scenario {
            catalog: FactorSourceCatalog::new(sources).unwrap(),
            signer,
            entities,
        }
    }
}

/// Strategy for factor source kinds
pub fn arb_factor_source_kind() -> impl Strategy<Value = FactorSourceKind> {
    prop::sample::select(FactorSourceKind::ALL.to_vec())
}

/// Entities that share no factor source.
///
/// Each entity gets its own pool members. Securified entities have one to
/// four threshold factors and up to `max_overrides` override factors.
pub fn arb_disjoint_scenario(max_overrides: usize) -> impl Strategy<Value = ScenarioShape> {
    vec((any::<bool>(), 1usize..=4, any::<u8>(), 0..=max_overrides), 1..=4)
        .prop_flat_map(|raw| {
            let total: usize = raw
                .iter()
                .map(|(securified, tc, _, oc)| if *securified { tc + oc } else { 1 })
                .sum();
            (
                Just(raw),
                vec(arb_factor_source_kind(), total),
                vec(0i64..1_000_000, total),
            )
        })
        .prop_map(|(raw, kinds, last_used)| {
            let mut next = 0usize;
            let mut take = |n: usize| {
                let taken: Vec<usize> = (next..next + n).collect();
                next += n;
                taken
            };
            let entities = raw
                .into_iter()
                .map(|(securified, tc, threshold_raw, oc)| {
                    if securified {
                        EntityShape::Securified {
                            threshold_factors: take(tc),
                            threshold: 1 + usize::from(threshold_raw) % tc,
                            override_factors: take(oc),
                        }
                    } else {
                        EntityShape::Unsecurified { factor: take(1)[0] }
                    }
                })
                .collect();
            ScenarioShape {
                kinds,
                last_used,
                entities,
            }
        })
}

/// Entities drawing overlapping factors from a pool of three to six.
pub fn arb_shared_scenario() -> impl Strategy<Value = ScenarioShape> {
    (3usize..=6)
        .prop_flat_map(|pool| {
            let members = Just((0..pool).collect::<Vec<_>>()).prop_shuffle();
            let entity = (any::<bool>(), members, any::<u8>(), any::<u8>(), any::<u8>());
            (
                vec(arb_factor_source_kind(), pool),
                vec(0i64..1_000_000, pool),
                vec(entity, 1..=4),
            )
        })
        .prop_map(|(kinds, last_used, raw)| {
            let pool = kinds.len();
            let entities = raw
                .into_iter()
                .map(|(securified, members, tc_raw, threshold_raw, oc_raw)| {
                    if !securified {
                        return EntityShape::Unsecurified { factor: members[0] };
                    }
                    let tc = 1 + usize::from(tc_raw) % pool;
                    let oc = usize::from(oc_raw) % ((pool - tc).min(2) + 1);
                    EntityShape::Securified {
                        threshold_factors: members[..tc].to_vec(),
                        threshold: 1 + usize::from(threshold_raw) % tc,
                        override_factors: members[tc..tc + oc].to_vec(),
                    }
                })
                .collect();
            ScenarioShape {
                kinds,
                last_used,
                entities,
            }
        })
}
