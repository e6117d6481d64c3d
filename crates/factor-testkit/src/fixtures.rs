//! Fixed test profile
//!
//! Five software factor sources and three entities:
//!
//! | Factor source | Kind |
//! |---|---|
//! | `fs0` | device |
//! | `fs1` | ledger |
//! | `fs2` | arculus |
//! | `fs3` | yubikey |
//! | `fs4` | security questions |
//!
//! - **Alice**: securified, threshold factors `{fs0, fs1, fs2}` with
//!   threshold 2, override factor `fs3`.
//! - **Bob**: unsecurified, controlled by `fs4`.
//! - **Carol**: securified, threshold factors `{fs3, fs0}` with threshold 2
//!   and no override, so both are mandatory. Shares `fs3` with Alice's
//!   override and `fs0` with Alice's threshold.

use chrono::{DateTime, TimeZone, Utc};
use factor_core::{
    Entity, FactorInstance, FactorSeed, FactorSource, FactorSourceCatalog, FactorSourceId,
    FactorSourceKind, SecurifiedEntityControl,
};
use factor_signing::SeededSigner;

/// Kinds of `fs0` through `fs4`
pub const FIXTURE_KINDS: [FactorSourceKind; 5] = [
    FactorSourceKind::Device,
    FactorSourceKind::Ledger,
    FactorSourceKind::Arculus,
    FactorSourceKind::Yubikey,
    FactorSourceKind::SecurityQuestions,
];

/// Deterministic seed number `n`
pub fn test_seed(n: u32) -> FactorSeed {
    let mut bytes = [0xA5u8; 32];
    bytes[..4].copy_from_slice(&n.to_be_bytes());
    FactorSeed::from_bytes(bytes)
}

/// Deterministic timestamp `secs` after the epoch
pub fn test_time(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Catalog, keyring and entities of the fixed profile
#[derive(Debug, Clone)]
pub struct TestProfile {
    /// Catalog holding `fs0` through `fs4`
    pub catalog: FactorSourceCatalog,
    /// Keyring able to sign with every factor source of the catalog
    pub signer: SeededSigner,
    seeds: Vec<(FactorSeed, FactorSourceKind)>,
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfile {
    /// Build the profile
    pub fn new() -> Self {
        let mut signer = SeededSigner::new();
        let mut sources = Vec::new();
        let mut seeds = Vec::new();
        for (n, kind) in FIXTURE_KINDS.into_iter().enumerate() {
            let seed = test_seed(n as u32);
            let id = signer.insert(kind, seed.clone()).unwrap();
            sources.push(FactorSource::new(id, test_time(1_000 + n as i64)));
            seeds.push((seed, kind));
        }
        Self {
            catalog: FactorSourceCatalog::new(sources).unwrap(),
            signer,
            seeds,
        }
    }

    /// Id of `fs{n}`
    pub fn fs(&self, n: usize) -> FactorSourceId {
        let (seed, kind) = &self.seeds[n];
        seed.factor_source_id(*kind).unwrap()
    }

    /// Instance of `fs{n}` at derivation `index`
    pub fn instance(&self, n: usize, index: u32) -> FactorInstance {
        let (seed, kind) = &self.seeds[n];
        FactorInstance::derive(seed, *kind, index).unwrap()
    }

    /// Alice: `{fs0, fs1, fs2}` threshold 2, override `fs3`
    pub fn alice(&self) -> Entity {
        Entity::securified(
            "Alice",
            SecurifiedEntityControl::new(
                vec![self.instance(0, 0), self.instance(1, 0), self.instance(2, 0)],
                2,
                vec![self.instance(3, 0)],
            )
            .unwrap(),
        )
    }

    /// Bob: unsecurified, `fs4`
    pub fn bob(&self) -> Entity {
        Entity::unsecurified("Bob", self.instance(4, 1))
    }

    /// Carol: `{fs3, fs0}` threshold 2, no override
    pub fn carol(&self) -> Entity {
        Entity::securified(
            "Carol",
            SecurifiedEntityControl::new(vec![self.instance(3, 2), self.instance(0, 2)], 2, vec![])
                .unwrap(),
        )
    }

    /// Alice, Bob and Carol
    pub fn entities(&self) -> Vec<Entity> {
        vec![self.alice(), self.bob(), self.carol()]
    }
}
