//! Factor sources and the catalog of factor sources known to a profile

use crate::{FactorError, FactorSourceId, FactorSourceKind, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A signing capability unit: a device key, a hardware key, a ledger,
/// knowledge-based recovery and so on.
///
/// Equality and hashing use the id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSource {
    id: FactorSourceId,
    last_used: DateTime<Utc>,
}

impl FactorSource {
    /// Create a factor source record
    pub fn new(id: FactorSourceId, last_used: DateTime<Utc>) -> Self {
        Self { id, last_used }
    }

    /// Identity of this factor source
    pub fn id(&self) -> FactorSourceId {
        self.id
    }

    /// Kind, read through the id
    pub fn kind(&self) -> FactorSourceKind {
        self.id.kind()
    }

    /// When this factor source last produced a signature
    pub fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }

    /// Signing priority: kind first, then least recently used first.
    ///
    /// This is not `Ord` because two distinct factor sources of the same
    /// kind and the same `last_used` compare equal here. Sort with a stable
    /// sort so such ties keep catalog order.
    pub fn signing_priority(&self, other: &Self) -> Ordering {
        self.kind()
            .cmp(&other.kind())
            .then_with(|| self.last_used.cmp(&other.last_used))
    }
}

impl PartialEq for FactorSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FactorSource {}

impl Hash for FactorSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Every factor source known to the profile, keyed by id.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FactorSource>", into = "Vec<FactorSource>")]
pub struct FactorSourceCatalog {
    sources: IndexMap<FactorSourceId, FactorSource>,
}

impl FactorSourceCatalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(sources: impl IntoIterator<Item = FactorSource>) -> Result<Self> {
        let mut map = IndexMap::new();
        for source in sources {
            let id = source.id();
            if map.insert(id, source).is_some() {
                return Err(FactorError::duplicate(id));
            }
        }
        Ok(Self { sources: map })
    }

    /// Look up a factor source by id
    pub fn get(&self, id: &FactorSourceId) -> Option<&FactorSource> {
        self.sources.get(id)
    }

    /// Whether the catalog knows `id`
    pub fn contains(&self, id: &FactorSourceId) -> bool {
        self.sources.contains_key(id)
    }

    /// Factor sources in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &FactorSource> {
        self.sources.values()
    }

    /// Number of factor sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl TryFrom<Vec<FactorSource>> for FactorSourceCatalog {
    type Error = FactorError;

    fn try_from(sources: Vec<FactorSource>) -> Result<Self> {
        Self::new(sources)
    }
}

impl From<FactorSourceCatalog> for Vec<FactorSource> {
    fn from(catalog: FactorSourceCatalog) -> Self {
        catalog.sources.into_values().collect()
    }
}
