//! Entities and their security structures
//!
//! An entity is either *unsecurified* (one mandatory factor) or
//! *securified* (threshold factors plus override factors):
//!
//! ```text
//! SecurifiedEntityControl
//! ├── threshold_factors: [FactorInstance]  // any `threshold` of these suffice
//! ├── threshold: usize
//! └── override_factors: [FactorInstance]   // any single one suffices
//! ```

use crate::{EntityAddress, FactorError, FactorInstance, FactorSourceId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Control of an entity by a single factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsecurifiedEntityControl {
    factor: FactorInstance,
}

impl UnsecurifiedEntityControl {
    /// Wrap the entity's sole factor
    pub fn new(factor: FactorInstance) -> Self {
        Self { factor }
    }

    /// The sole required factor
    pub fn factor(&self) -> &FactorInstance {
        &self.factor
    }
}

/// Threshold and override factors controlling an entity.
///
/// Always valid once built: see [`SecurifiedEntityControl::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSecurifiedEntityControl", into = "RawSecurifiedEntityControl")]
pub struct SecurifiedEntityControl {
    threshold_factors: Vec<FactorInstance>,
    threshold: usize,
    override_factors: Vec<FactorInstance>,
}

#[derive(Serialize, Deserialize)]
struct RawSecurifiedEntityControl {
    threshold_factors: Vec<FactorInstance>,
    threshold: usize,
    override_factors: Vec<FactorInstance>,
}

impl SecurifiedEntityControl {
    /// Build a validated control structure.
    ///
    /// Rejects an empty threshold list, a threshold of zero or above the
    /// number of threshold factors, a factor source used twice within either
    /// list, and any factor source used in both lists.
    pub fn new(
        threshold_factors: Vec<FactorInstance>,
        threshold: usize,
        override_factors: Vec<FactorInstance>,
    ) -> Result<Self> {
        if threshold_factors.is_empty() {
            return Err(FactorError::EmptyThresholdFactors);
        }
        if threshold == 0 || threshold > threshold_factors.len() {
            return Err(FactorError::invalid_threshold(
                threshold,
                threshold_factors.len(),
            ));
        }

        let threshold_ids = distinct_ids(&threshold_factors)?;
        let override_ids = distinct_ids(&override_factors)?;
        let overlap: Vec<FactorSourceId> =
            threshold_ids.intersection(&override_ids).copied().collect();
        if !overlap.is_empty() {
            return Err(FactorError::OverlappingFactorSources { ids: overlap });
        }

        Ok(Self {
            threshold_factors,
            threshold,
            override_factors,
        })
    }

    /// Threshold factors in declaration order
    pub fn threshold_factors(&self) -> &[FactorInstance] {
        &self.threshold_factors
    }

    /// Number of threshold factors that must sign
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Override factors in declaration order
    pub fn override_factors(&self) -> &[FactorInstance] {
        &self.override_factors
    }

    /// Factor sources of the threshold factors
    pub fn threshold_factor_source_ids(&self) -> BTreeSet<FactorSourceId> {
        self.threshold_factors
            .iter()
            .map(FactorInstance::factor_source_id)
            .collect()
    }

    /// Factor sources of the override factors
    pub fn override_factor_source_ids(&self) -> BTreeSet<FactorSourceId> {
        self.override_factors
            .iter()
            .map(FactorInstance::factor_source_id)
            .collect()
    }

    /// Threshold factors followed by override factors
    pub fn all_factors(&self) -> impl Iterator<Item = &FactorInstance> {
        self.threshold_factors
            .iter()
            .chain(self.override_factors.iter())
    }
}

fn distinct_ids(factors: &[FactorInstance]) -> Result<BTreeSet<FactorSourceId>> {
    let mut ids = BTreeSet::new();
    for factor in factors {
        let id = factor.factor_source_id();
        if !ids.insert(id) {
            return Err(FactorError::duplicate(id));
        }
    }
    Ok(ids)
}

impl TryFrom<RawSecurifiedEntityControl> for SecurifiedEntityControl {
    type Error = FactorError;

    fn try_from(raw: RawSecurifiedEntityControl) -> Result<Self> {
        Self::new(raw.threshold_factors, raw.threshold, raw.override_factors)
    }
}

impl From<SecurifiedEntityControl> for RawSecurifiedEntityControl {
    fn from(control: SecurifiedEntityControl) -> Self {
        Self {
            threshold_factors: control.threshold_factors,
            threshold: control.threshold,
            override_factors: control.override_factors,
        }
    }
}

/// How an entity is controlled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityState {
    /// A single mandatory factor
    Unsecurified(UnsecurifiedEntityControl),
    /// Threshold plus override factors
    Securified(SecurifiedEntityControl),
}

/// An account or identity that must authorize a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    address: EntityAddress,
    security_state: SecurityState,
}

impl Entity {
    /// Create an entity
    pub fn new(address: impl Into<EntityAddress>, security_state: SecurityState) -> Self {
        Self {
            address: address.into(),
            security_state,
        }
    }

    /// Create an entity controlled by a single factor
    pub fn unsecurified(address: impl Into<EntityAddress>, factor: FactorInstance) -> Self {
        Self::new(
            address,
            SecurityState::Unsecurified(UnsecurifiedEntityControl::new(factor)),
        )
    }

    /// Create an entity controlled by threshold and override factors
    pub fn securified(address: impl Into<EntityAddress>, control: SecurifiedEntityControl) -> Self {
        Self::new(address, SecurityState::Securified(control))
    }

    /// Address of the entity
    pub fn address(&self) -> &EntityAddress {
        &self.address
    }

    /// Security structure of the entity
    pub fn security_state(&self) -> &SecurityState {
        &self.security_state
    }

    /// Minimum number of signatures that can authorize this entity without
    /// an override factor
    pub fn threshold(&self) -> usize {
        match &self.security_state {
            SecurityState::Unsecurified(_) => 1,
            SecurityState::Securified(control) => control.threshold(),
        }
    }

    /// Number of factors declared by this entity
    pub fn factor_count(&self) -> usize {
        match &self.security_state {
            SecurityState::Unsecurified(_) => 1,
            SecurityState::Securified(control) => {
                control.threshold_factors().len() + control.override_factors().len()
            }
        }
    }

    /// Every factor instance the entity declares
    pub fn factor_instances(&self) -> Vec<&FactorInstance> {
        match &self.security_state {
            SecurityState::Unsecurified(control) => vec![control.factor()],
            SecurityState::Securified(control) => control.all_factors().collect(),
        }
    }
}
