//! Skip policies
//!
//! A skip policy decides whether the session should *try* to skip a factor
//! source. Trying is necessary but not sufficient: the skip only happens if
//! every entity owning the factor source also permits it.
//!
//! | Policy | Behaviour |
//! |---|---|
//! | [`LazySkip`] | always tries |
//! | [`PrudentSkip`] | never tries; every needed factor source signs |
//! | [`RandomSkip`] | tries with independent probability 1/2 |
//!
//! Any `FnMut(&FactorSourceId) -> bool` closure is a policy too.

use crate::{Result, SigningError};
use factor_core::{FactorSource, FactorSourceId};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides whether to attempt skipping a factor source
pub trait SkipPolicy: Send {
    /// Whether the session should try to skip `factor_source`
    fn should_attempt_skip(&mut self, factor_source: &FactorSource) -> bool;
}

/// Skips whenever the entities permit it
#[derive(Debug, Clone, Copy, Default)]
pub struct LazySkip;

impl SkipPolicy for LazySkip {
    fn should_attempt_skip(&mut self, _factor_source: &FactorSource) -> bool {
        true
    }
}

/// Never skips
#[derive(Debug, Clone, Copy, Default)]
pub struct PrudentSkip;

impl SkipPolicy for PrudentSkip {
    fn should_attempt_skip(&mut self, _factor_source: &FactorSource) -> bool {
        false
    }
}

/// Flips a fair coin per factor source
#[derive(Debug, Clone)]
pub struct RandomSkip<R = ChaCha8Rng> {
    rng: R,
}

impl RandomSkip<ChaCha8Rng> {
    /// Reproducible coin flips from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Coin flips seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }
}

impl<R: RngCore> RandomSkip<R> {
    /// Use a caller-provided generator
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + Send> SkipPolicy for RandomSkip<R> {
    fn should_attempt_skip(&mut self, _factor_source: &FactorSource) -> bool {
        self.rng.gen_bool(0.5)
    }
}

impl<F> SkipPolicy for F
where
    F: FnMut(&FactorSourceId) -> bool + Send,
{
    fn should_attempt_skip(&mut self, factor_source: &FactorSource) -> bool {
        self(&factor_source.id())
    }
}

/// Built-in policy selector used by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStrategy {
    /// [`LazySkip`]
    Lazy,
    /// [`PrudentSkip`]
    #[default]
    Prudent,
    /// [`RandomSkip`]
    Random,
}

impl SkipStrategy {
    /// Instantiate the policy. `seed` only affects [`SkipStrategy::Random`].
    pub fn into_policy(self, seed: Option<u64>) -> Box<dyn SkipPolicy> {
        match self {
            SkipStrategy::Lazy => Box::new(LazySkip),
            SkipStrategy::Prudent => Box::new(PrudentSkip),
            SkipStrategy::Random => match seed {
                Some(seed) => Box::new(RandomSkip::seeded(seed)),
                None => Box::new(RandomSkip::from_entropy()),
            },
        }
    }

    /// Configuration name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipStrategy::Lazy => "lazy",
            SkipStrategy::Prudent => "prudent",
            SkipStrategy::Random => "random",
        }
    }
}

impl fmt::Display for SkipStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkipStrategy {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(SkipStrategy::Lazy),
            "prudent" => Ok(SkipStrategy::Prudent),
            "random" => Ok(SkipStrategy::Random),
            other => Err(SigningError::config(format!(
                "Unknown skip strategy '{other}', expected lazy, prudent or random"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use factor_core::FactorSourceKind;

    fn source(kind: FactorSourceKind) -> FactorSource {
        FactorSource::new(FactorSourceId::new(kind, [1u8; 32]), Utc::now())
    }

    #[test]
    fn test_lazy_and_prudent() {
        let ledger = source(FactorSourceKind::Ledger);
        assert!(LazySkip.should_attempt_skip(&ledger));
        assert!(!PrudentSkip.should_attempt_skip(&ledger));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let ledger = source(FactorSourceKind::Ledger);
        let mut a = RandomSkip::seeded(7);
        let mut b = RandomSkip::seeded(7);
        let flips_a: Vec<bool> = (0..64).map(|_| a.should_attempt_skip(&ledger)).collect();
        let flips_b: Vec<bool> = (0..64).map(|_| b.should_attempt_skip(&ledger)).collect();
        assert_eq!(flips_a, flips_b);
        // Both outcomes occur over 64 fair flips.
        assert!(flips_a.contains(&true));
        assert!(flips_a.contains(&false));
    }

    #[test]
    fn test_closure_policy() {
        let mut only_devices = |id: &FactorSourceId| id.kind() == FactorSourceKind::Device;
        assert!(only_devices.should_attempt_skip(&source(FactorSourceKind::Device)));
        assert!(!only_devices.should_attempt_skip(&source(FactorSourceKind::Yubikey)));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("lazy".parse::<SkipStrategy>().unwrap(), SkipStrategy::Lazy);
        assert_eq!(" Random ".parse::<SkipStrategy>().unwrap(), SkipStrategy::Random);
        assert!("sloppy".parse::<SkipStrategy>().is_err());
        assert_eq!(SkipStrategy::default(), SkipStrategy::Prudent);
    }

    #[test]
    fn test_strategy_builds_matching_policy() {
        let ledger = source(FactorSourceKind::Ledger);
        assert!(SkipStrategy::Lazy.into_policy(None).should_attempt_skip(&ledger));
        assert!(!SkipStrategy::Prudent.into_policy(None).should_attempt_skip(&ledger));
    }
}
