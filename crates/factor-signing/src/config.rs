//! Signing session configuration
//!
//! Loaded from TOML, then overridden by `FACTOR_SIGNING_*` environment
//! variables:
//!
//! ```toml
//! skip_strategy = "lazy"      # lazy | prudent | random
//! random_seed = 42            # random strategy only
//! verify_signatures = true
//! ```

use crate::policy::{SkipPolicy, SkipStrategy};
use crate::{Result, SigningError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "FACTOR_SIGNING_";

/// Configuration of a [`SigningSession`](crate::SigningSession)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// Built-in skip policy of the session
    pub skip_strategy: SkipStrategy,
    /// Seed of the random policy; `None` seeds from entropy
    pub random_seed: Option<u64>,
    /// Verify signer output against the instance key and intent
    pub verify_signatures: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            skip_strategy: SkipStrategy::Prudent,
            random_seed: None,
            verify_signatures: true,
        }
    }
}

impl SigningConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SigningError::config(format!("Invalid TOML: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SigningError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `FACTOR_SIGNING_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `FACTOR_SIGNING_*` overrides from `vars`; other names are ignored
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            if let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX) {
                self.set_from_string(&key.to_ascii_lowercase(), value.as_ref())?;
            }
        }
        Ok(())
    }

    /// Set one field from its string form
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "skip_strategy" => self.skip_strategy = value.parse()?,
            "random_seed" => {
                let seed = value.trim().parse::<u64>().map_err(|e| {
                    SigningError::config(format!("Invalid random_seed '{value}': {e}"))
                })?;
                self.random_seed = Some(seed);
            }
            "verify_signatures" => {
                self.verify_signatures = value.trim().parse::<bool>().map_err(|e| {
                    SigningError::config(format!("Invalid verify_signatures '{value}': {e}"))
                })?;
            }
            other => {
                return Err(SigningError::config(format!(
                    "Unknown configuration key '{other}'"
                )))
            }
        }
        Ok(())
    }

    /// Reject combinations that cannot take effect
    pub fn validate(&self) -> Result<()> {
        if self.random_seed.is_some() && self.skip_strategy != SkipStrategy::Random {
            return Err(SigningError::config(format!(
                "random_seed is only used by the random skip strategy, not {}",
                self.skip_strategy
            )));
        }
        Ok(())
    }

    /// Build the configured skip policy
    pub fn skip_policy(&self) -> Box<dyn SkipPolicy> {
        self.skip_strategy.into_policy(self.random_seed)
    }
}
