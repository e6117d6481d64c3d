//! Factor Core - data model for multi-factor transaction signing
//!
//! This crate defines what a signing session works on, with no session
//! logic of its own:
//!
//! - **Factor sources**: signing capability units (ledgers, hardware keys,
//!   device keys, security questions) with a kind and a last-used time, and
//!   the catalog of all factor sources a profile knows about.
//! - **Factor instances**: per-entity Ed25519 keys derived from a factor
//!   source at a derivation index.
//! - **Entities**: accounts or identities controlled either by a single
//!   factor or by threshold and override factors.
//! - **Signatures**: attributed to the entity and factor instance that
//!   produced them.
//!
//! Security structures are validated on construction; a
//! [`SecurifiedEntityControl`] that exists is always well formed.

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Factor source kinds and signing priority
pub mod kind;

/// Factor source, entity and transaction identifiers
pub mod identifiers;

/// Seeds, key derivation, public keys and signatures
pub mod crypto;

/// Factor sources and the profile catalog
pub mod factor_source;

/// Factor instances
pub mod instance;

/// Entities and security structures
pub mod entity;

/// Attributed signatures
pub mod signature;

// === Public API Re-exports ===

pub use crypto::{FactorSeed, PublicKey, Signature};
pub use entity::{Entity, SecurifiedEntityControl, SecurityState, UnsecurifiedEntityControl};
pub use errors::{FactorError, Result};
pub use factor_source::{FactorSource, FactorSourceCatalog};
pub use identifiers::{EntityAddress, FactorSourceId, TransactionIntentHash};
pub use instance::{FactorInstance, OwnedFactorInstance};
pub use kind::FactorSourceKind;
pub use signature::SignatureByFactorOfEntity;
