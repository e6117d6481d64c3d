//! Factor Signing - decides which factor sources sign a transaction
//!
//! Given a batch of entities that must each authorize a transaction, a
//! [`SigningSession`] works out which factor sources have to produce
//! signatures and which may be skipped:
//!
//! - **Per-entity processes** ([`process`]) track each entity's collected
//!   signatures, skipped factor sources and completion.
//! - **The factor-source index** ([`index`]) maps every needed factor source
//!   to the entities that depend on it, so a shared factor source signs for
//!   all of them in one round.
//! - **Kind ordering** ([`ordering`]) fixes the signing order: ledgers first,
//!   device keys last, least recently used first within a kind.
//! - **Skip policies** ([`policy`]) decide whether to try skipping: lazy,
//!   prudent, random, or any closure.
//! - **Signers** ([`signer`]) do the cryptographic work behind an async seam.
//!
//! ```ignore
//! let mut session = SigningSession::new(&catalog, entities, LazySkip)?;
//! let signatures = session.sign_transaction(&intent, &signer).await?;
//! ```

#![forbid(unsafe_code)]

/// Session errors and signer errors
pub mod errors;

/// Per-entity signing processes
pub mod process;

/// Kind-priority grouping of factor sources
pub mod ordering;

/// Factor source to owning entities index
pub mod index;

/// Skip policies
pub mod policy;

/// Signer seam and the in-memory keyring
pub mod signer;

/// Session configuration
pub mod config;

/// Signing session orchestration
pub mod session;

// === Public API Re-exports ===

pub use config::SigningConfig;
pub use errors::{Result, SignerError, SigningError};
pub use index::FactorSourceIndex;
pub use ordering::FactorSourcesOfKinds;
pub use policy::{LazySkip, PrudentSkip, RandomSkip, SkipPolicy, SkipStrategy};
pub use process::{
    EntitySigningProcess, SecurifiedSigningProcess, SigningProcess, UnsecurifiedSigningProcess,
};
pub use session::{SigningOutcome, SigningSession};
pub use signer::{FactorSourceSigner, SeededSigner};
