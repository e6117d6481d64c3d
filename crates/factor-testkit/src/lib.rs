//! Factor Signing Testing Infrastructure
//!
//! Shared fixtures, proptest strategies and mock signers for the factor
//! crates' integration tests.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! factor-testkit = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use factor_testkit::*;
//!
//! #[tokio::test]
//! async fn alice_signs() {
//!     init_test_tracing();
//!     let profile = TestProfile::new();
//!     let mut session = SigningSession::new(&profile.catalog, [profile.alice()], LazySkip)?;
//!     session.sign_transaction(&intent, &profile.signer).await?;
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod mocks;
pub mod strategies;
pub mod tracing;

pub use fixtures::*;
pub use mocks::*;
pub use strategies::{
    arb_disjoint_scenario, arb_factor_source_kind, arb_shared_scenario, EntityShape, Scenario,
    ScenarioShape,
};
pub use tracing::init_test_tracing;
