//! Key material for factor sources
//!
//! A factor source is backed by a 32-byte seed. Every factor instance an
//! entity uses is an Ed25519 key derived from that seed at a derivation
//! index with HKDF-SHA256:
//!
//! ```text
//! seed ──HKDF(salt = "factor:v1:hkdf", info = "factor:v1:root")──────────────▶ root key ──▶ FactorSourceId
//! seed ──HKDF(salt = "factor:v1:hkdf", info = "factor:v1:instance:" ‖ index)──▶ instance key
//! ```
//!
//! Actual signing with hardware factor sources happens outside this crate;
//! software-held seeds use the same derivation so both paths agree on
//! instance public keys.

use crate::{FactorError, FactorSourceId, FactorSourceKind, Result};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::{Zeroize, ZeroizeOnDrop};

const HKDF_SALT: &[u8] = b"factor:v1:hkdf";
const ROOT_INFO: &[u8] = b"factor:v1:root";
const INSTANCE_INFO_PREFIX: &[u8] = b"factor:v1:instance:";

/// Secret entropy behind one factor source.
///
/// Never serialized and zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FactorSeed([u8; 32]);

impl FactorSeed {
    /// Wrap raw seed bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn expand(&self, info: &[u8]) -> Result<SigningKey> {
        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), &self.0);
        let mut okm = [0u8; 32];
        hkdf.expand(info, &mut okm)
            .map_err(|e| FactorError::crypto(format!("HKDF expansion failed: {e}")))?;
        let key = SigningKey::from_bytes(&okm);
        okm.zeroize();
        Ok(key)
    }

    /// Root signing key of the factor source
    pub fn root_signing_key(&self) -> Result<SigningKey> {
        self.expand(ROOT_INFO)
    }

    /// Identity of the factor source backed by this seed
    pub fn factor_source_id(&self, kind: FactorSourceKind) -> Result<FactorSourceId> {
        let root = self.root_signing_key()?.verifying_key();
        Ok(FactorSourceId::from_root_public_key(kind, root.as_bytes()))
    }

    /// Signing key of the factor instance at `index`
    pub fn derive_signing_key(&self, index: u32) -> Result<SigningKey> {
        let mut info = Vec::with_capacity(INSTANCE_INFO_PREFIX.len() + 4);
        info.extend_from_slice(INSTANCE_INFO_PREFIX);
        info.extend_from_slice(&index.to_be_bytes());
        self.expand(&info)
    }

    /// Public key of the factor instance at `index`
    pub fn derive_public_key(&self, index: u32) -> Result<PublicKey> {
        Ok(PublicKey(self.derive_signing_key(index)?.verifying_key()))
    }
}

impl fmt::Debug for FactorSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FactorSeed(<redacted>)")
    }
}

/// Ed25519 public key of a factor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Wrap a verifying key
    pub fn new(key: VerifyingKey) -> Self {
        Self(key)
    }

    /// Decode from compressed point bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| FactorError::crypto(format!("Invalid Ed25519 public key: {e}")))
    }

    /// Compressed point bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Inner verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }

    /// Verify `signature` over `message`
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify(message, &signature.0).is_ok()
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_bytes().hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.as_bytes()))
    }
}

/// Ed25519 signature produced by a factor source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Sign `message` with `key`
    pub fn sign(key: &SigningKey, message: &[u8]) -> Self {
        Self(key.sign(message))
    }

    /// Decode from the 64-byte encoding
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(bytes))
    }

    /// The 64-byte encoding
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bytes().hash(state);
    }
}
