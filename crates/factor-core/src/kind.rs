//! Factor source kinds and their signing priority

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a factor source.
///
/// The derived `Ord` is the signing priority: lower kinds are asked to sign
/// first. Declaration order is therefore significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSourceKind {
    /// Ledger hardware wallet
    Ledger,
    /// Arculus card
    Arculus,
    /// Yubikey hardware key
    Yubikey,
    /// Mnemonic kept off the signing device
    OffDeviceMnemonic,
    /// Knowledge-based recovery (security questions)
    SecurityQuestions,
    /// Key held by this device
    Device,
}

impl FactorSourceKind {
    /// Every kind, in signing priority order.
    pub const ALL: [FactorSourceKind; 6] = [
        FactorSourceKind::Ledger,
        FactorSourceKind::Arculus,
        FactorSourceKind::Yubikey,
        FactorSourceKind::OffDeviceMnemonic,
        FactorSourceKind::SecurityQuestions,
        FactorSourceKind::Device,
    ];

    /// Stable discriminant used for domain separation in key derivation.
    pub fn discriminant(&self) -> u8 {
        match self {
            FactorSourceKind::Ledger => 0,
            FactorSourceKind::Arculus => 1,
            FactorSourceKind::Yubikey => 2,
            FactorSourceKind::OffDeviceMnemonic => 3,
            FactorSourceKind::SecurityQuestions => 4,
            FactorSourceKind::Device => 5,
        }
    }

    /// Snake case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorSourceKind::Ledger => "ledger",
            FactorSourceKind::Arculus => "arculus",
            FactorSourceKind::Yubikey => "yubikey",
            FactorSourceKind::OffDeviceMnemonic => "off_device_mnemonic",
            FactorSourceKind::SecurityQuestions => "security_questions",
            FactorSourceKind::Device => "device",
        }
    }
}

impl fmt::Display for FactorSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
