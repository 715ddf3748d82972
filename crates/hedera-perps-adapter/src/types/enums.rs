/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Signature algorithm of an account key, sent as `sig_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    #[serde(rename = "ed25519")]
    Ed25519,
    #[serde(rename = "ecdsa_secp256k1")]
    EcdsaSecp256k1,
}

impl KeyAlgorithm {
    /// Wire name used in request bodies and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::EcdsaSecp256k1 => "ecdsa_secp256k1",
        }
    }

    /// Expected public key length: raw Ed25519 point or compressed secp256k1 point
    pub fn public_key_len(&self) -> usize {
        match self {
            KeyAlgorithm::Ed25519 => 32,
            KeyAlgorithm::EcdsaSecp256k1 => 33,
        }
    }

    /// Tag byte of the `SignaturePair` signature field for this algorithm
    ///
    /// `ed25519 = 3` and `ECDSA_secp256k1 = 6`, both length-delimited.
    pub fn signature_tag(&self) -> u8 {
        match self {
            KeyAlgorithm::Ed25519 => 0x1a,
            KeyAlgorithm::EcdsaSecp256k1 => 0x32,
        }
    }

    /// Reverse of [`KeyAlgorithm::signature_tag`]
    pub fn from_signature_tag(tag: u8) -> Option<Self> {
        match tag {
            0x1a => Some(KeyAlgorithm::Ed25519),
            0x32 => Some(KeyAlgorithm::EcdsaSecp256k1),
            _ => None,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account owner kind. Bodies use the lowercase form, query strings `Hapi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerType {
    #[serde(rename = "hapi", alias = "Hapi")]
    Hapi,
}

impl OwnerType {
    pub fn query_value(&self) -> &'static str {
        match self {
            OwnerType::Hapi => "Hapi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractSide {
    #[serde(alias = "Long", alias = "buy")]
    Long,
    #[serde(alias = "Short", alias = "sell")]
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    GoodUntilFilled,
}
