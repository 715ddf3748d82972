/*
[INPUT]:  Raw, DER or hex-encoded private key material and an algorithm
[OUTPUT]: Account signing keys, public key bytes and raw signatures
[POS]:    Auth layer - key loading and curve-specific signing
[UPDATE]: When adding key encodings or changing the ECDSA hash/encoding
*/

use std::fmt;

use ed25519_dalek::{Signer as _, Verifier as _};
use k256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};

use crate::http::{PerpsError, Result};
use crate::types::KeyAlgorithm;

/// PKCS#8 header the ledger uses for Ed25519 private keys
const ED25519_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Header the ledger uses for secp256k1 private keys (OID 1.3.132.0.10)
const ECDSA_SECP256K1_DER_PREFIX: [u8; 18] = [
    0x30, 0x30, 0x02, 0x01, 0x00, 0x30, 0x07, 0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x0a, 0x04, 0x22,
    0x04, 0x20,
];

const SECRET_LEN: usize = 32;

/// Account private key
///
/// Ed25519 is the fully exercised path. ECDSA secp256k1 signs the
/// Keccak-256 digest of the message with a random nonce and emits raw
/// `r || s`; treat it as provisional until the verifier's expected
/// encoding is confirmed.
#[derive(Clone)]
pub enum PrivateKey {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaSecp256k1(k256::ecdsa::SigningKey),
}

impl PrivateKey {
    /// Generate a new random key
    pub fn generate(algorithm: KeyAlgorithm) -> Self {
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                PrivateKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
            }
            KeyAlgorithm::EcdsaSecp256k1 => {
                PrivateKey::EcdsaSecp256k1(k256::ecdsa::SigningKey::random(&mut OsRng))
            }
        }
    }

    /// Load key bytes for `algorithm`
    ///
    /// Accepts the raw 32-byte secret, the ledger's DER encoding, or (Ed25519
    /// only) a 64-byte `seed || public key` keypair.
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(PerpsError::KeyLoad("private key is empty".to_string()));
        }

        if let Some((der_algorithm, secret)) = split_der(bytes) {
            if der_algorithm != algorithm {
                return Err(PerpsError::KeyLoad(format!(
                    "DER key is {der_algorithm}, expected {algorithm}"
                )));
            }
            return Self::from_secret(algorithm, secret);
        }

        match (algorithm, bytes.len()) {
            (_, SECRET_LEN) => Self::from_secret(algorithm, bytes),
            (KeyAlgorithm::Ed25519, 64) => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(bytes);
                ed25519_dalek::SigningKey::from_keypair_bytes(&keypair)
                    .map(PrivateKey::Ed25519)
                    .map_err(|e| PerpsError::KeyLoad(format!("invalid ed25519 keypair: {e}")))
            }
            (KeyAlgorithm::Ed25519, len) => Err(PerpsError::KeyLoad(format!(
                "ed25519 private key must be 32 or 64 bytes (or DER), got {len}"
            ))),
            (KeyAlgorithm::EcdsaSecp256k1, len) => Err(PerpsError::KeyLoad(format!(
                "secp256k1 private key must be 32 bytes (or DER), got {len}"
            ))),
        }
    }

    /// Load a DER-encoded key, inferring the algorithm from its header
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (algorithm, secret) = split_der(bytes).ok_or_else(|| {
            PerpsError::KeyLoad("unrecognised DER private key encoding".to_string())
        })?;
        Self::from_secret(algorithm, secret)
    }

    /// Load hex text (optional `0x` prefix) holding any form [`PrivateKey::from_bytes`] accepts
    pub fn from_hex(algorithm: KeyAlgorithm, text: &str) -> Result<Self> {
        Self::from_bytes(algorithm, &decode_hex(text)?)
    }

    /// Load hex-encoded DER, inferring the algorithm
    pub fn from_der_hex(text: &str) -> Result<Self> {
        Self::from_der(&decode_hex(text)?)
    }

    fn from_secret(algorithm: KeyAlgorithm, secret: &[u8]) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let seed: [u8; SECRET_LEN] = secret.try_into().map_err(|_| {
                    PerpsError::KeyLoad(format!(
                        "ed25519 seed must be {SECRET_LEN} bytes, got {}",
                        secret.len()
                    ))
                })?;
                Ok(PrivateKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(
                    &seed,
                )))
            }
            KeyAlgorithm::EcdsaSecp256k1 => k256::ecdsa::SigningKey::from_slice(secret)
                .map(PrivateKey::EcdsaSecp256k1)
                .map_err(|_| {
                    PerpsError::KeyLoad("secp256k1 scalar is zero or out of range".to_string())
                }),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Ed25519(_) => KeyAlgorithm::Ed25519,
            PrivateKey::EcdsaSecp256k1(_) => KeyAlgorithm::EcdsaSecp256k1,
        }
    }

    /// Public key as carried in the signature map: 32-byte Ed25519 point or
    /// 33-byte compressed secp256k1 point
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            PrivateKey::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            PrivateKey::EcdsaSecp256k1(key) => key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
        }
    }

    /// Public key as lowercase hex
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Sign raw message bytes
    ///
    /// Ed25519 signs the bytes directly (64-byte signature). secp256k1 signs
    /// their Keccak-256 digest and returns 64-byte `r || s` with low S.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        if message.is_empty() {
            return Err(PerpsError::Signing("refusing to sign an empty message".to_string()));
        }

        match self {
            PrivateKey::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
            PrivateKey::EcdsaSecp256k1(key) => {
                let digest = Keccak256::digest(message);
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash_with_rng(&mut OsRng, &digest)
                    .map_err(|e| PerpsError::Signing(format!("secp256k1 signing failed: {e}")))?;
                let signature = signature.normalize_s().unwrap_or(signature);
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Verify a signature produced by [`PrivateKey::sign`]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            PrivateKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .is_ok_and(|signature| key.verifying_key().verify(message, &signature).is_ok()),
            PrivateKey::EcdsaSecp256k1(key) => {
                let Ok(signature) = k256::ecdsa::Signature::from_slice(signature) else {
                    return false;
                };
                let digest = Keccak256::digest(message);
                key.verifying_key()
                    .verify_prehash(&digest, &signature)
                    .is_ok()
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

fn split_der(bytes: &[u8]) -> Option<(KeyAlgorithm, &[u8])> {
    let candidates: [(KeyAlgorithm, &[u8]); 2] = [
        (KeyAlgorithm::Ed25519, &ED25519_DER_PREFIX),
        (KeyAlgorithm::EcdsaSecp256k1, &ECDSA_SECP256K1_DER_PREFIX),
    ];
    candidates.into_iter().find_map(|(algorithm, prefix)| {
        bytes
            .strip_prefix(prefix)
            .filter(|secret| secret.len() == SECRET_LEN)
            .map(|secret| (algorithm, secret))
    })
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(text).map_err(|e| PerpsError::KeyLoad(format!("private key is not valid hex: {e}")))
}
