/*
[INPUT]:  Public key and signature bytes per signing algorithm
[OUTPUT]: Protobuf-compatible SignatureMap bytes (and the reverse)
[POS]:    Auth layer - hand-rolled wire encoding of the verify credential
[UPDATE]: When SignatureMap/SignaturePair field numbers change
*/

//! Minimal protobuf encoding of the ledger's `SignatureMap`.
//!
//! ```text
//! message SignatureMap  { repeated SignaturePair sigPair = 1; }
//! message SignaturePair {
//!     bytes pubKeyPrefix = 1;
//!     oneof signature { bytes ed25519 = 3; bytes ECDSA_secp256k1 = 6; }
//! }
//! ```
//!
//! Only length-delimited fields are written, so every tag is a single byte.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::http::{PerpsError, Result};
use crate::types::KeyAlgorithm;

/// `SignatureMap.sigPair` (field 1, length-delimited)
pub const SIG_PAIR_TAG: u8 = 0x0a;
/// `SignaturePair.pubKeyPrefix` (field 1, length-delimited)
pub const PUB_KEY_PREFIX_TAG: u8 = 0x0a;

const SIG_PAIR_FIELD: u64 = 1;
const PUB_KEY_PREFIX_FIELD: u64 = 1;

const WIRE_VARINT: u8 = 0;
const WIRE_LENGTH_DELIMITED: u8 = 2;
const MAX_VARINT_LEN: usize = 10;
const ED25519_SIGNATURE_LEN: usize = 64;

/// Base-128 varint, low groups first, continuation bit `0x80`
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    while value > 0x7f {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

/// Decode a varint from the front of `buf`, returning the value and bytes consumed
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (index, &byte) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        let group = u64::from(byte & 0x7f);
        let shift = 7 * index as u32;
        if index == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(PerpsError::Encoding("varint overflows 64 bits".to_string()));
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }

    if buf.len() >= MAX_VARINT_LEN {
        Err(PerpsError::Encoding("varint longer than 10 bytes".to_string()))
    } else {
        Err(PerpsError::Encoding("truncated varint".to_string()))
    }
}

/// Append `tag`, varint length and `payload`
pub(crate) fn write_length_delimited(out: &mut Vec<u8>, tag: u8, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        PerpsError::Encoding(format!(
            "field length {} exceeds the wire format limit",
            payload.len()
        ))
    })?;
    out.push(tag);
    out.extend_from_slice(&encode_varint(u64::from(len)));
    out.extend_from_slice(payload);
    Ok(())
}

/// One decoded protobuf field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field<'a> {
    Varint { number: u64 },
    Bytes { number: u64, payload: &'a [u8] },
}

/// Iterates the top-level fields of a protobuf message
///
/// Only varint and length-delimited wire types are accepted; anything else
/// is reported as an encoding error and ends iteration.
pub(crate) struct FieldReader<'a> {
    buf: &'a [u8],
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, failed: false }
    }

    fn read_field(&mut self) -> Result<Field<'a>> {
        let (key, used) = decode_varint(self.buf)?;
        self.buf = &self.buf[used..];
        let number = key >> 3;
        let wire_type = (key & 0x07) as u8;

        match wire_type {
            WIRE_VARINT => {
                let (_, used) = decode_varint(self.buf)?;
                self.buf = &self.buf[used..];
                Ok(Field::Varint { number })
            }
            WIRE_LENGTH_DELIMITED => {
                let (len, used) = decode_varint(self.buf)?;
                let rest = &self.buf[used..];
                let len = usize::try_from(len)
                    .ok()
                    .filter(|len| *len <= rest.len())
                    .ok_or_else(|| {
                        PerpsError::Encoding(format!(
                            "field {number} declares {len} bytes but only {} remain",
                            rest.len()
                        ))
                    })?;
                let (payload, rest) = rest.split_at(len);
                self.buf = rest;
                Ok(Field::Bytes { number, payload })
            }
            other => Err(PerpsError::Encoding(format!(
                "unsupported wire type {other} for field {number}"
            ))),
        }
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.buf.is_empty() {
            return None;
        }
        let field = self.read_field();
        self.failed = field.is_err();
        Some(field)
    }
}

/// A single (public key, signature) pair and the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMapEntry {
    algorithm: KeyAlgorithm,
    public_key: Vec<u8>,
    signature: Vec<u8>,
}

impl SignatureMapEntry {
    /// Create an entry, checking key and signature lengths against the algorithm
    pub fn new(
        algorithm: KeyAlgorithm,
        public_key: impl Into<Vec<u8>>,
        signature: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let public_key = public_key.into();
        let signature = signature.into();

        if public_key.len() != algorithm.public_key_len() {
            return Err(PerpsError::Encoding(format!(
                "{algorithm} public key must be {} bytes, got {}",
                algorithm.public_key_len(),
                public_key.len()
            )));
        }
        if signature.is_empty() {
            return Err(PerpsError::Encoding("signature is empty".to_string()));
        }
        if algorithm == KeyAlgorithm::Ed25519 && signature.len() != ED25519_SIGNATURE_LEN {
            return Err(PerpsError::Encoding(format!(
                "ed25519 signature must be {ED25519_SIGNATURE_LEN} bytes, got {}",
                signature.len()
            )));
        }

        Ok(Self {
            algorithm,
            public_key,
            signature,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Encoded `SignaturePair` message (without the outer `sigPair` tag)
    fn encode_pair(&self) -> Result<Vec<u8>> {
        let mut pair = Vec::with_capacity(4 + self.public_key.len() + self.signature.len());
        write_length_delimited(&mut pair, PUB_KEY_PREFIX_TAG, &self.public_key)?;
        write_length_delimited(&mut pair, self.algorithm.signature_tag(), &self.signature)?;
        Ok(pair)
    }

    fn decode_pair(buf: &[u8]) -> Result<Self> {
        let mut public_key = None;
        let mut signature = None;

        for field in FieldReader::new(buf) {
            match field? {
                Field::Bytes {
                    number: PUB_KEY_PREFIX_FIELD,
                    payload,
                } => public_key = Some(payload),
                Field::Bytes { number, payload } => {
                    let algorithm = signature_field_algorithm(number).ok_or_else(|| {
                        PerpsError::Encoding(format!("unexpected SignaturePair field {number}"))
                    })?;
                    if signature.replace((algorithm, payload)).is_some() {
                        return Err(PerpsError::Encoding(
                            "SignaturePair carries more than one signature".to_string(),
                        ));
                    }
                }
                Field::Varint { number, .. } => {
                    return Err(PerpsError::Encoding(format!(
                        "unexpected varint SignaturePair field {number}"
                    )));
                }
            }
        }

        let public_key = public_key
            .ok_or_else(|| PerpsError::Encoding("SignaturePair missing pubKeyPrefix".to_string()))?;
        let (algorithm, signature) = signature
            .ok_or_else(|| PerpsError::Encoding("SignaturePair missing signature".to_string()))?;
        Self::new(algorithm, public_key, signature)
    }
}

/// One or more signature pairs, encoded as a `SignatureMap` message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureMap {
    entries: Vec<SignatureMapEntry>,
}

impl SignatureMap {
    /// Map holding a single entry
    pub fn single(entry: SignatureMapEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    pub fn push(&mut self, entry: SignatureMapEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SignatureMapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(PerpsError::Encoding("signature map has no entries".to_string()));
        }

        let mut out = Vec::new();
        for entry in &self.entries {
            write_length_delimited(&mut out, SIG_PAIR_TAG, &entry.encode_pair()?)?;
        }
        Ok(out)
    }

    /// Serialize and encode as standard, padded base64
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.encode()?))
    }

    /// Parse wire bytes back into entries
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        for field in FieldReader::new(buf) {
            match field? {
                Field::Bytes {
                    number: SIG_PAIR_FIELD,
                    payload,
                } => map.push(SignatureMapEntry::decode_pair(payload)?),
                Field::Bytes { number, .. } | Field::Varint { number, .. } => {
                    return Err(PerpsError::Encoding(format!(
                        "unexpected SignatureMap field {number}"
                    )));
                }
            }
        }

        if map.is_empty() {
            return Err(PerpsError::Encoding("signature map has no entries".to_string()));
        }
        Ok(map)
    }

    /// Decode from standard base64
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| PerpsError::Encoding(format!("invalid signature map base64: {e}")))?;
        Self::decode(&bytes)
    }
}

fn signature_field_algorithm(number: u64) -> Option<KeyAlgorithm> {
    let number = u8::try_from(number).ok().filter(|n| *n < 16)?;
    KeyAlgorithm::from_signature_tag((number << 3) | WIRE_LENGTH_DELIMITED)
}

/// Single-pair Ed25519 signature map bytes
pub fn build_signature_map(public_key: &[u8], signature: &[u8]) -> Result<Vec<u8>> {
    build_signature_map_for(KeyAlgorithm::Ed25519, public_key, signature)
}

/// Single-pair signature map bytes for the given algorithm
pub fn build_signature_map_for(
    algorithm: KeyAlgorithm,
    public_key: &[u8],
    signature: &[u8],
) -> Result<Vec<u8>> {
    SignatureMap::single(SignatureMapEntry::new(algorithm, public_key, signature)?).encode()
}
