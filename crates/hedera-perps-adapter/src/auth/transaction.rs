/*
[INPUT]:  Server-built SignedTransaction (base64) and the account key
[OUTPUT]: Re-encoded SignedTransaction carrying the account signature
[POS]:    Auth layer - co-signing of deposit transactions
[UPDATE]: When the transaction envelope or signature placement changes
*/

//! Deposit transactions arrive as a base64 `SignedTransaction`:
//!
//! ```text
//! message SignedTransaction {
//!     bytes bodyBytes = 1;
//!     SignatureMap sigMap = 2;
//! }
//! ```
//!
//! The account signs `bodyBytes` as-is (no HIP-820 envelope) and the
//! transaction is re-emitted with a signature map holding only that pair.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::http::{PerpsError, Result};

use super::key::PrivateKey;
use super::signature_map::{
    Field, FieldReader, SignatureMap, SignatureMapEntry, write_length_delimited,
};

const BODY_BYTES_FIELD: u64 = 1;
const BODY_BYTES_TAG: u8 = 0x0a;
const SIG_MAP_TAG: u8 = 0x12;

/// Extract `bodyBytes` from an encoded `SignedTransaction`
///
/// When the field repeats, the last occurrence wins.
pub fn transaction_body_bytes(signed_transaction: &[u8]) -> Result<&[u8]> {
    let mut body = None;
    for field in FieldReader::new(signed_transaction) {
        if let Field::Bytes {
            number: BODY_BYTES_FIELD,
            payload,
        } = field?
        {
            body = Some(payload);
        }
    }
    body.filter(|body| !body.is_empty()).ok_or_else(|| {
        PerpsError::Encoding("SignedTransaction has no bodyBytes".to_string())
    })
}

/// Sign the body of a base64 `SignedTransaction` and return the re-encoded base64
pub fn sign_transaction(key: &PrivateKey, transaction_base64: &str) -> Result<String> {
    let raw = STANDARD
        .decode(transaction_base64.trim())
        .map_err(|e| PerpsError::Encoding(format!("invalid transaction base64: {e}")))?;
    let body = transaction_body_bytes(&raw)?;

    let signature = key.sign(body)?;
    let sig_map = SignatureMap::single(SignatureMapEntry::new(
        key.algorithm(),
        key.public_key_bytes(),
        signature,
    )?)
    .encode()?;

    let mut signed = Vec::with_capacity(body.len() + sig_map.len() + 8);
    write_length_delimited(&mut signed, BODY_BYTES_TAG, body)?;
    write_length_delimited(&mut signed, SIG_MAP_TAG, &sig_map)?;

    debug!(
        body_len = body.len(),
        signed_len = signed.len(),
        "co-signed transaction"
    );
    Ok(STANDARD.encode(signed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature_map::encode_varint;
    use crate::types::KeyAlgorithm;

    fn envelope(body: &[u8], extra: &[u8]) -> Vec<u8> {
        let mut out = vec![BODY_BYTES_TAG];
        out.extend_from_slice(&encode_varint(body.len() as u64));
        out.extend_from_slice(body);
        out.extend_from_slice(extra);
        out
    }

    #[test]
    fn test_sign_transaction_replaces_signature_map() {
        let key = PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[3u8; 32]).unwrap();
        let body = vec![0x42u8; 150];
        // Server-provided sigMap with an unrelated pair
        let server_map = crate::auth::build_signature_map(&[0x01; 32], &[0x02; 64]).unwrap();
        let mut extra = vec![SIG_MAP_TAG];
        extra.extend_from_slice(&encode_varint(server_map.len() as u64));
        extra.extend_from_slice(&server_map);
        let input = STANDARD.encode(envelope(&body, &extra));

        let output = STANDARD.decode(sign_transaction(&key, &input).unwrap()).unwrap();

        let fields: Vec<_> = FieldReader::new(&output).collect::<Result<_>>().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields[0],
            Field::Bytes {
                number: 1,
                payload: &body[..]
            }
        );
        let Field::Bytes {
            number: 2,
            payload: sig_map,
        } = fields[1]
        else {
            panic!("expected sigMap field, got {:?}", fields[1]);
        };

        let map = SignatureMap::decode(sig_map).unwrap();
        assert_eq!(map.entries().len(), 1);
        let entry = &map.entries()[0];
        assert_eq!(entry.public_key(), key.public_key_bytes().as_slice());
        assert!(key.verify(&body, entry.signature()));
    }

    #[test]
    fn test_body_bytes_are_signed_without_envelope() {
        let key = PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[3u8; 32]).unwrap();
        let body = b"transaction body".to_vec();
        let input = STANDARD.encode(envelope(&body, &[]));

        let output = STANDARD.decode(sign_transaction(&key, &input).unwrap()).unwrap();
        let signature = &output[output.len() - 64..];
        assert!(key.verify(&body, signature));
        assert!(!key.verify(&crate::auth::hip820::wrap_message(&body), signature));
    }

    #[test]
    fn test_missing_body_is_an_encoding_error() {
        let key = PrivateKey::generate(KeyAlgorithm::Ed25519);
        // Only a varint field 3
        let input = STANDARD.encode([0x18, 0x01]);
        assert!(matches!(
            sign_transaction(&key, &input),
            Err(PerpsError::Encoding(_))
        ));
    }

    #[test]
    fn test_malformed_transaction_is_an_encoding_error() {
        let key = PrivateKey::generate(KeyAlgorithm::Ed25519);
        for input in ["%%%", STANDARD.encode([0x0a, 0x10, 0x01]).as_str()] {
            assert!(matches!(
                sign_transaction(&key, input),
                Err(PerpsError::Encoding(_))
            ));
        }
    }
}
