/*
[INPUT]:  Challenge text and an account private key
[OUTPUT]: Base64 SignatureMap credential and verify request bodies
[POS]:    Auth layer - composes HIP-820 wrapping, signing and map encoding
[UPDATE]: When the credential format or verify body changes
*/

use tracing::debug;

use crate::http::Result;
use crate::types::{Challenge, VerifyRequest};

use super::hip820;
use super::key::PrivateKey;
use super::signature_map::{SignatureMap, SignatureMapEntry};

/// Turns server challenges into signed credentials for one key
#[derive(Debug, Clone, Copy)]
pub struct SignedChallengeBuilder<'a> {
    key: &'a PrivateKey,
}

impl<'a> SignedChallengeBuilder<'a> {
    pub fn new(key: &'a PrivateKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &'a PrivateKey {
        self.key
    }

    /// HIP-820 envelope for the challenge text
    pub fn wrap_message(&self, message: &str) -> Vec<u8> {
        hip820::wrap_message(message.as_bytes())
    }

    /// Wrap and sign `message`, returning the one-entry signature map
    pub fn sign_challenge(&self, message: &str) -> Result<SignatureMap> {
        let wrapped = self.wrap_message(message);
        let signature = self.key.sign(&wrapped)?;
        let entry =
            SignatureMapEntry::new(self.key.algorithm(), self.key.public_key_bytes(), signature)?;

        debug!(
            algorithm = %self.key.algorithm(),
            message_len = message.len(),
            wrapped_len = wrapped.len(),
            "signed challenge"
        );
        Ok(SignatureMap::single(entry))
    }

    /// Base64 SignatureMap over the HIP-820 wrapped `message`
    pub fn build_auth_credential(&self, message: &str) -> Result<String> {
        let credential = self.sign_challenge(message)?.to_base64()?;
        debug!(credential_len = credential.len(), "built auth credential");
        Ok(credential)
    }

    /// Body for `POST /api/v1/auth/verify`
    ///
    /// The plain text carries the challenge as issued; only the signature
    /// covers the wrapped bytes.
    pub fn build_verify_request(
        &self,
        challenge: &Challenge,
        account_id: &str,
    ) -> Result<VerifyRequest> {
        Ok(VerifyRequest {
            challenge_id: challenge.challenge_id.clone(),
            account_id: account_id.to_string(),
            message_signed_plain_text: challenge.message.clone(),
            signature_map_base64: self.build_auth_credential(&challenge.message)?,
            sig_type: self.key.algorithm(),
        })
    }
}

/// Build the base64 credential for `message` with `key`
pub fn build_auth_credential(key: &PrivateKey, message: &str) -> Result<String> {
    SignedChallengeBuilder::new(key).build_auth_credential(message)
}
