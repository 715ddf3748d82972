/*
[INPUT]:  Challenge text and an account identity
[OUTPUT]: Base64 SignatureMap credentials for the verify endpoint
[POS]:    Auth layer - signer abstraction used by the auth flow
[UPDATE]: When adding signer backends or changing credential format
*/

use async_trait::async_trait;

use crate::http::Result;
use crate::types::KeyAlgorithm;

use super::builder::SignedChallengeBuilder;
use super::key::PrivateKey;

/// Trait for challenge signing
///
/// Async so that hardware wallets and remote signers can implement it.
#[async_trait]
pub trait ChallengeSigner: Send + Sync {
    /// Ledger account id, e.g. `0.0.1234`
    fn account_id(&self) -> &str;

    /// Ledger the account lives on (`testnet`, `mainnet`, ...)
    fn ledger_id(&self) -> &str;

    /// Algorithm reported as `sig_type` to the verifier
    fn sig_type(&self) -> KeyAlgorithm;

    /// Sign the challenge text and return the base64 SignatureMap
    async fn sign_challenge(&self, message: &str) -> Result<String>;
}

/// Signer backed by a locally held private key
#[derive(Debug, Clone)]
pub struct AccountSigner {
    account_id: String,
    ledger_id: String,
    key: PrivateKey,
}

impl AccountSigner {
    pub fn new(
        account_id: impl Into<String>,
        ledger_id: impl Into<String>,
        key: PrivateKey,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            ledger_id: ledger_id.into(),
            key,
        }
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn builder(&self) -> SignedChallengeBuilder<'_> {
        SignedChallengeBuilder::new(&self.key)
    }
}

#[async_trait]
impl ChallengeSigner for AccountSigner {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    fn sig_type(&self) -> KeyAlgorithm {
        self.key.algorithm()
    }

    async fn sign_challenge(&self, message: &str) -> Result<String> {
        self.builder().build_auth_credential(message)
    }
}

/// Mock signer returning a fixed credential, for tests
#[derive(Debug, Clone)]
pub struct MockChallengeSigner {
    account_id: String,
    ledger_id: String,
    sig_type: KeyAlgorithm,
    credential: String,
}

impl MockChallengeSigner {
    pub fn new(account_id: &str, ledger_id: &str, credential: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            ledger_id: ledger_id.to_string(),
            sig_type: KeyAlgorithm::Ed25519,
            credential: credential.to_string(),
        }
    }

    pub fn with_sig_type(mut self, sig_type: KeyAlgorithm) -> Self {
        self.sig_type = sig_type;
        self
    }
}

#[async_trait]
impl ChallengeSigner for MockChallengeSigner {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    fn sig_type(&self) -> KeyAlgorithm {
        self.sig_type
    }

    async fn sign_challenge(&self, _message: &str) -> Result<String> {
        Ok(self.credential.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SignatureMap;

    #[tokio::test]
    async fn test_mock_signer() {
        let signer = MockChallengeSigner::new("0.0.1001", "testnet", "bW9jaw==")
            .with_sig_type(KeyAlgorithm::EcdsaSecp256k1);

        assert_eq!(signer.account_id(), "0.0.1001");
        assert_eq!(signer.ledger_id(), "testnet");
        assert_eq!(signer.sig_type(), KeyAlgorithm::EcdsaSecp256k1);
        assert_eq!(signer.sign_challenge("anything").await.unwrap(), "bW9jaw==");
    }

    #[tokio::test]
    async fn test_account_signer_matches_builder() {
        let key = PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[9u8; 32]).unwrap();
        let signer = AccountSigner::new("0.0.1001", "testnet", key.clone());

        let credential = signer.sign_challenge("hello").await.unwrap();
        assert_eq!(
            credential,
            SignedChallengeBuilder::new(&key).build_auth_credential("hello").unwrap()
        );

        let map = SignatureMap::from_base64(&credential).unwrap();
        assert_eq!(map.entries()[0].public_key(), key.public_key_bytes().as_slice());
        assert_eq!(signer.sig_type(), KeyAlgorithm::Ed25519);
    }
}
