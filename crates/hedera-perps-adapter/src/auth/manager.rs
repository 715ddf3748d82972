/*
[INPUT]:  Challenge signer and HTTP client
[OUTPUT]: Authenticated credentials (access token)
[POS]:    Auth layer - orchestrates the challenge/verify flow
[UPDATE]: When auth endpoints or flow steps change
*/

use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::http::{PerpsClient, PerpsError, Result};
use crate::types::{Challenge, ChallengeRequest, VerifyRequest, VerifyResponse};

use super::key::PrivateKey;
use super::signer::{AccountSigner, ChallengeSigner};
use super::token::{TokenManager, token_suffix};

/// Manages the challenge/verify authentication flow
///
/// Tokens land in the client's [`TokenManager`], so authenticated endpoints
/// on the same client (or its clones) pick them up.
#[derive(Debug, Clone)]
pub struct AuthManager {
    client: PerpsClient,
}

impl AuthManager {
    pub fn new(client: PerpsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PerpsClient {
        &self.client
    }

    pub fn token_manager(&self) -> &TokenManager {
        self.client.token_manager()
    }

    /// Step 1: request a message challenge for the account
    ///
    /// POST /api/v1/auth/challenge
    pub async fn request_challenge(&self, account_id: &str, ledger_id: &str) -> Result<Challenge> {
        let body = ChallengeRequest::message(account_id, ledger_id);
        let builder = self
            .client
            .request(Method::POST, "/api/v1/auth/challenge")?
            .json(&body);
        let challenge: Challenge = self.client.send_json(builder).await?;

        debug!(
            challenge_id = %challenge.challenge_id,
            message_len = challenge.message.len(),
            expires_at = challenge.expires_at_utc.as_deref().unwrap_or("-"),
            "received challenge"
        );
        Ok(challenge)
    }

    /// Step 2: submit the signed challenge
    ///
    /// POST /api/v1/auth/verify
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        let builder = self
            .client
            .request(Method::POST, "/api/v1/auth/verify")?
            .json(request);
        let response: VerifyResponse = self.client.send_json(builder).await?;

        if response.access_token.trim().is_empty() {
            return Err(PerpsError::InvalidResponse(
                "verify response has an empty access_token".to_string(),
            ));
        }
        Ok(response)
    }

    /// Fetch a fresh challenge and sign it, without submitting
    pub async fn prepare_verify(&self, signer: &dyn ChallengeSigner) -> Result<VerifyRequest> {
        let challenge = self
            .request_challenge(signer.account_id(), signer.ledger_id())
            .await?;
        if challenge.is_expired_at(Utc::now()) {
            warn!(
                challenge_id = %challenge.challenge_id,
                "challenge already past its expiry, signing anyway"
            );
        }

        let signature_map_base64 = signer.sign_challenge(&challenge.message).await?;
        Ok(VerifyRequest {
            challenge_id: challenge.challenge_id,
            account_id: signer.account_id().to_string(),
            message_signed_plain_text: challenge.message,
            signature_map_base64,
            sig_type: signer.sig_type(),
        })
    }

    /// Complete authentication flow
    ///
    /// 1. Request challenge
    /// 2. Sign the HIP-820 wrapped challenge
    /// 3. Verify to get an access token
    /// 4. Store the token
    pub async fn authenticate(&self, signer: &dyn ChallengeSigner) -> Result<VerifyResponse> {
        let request = self.prepare_verify(signer).await?;
        let response = self.verify(&request).await?;

        self.token_manager().set_token(
            response.access_token.clone(),
            signer.account_id().to_string(),
            response.expires_in,
        );

        info!(
            account_id = signer.account_id(),
            sig_type = %signer.sig_type(),
            token = token_suffix(&response.access_token),
            expires_in = response.expires_in,
            "authenticated"
        );
        Ok(response)
    }

    /// Authenticate with a locally held key
    pub async fn authenticate_with_key(
        &self,
        account_id: &str,
        ledger_id: &str,
        key: PrivateKey,
    ) -> Result<VerifyResponse> {
        let signer = AccountSigner::new(account_id, ledger_id, key);
        self.authenticate(&signer).await
    }
}
