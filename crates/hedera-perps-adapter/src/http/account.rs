/*
[INPUT]:  Account id and bearer token
[OUTPUT]: Account details, balances and deposit results
[POS]:    HTTP layer - account endpoints (require bearer auth)
[UPDATE]: When adding account endpoints or changing query parameters
*/

use reqwest::Method;
use tracing::info;

use crate::http::client::with_idempotency_key;
use crate::http::{PerpsClient, Result};
use crate::types::{
    AccountDetails, AccountRef, BalanceResponse, DepositResponse, DepositTransactionRequest,
    DepositTransactionResponse, OwnerType, SubmitDepositRequest,
};

impl PerpsClient {
    /// Account balance, open orders and positions
    ///
    /// GET /api/v1/account?accountId={account_id}&ownerType=Hapi
    pub async fn account(&self, account_id: &str) -> Result<AccountDetails> {
        let builder = self
            .authed_request(Method::GET, "/api/v1/account")?
            .query(&account_query(account_id));
        self.send_json(builder).await
    }

    /// Settlement balance in base units
    ///
    /// GET /api/v1/account/balance?accountId={account_id}&ownerType=Hapi
    pub async fn balance(&self, account_id: &str) -> Result<BalanceResponse> {
        let builder = self
            .authed_request(Method::GET, "/api/v1/account/balance")?
            .query(&account_query(account_id));
        self.send_json(builder).await
    }

    /// Ask the backend to build a deposit transfer for `amount` base units
    ///
    /// POST /api/v1/account/deposit/transaction
    pub async fn create_deposit_transaction(
        &self,
        account_id: &str,
        amount: u64,
    ) -> Result<DepositTransactionResponse> {
        let body = DepositTransactionRequest {
            account: AccountRef::hapi(account_id),
            amount,
        };
        let builder = self
            .authed_request(Method::POST, "/api/v1/account/deposit/transaction")?
            .json(&body);
        self.send_json(with_idempotency_key(builder)).await
    }

    /// Submit the co-signed deposit transaction
    ///
    /// POST /api/v1/account/deposit
    pub async fn submit_deposit(
        &self,
        account_id: &str,
        signed_transaction_base64: &str,
    ) -> Result<DepositResponse> {
        let body = SubmitDepositRequest {
            account: AccountRef::hapi(account_id),
            signed_transaction_to_base64_string: signed_transaction_base64.to_string(),
            rlp_encoded_to_base64_string: None,
        };
        let builder = self
            .authed_request(Method::POST, "/api/v1/account/deposit")?
            .json(&body);
        let response: DepositResponse = self.send_json(with_idempotency_key(builder)).await?;

        info!(
            account_id,
            balance = response.balance,
            transaction_id = response.transaction_id.as_deref().unwrap_or("-"),
            "deposit submitted"
        );
        Ok(response)
    }
}

fn account_query(account_id: &str) -> [(&'static str, &str); 2] {
    [
        ("accountId", account_id),
        ("ownerType", OwnerType::Hapi.query_value()),
    ]
}

#[cfg(test)]
mod tests {
    use crate::http::client::IDEMPOTENCY_KEY_HEADER;
    use crate::http::{PerpsClient, PerpsError};
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authed_client(server: &MockServer) -> PerpsClient {
        let client = PerpsClient::new(&server.uri()).unwrap();
        client
            .token_manager()
            .set_token("tok".to_string(), "0.0.1001".to_string(), Some(600));
        client
    }

    #[tokio::test]
    async fn test_account_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/account"))
            .and(query_param("accountId", "0.0.1001"))
            .and(query_param("ownerType", "Hapi"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "account_id": "0.0.1001",
                "balance": 25_000_000,
                "orders": [],
                "positions": [{"postion_id": "p-9", "contract_side": "long", "quantity": 3}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server).await;
        let details = client.account("0.0.1001").await.unwrap();
        assert_eq!(details.balance, 25_000_000);
        assert_eq!(details.positions[0].position_id, "p-9");
    }

    #[tokio::test]
    async fn test_balance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/account/balance"))
            .and(query_param("accountId", "0.0.1001"))
            .and(query_param("ownerType", "Hapi"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"balance": 1234})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server).await;
        assert_eq!(client.balance("0.0.1001").await.unwrap().balance, 1234);
    }

    #[tokio::test]
    async fn test_deposit_flow_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/account/deposit/transaction"))
            .and(header_exists(IDEMPOTENCY_KEY_HEADER))
            .and(body_json(serde_json::json!({
                "account": {"account_id": "0.0.1001", "owner_type": "hapi"},
                "amount": 40_000_000,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment": {"signed_transaction_to_base64_string": "CgA="},
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/account/deposit"))
            .and(header_exists(IDEMPOTENCY_KEY_HEADER))
            .and(body_json(serde_json::json!({
                "account": {"account_id": "0.0.1001", "owner_type": "hapi"},
                "signed_transaction_to_base64_string": "c2lnbmVk",
                "rlp_encoded_to_base64_string": null,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "balance": 40_000_000,
                "transaction_id": "0.0.1001@1700000000.000000001",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server).await;
        let prepared = client
            .create_deposit_transaction("0.0.1001", 40_000_000)
            .await
            .unwrap();
        assert_eq!(prepared.payment.signed_transaction_to_base64_string, "CgA=");

        let deposit = client.submit_deposit("0.0.1001", "c2lnbmVk").await.unwrap();
        assert_eq!(deposit.balance, 40_000_000);
        assert_eq!(
            deposit.transaction_id.as_deref(),
            Some("0.0.1001@1700000000.000000001")
        );
    }

    #[tokio::test]
    async fn test_account_without_token_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = PerpsClient::new(&server.uri()).unwrap();
        assert!(matches!(
            client.balance("0.0.1001").await,
            Err(PerpsError::TokenExpired)
        ));
    }
}
