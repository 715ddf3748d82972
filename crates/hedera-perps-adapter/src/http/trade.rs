/*
[INPUT]:  Order and settlement parameters with bearer token
[OUTPUT]: Order, cancel and settlement results
[POS]:    HTTP layer - trading endpoints (require bearer auth)
[UPDATE]: When adding trade endpoints or changing order schemas
*/

use reqwest::Method;
use tracing::info;

use crate::http::client::with_idempotency_key;
use crate::http::{PerpsClient, PerpsError, Result};
use crate::types::{
    CancelOrderResponse, SettlePositionsRequest, SettlePositionsResponse, SettlementQuantity,
    SubmitOrderRequest, SubmitOrderResponse,
};

impl PerpsClient {
    /// Submit a market or limit order
    ///
    /// POST /api/v1/order/submit
    pub async fn submit_order(&self, order: &SubmitOrderRequest) -> Result<SubmitOrderResponse> {
        let builder = self
            .authed_request(Method::POST, "/api/v1/order/submit")?
            .json(order);
        let response: SubmitOrderResponse = self.send_json(with_idempotency_key(builder)).await?;

        info!(
            client_order_id = %order.client_order_id,
            order_id = response.order_id.as_deref().unwrap_or("-"),
            status = response.order_status.as_deref().unwrap_or("-"),
            filled = response.quantity_filled,
            "order submitted"
        );
        Ok(response)
    }

    /// Cancel a resting order
    ///
    /// DELETE /api/v1/order/cancel?orderId={order_id}
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelOrderResponse> {
        let builder = self
            .authed_request(Method::DELETE, "/api/v1/order/cancel")?
            .query(&[("orderId", order_id)]);
        self.send_json(with_idempotency_key(builder)).await
    }

    /// Settle (close) positions by quantity
    ///
    /// POST /api/v1/position/settle
    pub async fn settle_positions(
        &self,
        quantities: &[SettlementQuantity],
    ) -> Result<SettlePositionsResponse> {
        if quantities.is_empty() {
            return Err(PerpsError::Config(
                "settle_positions needs at least one position".to_string(),
            ));
        }

        let body = SettlePositionsRequest {
            settlement_quantities: quantities.to_vec(),
        };
        let builder = self
            .authed_request(Method::POST, "/api/v1/position/settle")?
            .json(&body);
        self.send_json(with_idempotency_key(builder)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::client::IDEMPOTENCY_KEY_HEADER;
    use crate::http::{PerpsClient, PerpsError};
    use crate::types::{ContractSide, SettlementQuantity, SubmitOrderRequest};
    use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authed_client(server: &MockServer) -> PerpsClient {
        let client = PerpsClient::new(&server.uri()).unwrap();
        client
            .token_manager()
            .set_token("tok".to_string(), "0.0.1001".to_string(), None);
        client
    }

    #[tokio::test]
    async fn test_submit_limit_order() {
        let server = MockServer::start().await;
        let order = SubmitOrderRequest::limit("0.0.1001", ContractSide::Short, 6_100, 25, 1_200_000);

        Mock::given(method("POST"))
            .and(path("/api/v1/order/submit"))
            .and(header_exists(IDEMPOTENCY_KEY_HEADER))
            .and(body_partial_json(serde_json::json!({
                "client_order_id": order.client_order_id,
                "kind": "limit",
                "side": "short",
                "price": 6_100,
                "quantity": 25,
                "margin": 1_200_000,
                "time_in_force": "good_until_filled",
                "account": {"account_id": "0.0.1001", "owner_type": "hapi"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "order_id": "o-1",
                "order_status": "open",
                "quantity_filled": 0,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = authed_client(&server).submit_order(&order).await.unwrap();
        assert_eq!(response.order_id.as_deref(), Some("o-1"));
        assert_eq!(response.order_status.as_deref(), Some("open"));
    }

    #[tokio::test]
    async fn test_submit_order_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/order/submit"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "title": "Unprocessable Entity",
                "detail": "insufficient margin",
            })))
            .mount(&server)
            .await;

        let order = SubmitOrderRequest::market("0.0.1001", ContractSide::Long, 1, 1);
        let err = authed_client(&server).submit_order(&order).await.unwrap_err();
        match err {
            PerpsError::Api { code, message } => {
                assert_eq!(code, 422);
                assert_eq!(message, "Unprocessable Entity: insufficient margin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/order/cancel"))
            .and(query_param("orderId", "o-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "order_id": "o-1",
                "unfilled_quantity": 25,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = authed_client(&server).cancel_order("o-1").await.unwrap();
        assert_eq!(response.unfilled_quantity, 25);
    }

    #[tokio::test]
    async fn test_settle_positions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/position/settle"))
            .and(body_partial_json(serde_json::json!({
                "settlement_quantities": [{"position_id": "p-1", "quantity": 3}],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"settlement_id": 88})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let response = client
            .settle_positions(&[SettlementQuantity {
                position_id: "p-1".to_string(),
                quantity: 3,
            }])
            .await
            .unwrap();
        assert_eq!(response.settlement_id.as_deref(), Some("88"));

        assert!(matches!(
            client.settle_positions(&[]).await,
            Err(PerpsError::Config(_))
        ));
    }
}
