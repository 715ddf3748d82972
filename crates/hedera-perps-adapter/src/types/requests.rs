/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ContractSide, KeyAlgorithm, OrderKind, TimeInForce};
use super::models::{AccountRef, SettlementQuantity};

/// Body of `POST /api/v1/auth/challenge`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub account_id: String,
    pub ledger_id: String,
    pub method: String,
}

impl ChallengeRequest {
    /// Message-signing challenge for an account on a ledger
    pub fn message(account_id: impl Into<String>, ledger_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ledger_id: ledger_id.into(),
            method: "message".to_string(),
        }
    }
}

/// Body of `POST /api/v1/auth/verify`
///
/// `message_signed_plain_text` is the challenge text as issued, not the
/// HIP-820 wrapped bytes that were actually signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub challenge_id: String,
    pub account_id: String,
    pub message_signed_plain_text: String,
    pub signature_map_base64: String,
    pub sig_type: KeyAlgorithm,
}

/// Body of `POST /api/v1/order/submit`. Prices and quantities are base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    pub client_order_id: String,
    pub kind: OrderKind,
    /// Initial margin factor in settlement base units, not an absolute amount
    pub margin: u64,
    pub account: AccountRef,
    pub price: u64,
    pub quantity: u64,
    pub side: ContractSide,
    pub time_in_force: TimeInForce,
}

impl SubmitOrderRequest {
    /// Good-until-filled limit order with a generated client order id
    pub fn limit(
        account_id: impl Into<String>,
        side: ContractSide,
        price: u64,
        quantity: u64,
        margin: u64,
    ) -> Self {
        Self {
            client_order_id: new_client_order_id(),
            kind: OrderKind::Limit,
            margin,
            account: AccountRef::hapi(account_id),
            price,
            quantity,
            side,
            time_in_force: TimeInForce::GoodUntilFilled,
        }
    }

    /// Market order; the API requires a zero price
    pub fn market(
        account_id: impl Into<String>,
        side: ContractSide,
        quantity: u64,
        margin: u64,
    ) -> Self {
        Self {
            kind: OrderKind::Market,
            price: 0,
            ..Self::limit(account_id, side, 0, quantity, margin)
        }
    }
}

fn new_client_order_id() -> String {
    format!("rs-{}", Uuid::new_v4().simple())
}

/// Body of `POST /api/v1/account/deposit/transaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositTransactionRequest {
    pub account: AccountRef,
    /// Settlement token base units
    pub amount: u64,
}

/// Body of `POST /api/v1/account/deposit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitDepositRequest {
    pub account: AccountRef,
    pub signed_transaction_to_base64_string: String,
    pub rlp_encoded_to_base64_string: Option<String>,
}

/// Body of `POST /api/v1/position/settle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlePositionsRequest {
    pub settlement_quantities: Vec<SettlementQuantity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_request_body() {
        let body = serde_json::to_value(ChallengeRequest::message("0.0.1", "testnet")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"account_id": "0.0.1", "ledger_id": "testnet", "method": "message"})
        );
    }

    #[test]
    fn test_market_order_has_zero_price() {
        let order = SubmitOrderRequest::market("0.0.1", ContractSide::Long, 10, 1_200_000);
        assert_eq!(order.kind, OrderKind::Market);
        assert_eq!(order.price, 0);
        assert!(order.client_order_id.starts_with("rs-"));

        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(body["account"]["owner_type"], "hapi");
        assert_eq!(body["side"], "long");
        assert_eq!(body["time_in_force"], "good_until_filled");
    }

    #[test]
    fn test_client_order_ids_are_unique() {
        let a = SubmitOrderRequest::limit("0.0.1", ContractSide::Short, 1, 1, 1);
        let b = SubmitOrderRequest::limit("0.0.1", ContractSide::Short, 1, 1, 1);
        assert_ne!(a.client_order_id, b.client_order_id);
    }

    #[test]
    fn test_submit_deposit_serializes_null_rlp() {
        let body = serde_json::to_value(SubmitDepositRequest {
            account: AccountRef::hapi("0.0.1"),
            signed_transaction_to_base64_string: "AAAA".to_string(),
            rlp_encoded_to_base64_string: None,
        })
        .unwrap();
        assert!(body["rlp_encoded_to_base64_string"].is_null());
    }
}
