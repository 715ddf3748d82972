/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::serde_helpers;

/// Response of `POST /api/v1/auth/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub access_token: String,
    /// Token lifetime in seconds, when the server reports it
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    #[serde(default, deserialize_with = "serde_helpers::option_string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub quantity_filled: u64,
    #[serde(default, deserialize_with = "serde_helpers::option_string_or_number")]
    pub trade_id: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::vec_string_or_number")]
    pub position_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    #[serde(default, deserialize_with = "serde_helpers::option_string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub unfilled_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlePositionsResponse {
    #[serde(default, deserialize_with = "serde_helpers::option_string_or_number")]
    pub settlement_id: Option<String>,
}

/// Unsigned deposit transfer prepared by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositTransactionResponse {
    pub payment: DepositPayment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayment {
    /// Base64 `SignedTransaction` awaiting the account's signature
    pub signed_transaction_to_base64_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositResponse {
    #[serde(default)]
    pub balance: i64,
    #[serde(default, deserialize_with = "serde_helpers::option_string_or_number")]
    pub transaction_id: Option<String>,
}
