/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{ContractSide, OwnerType};

/// Server-issued single-use authentication challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: String,
    /// Canonical text to sign, UTF-8
    pub message: String,
    #[serde(default, alias = "expires_at")]
    pub expires_at_utc: Option<String>,
}

impl Challenge {
    /// Parse `expires_at_utc`; timestamps without an offset are read as UTC
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expires_at_utc.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Whether the challenge has already expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }
}

/// Ledger entity id (`shard.realm.num`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let [shard, realm, num] = parts.as_slice() else {
            return Err(format!("expected shard.realm.num, got {s:?}"));
        };
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| format!("invalid entity id component {part:?}: {e}"))
        };
        Ok(Self {
            shard: parse(shard)?,
            realm: parse(realm)?,
            num: parse(num)?,
        })
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Parts { shard: u64, realm: u64, num: u64 },
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Parts { shard, realm, num } => Ok(EntityId { shard, realm, num }),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Market configuration from `/api/v1/market/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    #[serde(default)]
    pub market_treasury: Option<EntityId>,
    #[serde(default)]
    pub settlement_token: Option<EntityId>,
    #[serde(default = "default_settlement_decimals")]
    pub settlement_decimals: u32,
    #[serde(default)]
    pub trading_pair: Option<String>,
    #[serde(default = "default_trading_decimals")]
    pub trading_decimals: u32,
    #[serde(default)]
    pub chain_id: Option<serde_json::Value>,
    #[serde(default)]
    pub ledger_id: Option<String>,
}

fn default_settlement_decimals() -> u32 {
    6
}

fn default_trading_decimals() -> u32 {
    8
}

impl MarketInfo {
    /// Settlement token base units scaled to whole tokens
    ///
    /// `None` if the market reports more decimals than `Decimal` can hold.
    pub fn settlement_amount(&self, base_units: i64) -> Option<Decimal> {
        Decimal::try_new(base_units, self.settlement_decimals).ok()
    }

    /// Trading (contract/price) base units scaled to whole units
    pub fn trading_amount(&self, base_units: u64) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(base_units), self.trading_decimals).ok()
    }
}

/// Account reference carried by account-scoped request bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub account_id: String,
    pub owner_type: OwnerType,
}

impl AccountRef {
    pub fn hapi(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            owner_type: OwnerType::Hapi,
        }
    }
}

/// Single aggregated orderbook level, in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: u64,
    pub total_quantity: u64,
    #[serde(default)]
    pub order_count: u32,
}

/// Orderbook depth snapshot; asks best-first, bids best-first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub asks: Vec<DepthLevel>,
    #[serde(default)]
    pub bids: Vec<DepthLevel>,
}

impl DepthSnapshot {
    pub fn best_ask(&self) -> Option<&DepthLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&DepthLevel> {
        self.bids.first()
    }

    /// Best ask minus best bid, in price base units
    pub fn spread(&self) -> Option<i128> {
        let ask = self.best_ask()?;
        let bid = self.best_bid()?;
        Some(ask.price as i128 - bid.price as i128)
    }
}

/// Resting order as reported by `/api/v1/account`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOrder {
    #[serde(
        default,
        alias = "id",
        deserialize_with = "serde_helpers::option_string_or_number"
    )]
    pub order_id: Option<String>,
    #[serde(default, alias = "side")]
    pub contract_side: Option<ContractSide>,
    #[serde(default)]
    pub price: u64,
    #[serde(default, alias = "quatity")]
    pub quantity: u64,
    #[serde(default)]
    pub margin: u64,
}

/// Open position as reported by `/api/v1/account`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    #[serde(
        alias = "postion_id",
        deserialize_with = "serde_helpers::string_or_number"
    )]
    pub position_id: String,
    #[serde(default)]
    pub contract_side: Option<ContractSide>,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub entry_price: u64,
    #[serde(default)]
    pub margin: u64,
    #[serde(default)]
    pub index: u64,
}

/// Account snapshot: balance, resting orders and open positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub evm_address: Option<String>,
    #[serde(default)]
    pub orders: Vec<AccountOrder>,
    #[serde(default)]
    pub positions: Vec<AccountPosition>,
}

/// Quantity of one position to settle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementQuantity {
    pub position_id: String,
    pub quantity: u64,
}

pub(crate) mod serde_helpers {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    impl From<StringOrNumber> for String {
        fn from(value: StringOrNumber) -> Self {
            match value {
                StringOrNumber::Text(text) => text,
                StringOrNumber::Unsigned(n) => n.to_string(),
                StringOrNumber::Signed(n) => n.to_string(),
            }
        }
    }

    /// Ids arrive as GUID strings on most endpoints and as integers on some
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(String::from)
    }

    pub fn option_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
    }

    pub fn vec_string_or_number<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<StringOrNumber>::deserialize(deserializer)
            .map(|values| values.into_iter().map(String::from).collect())
    }
}
