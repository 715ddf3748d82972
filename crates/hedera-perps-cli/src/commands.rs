/*
[INPUT]:  Loaded config, account key and API client
[OUTPUT]: JSON reports and reproducible curl commands for the console
[POS]:    Command layer - thin glue between CLI flags and the adapter
[UPDATE]: When adding subcommands or changing their output
*/

use anyhow::{Context, Result, bail};
use hedera_perps_adapter::{
    AccountPosition, AccountSigner, AuthManager, CancelOrderResponse, ContractSide,
    DepositResponse, PerpsClient, PrivateKey, SettlePositionsResponse, SettlementQuantity,
    SignedChallengeBuilder, VerifyRequest, sign_transaction, unwrap_message,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CliConfig;

/// Offline credential for a message, with a local self-check
#[derive(Debug, Clone, Serialize)]
pub struct CredentialReport {
    pub sig_type: String,
    pub public_key_hex: String,
    pub message: String,
    pub wrapped_len: usize,
    pub signature_map_base64: String,
    pub self_verified: bool,
}

pub fn credential_report(key: &PrivateKey, message: &str) -> Result<CredentialReport> {
    let builder = SignedChallengeBuilder::new(key);
    let wrapped = builder.wrap_message(message);
    let map = builder
        .sign_challenge(message)
        .context("sign message")?;
    let envelope_ok = unwrap_message(&wrapped) == Some(message.as_bytes());
    let self_verified = envelope_ok
        && map
            .entries()
            .iter()
            .all(|entry| key.verify(&wrapped, entry.signature()));

    Ok(CredentialReport {
        sig_type: key.algorithm().to_string(),
        public_key_hex: key.public_key_hex(),
        message: message.to_string(),
        wrapped_len: wrapped.len(),
        signature_map_base64: map.to_base64().context("encode signature map")?,
        self_verified,
    })
}

/// Shell command that replays a verify request
pub fn render_curl(url: &str, request: &VerifyRequest) -> Result<String> {
    let body = serde_json::to_string(request).context("serialize verify request")?;
    Ok(format!(
        "curl -X POST {} \\\n  -H 'Content-Type: application/json' \\\n  -d {}",
        shell_quote(url),
        shell_quote(&body)
    ))
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r#"'\''"#))
}

/// Signer for the configured account
pub fn account_signer(config: &CliConfig, key: PrivateKey) -> AccountSigner {
    AccountSigner::new(
        config.account.account_id.clone(),
        config.account.ledger_id.clone(),
        key,
    )
}

/// Authenticate and return a client whose token store holds the new token
pub async fn authenticated_client(config: &CliConfig, key: PrivateKey) -> Result<PerpsClient> {
    let client = config.client()?;
    let auth = AuthManager::new(client.clone());
    auth.authenticate(&account_signer(config, key))
        .await
        .context("authenticate")?;
    info!(account_id = %config.account.account_id, "session ready");
    Ok(client)
}

/// Fetch and sign a challenge without submitting it
pub async fn prepare_curl(config: &CliConfig, key: PrivateKey) -> Result<String> {
    let client = config.client()?;
    let auth = AuthManager::new(client.clone());
    let request = auth
        .prepare_verify(&account_signer(config, key))
        .await
        .context("prepare verify request")?;
    let url = client.url("/api/v1/auth/verify")?;
    render_curl(url.as_str(), &request)
}

/// Move `amount` settlement base units into the account
///
/// The backend builds the transfer; it is co-signed locally and submitted.
pub async fn deposit(config: &CliConfig, key: PrivateKey, amount: u64) -> Result<DepositResponse> {
    if amount == 0 {
        bail!("--amount must be positive");
    }
    let account_id = config.account.account_id.as_str();
    let client = authenticated_client(config, key.clone()).await?;

    let prepared = client
        .create_deposit_transaction(account_id, amount)
        .await
        .context("create deposit transaction")?;
    let signed = sign_transaction(&key, &prepared.payment.signed_transaction_to_base64_string)
        .context("co-sign deposit transaction")?;

    client
        .submit_deposit(account_id, &signed)
        .await
        .context("submit deposit")
}

/// Balanced settlement of open positions
///
/// Longs and shorts close against each other, so at most
/// `min(total long, total short)` is settled on each side. Shorts are
/// listed first. Positions without a side or quantity are left alone.
pub fn settlement_plan(positions: &[AccountPosition]) -> Vec<SettlementQuantity> {
    let open = |side: ContractSide| {
        positions
            .iter()
            .filter(move |p| p.contract_side == Some(side) && p.quantity > 0)
    };
    let total_long: u64 = open(ContractSide::Long).map(|p| p.quantity).sum();
    let total_short: u64 = open(ContractSide::Short).map(|p| p.quantity).sum();
    let settleable = total_long.min(total_short);

    let mut plan = Vec::new();
    for side in [ContractSide::Short, ContractSide::Long] {
        let mut remaining = settleable;
        for position in open(side) {
            if remaining == 0 {
                break;
            }
            let quantity = position.quantity.min(remaining);
            plan.push(SettlementQuantity {
                position_id: position.position_id.clone(),
                quantity,
            });
            remaining -= quantity;
        }
    }
    plan
}

/// Settle every open position that has an opposite side to close against
///
/// `None` when there is nothing settleable.
pub async fn settle_all(
    config: &CliConfig,
    key: PrivateKey,
) -> Result<Option<SettlePositionsResponse>> {
    let client = authenticated_client(config, key).await?;
    let details = client
        .account(&config.account.account_id)
        .await
        .context("account details")?;

    let plan = settlement_plan(&details.positions);
    if plan.is_empty() {
        info!(
            positions = details.positions.len(),
            "nothing to settle; need both long and short quantity"
        );
        return Ok(None);
    }

    info!(entries = plan.len(), "settling positions");
    let response = client
        .settle_positions(&plan)
        .await
        .context("settle positions")?;
    Ok(Some(response))
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedCancel {
    pub order_id: String,
    pub error: String,
}

/// Outcome of cancelling every resting order
#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelAllReport {
    pub cancelled: Vec<CancelOrderResponse>,
    pub failed: Vec<FailedCancel>,
    /// Rows the account listing returned without an order id
    pub skipped: usize,
}

/// Cancel each resting order in turn; one failure does not stop the rest
pub async fn cancel_all(config: &CliConfig, key: PrivateKey) -> Result<CancelAllReport> {
    let client = authenticated_client(config, key).await?;
    let details = client
        .account(&config.account.account_id)
        .await
        .context("account details")?;

    let mut report = CancelAllReport::default();
    for order in &details.orders {
        let Some(order_id) = order.order_id.as_deref() else {
            warn!(price = order.price, "resting order without id; skipped");
            report.skipped += 1;
            continue;
        };

        match client.cancel_order(order_id).await {
            Ok(response) => report.cancelled.push(response),
            Err(err) => {
                warn!(order_id, error = %err, "cancel failed");
                report.failed.push(FailedCancel {
                    order_id: order_id.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        cancelled = report.cancelled.len(),
        failed = report.failed.len(),
        skipped = report.skipped,
        "cancel-all finished"
    );
    Ok(report)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serialize output")?
    );
    Ok(())
}

pub fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{name} must not be empty");
    }
    Ok(())
}
