/*
[INPUT]:  CLI arguments, YAML configuration file
[OUTPUT]: Credentials, auth tokens and API query results on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hedera_perps_adapter::AuthManager;
use hedera_perps_cli::CliConfig;
use hedera_perps_cli::commands::{
    account_signer, authenticated_client, cancel_all, credential_report, deposit, prepare_curl,
    print_json, require_non_empty, settle_all,
};

#[derive(Parser, Debug)]
#[command(name = "hedera-perps", version, about = "Perpetuals API console client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Validate the configuration and key, then exit
    #[arg(long = "dry-run")]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a credential for a message offline
    Credential {
        #[arg(long)]
        message: String,
    },
    /// Run the challenge/verify flow
    Auth {
        /// Print the verify call as curl instead of sending it
        #[arg(long)]
        curl: bool,
    },
    /// Market configuration
    MarketInfo,
    /// Order book depth
    Depth {
        #[arg(long, default_value_t = 10)]
        levels: u32,
    },
    /// Balance, orders and positions of the configured account
    Account,
    /// Settlement balance of the configured account
    Balance,
    /// Cancel a resting order
    Cancel {
        #[arg(long = "order-id")]
        order_id: String,
    },
    /// Cancel every resting order of the configured account
    CancelAll,
    /// Settle open positions, longs against shorts
    SettleAll,
    /// Deposit settlement tokens into the account
    Deposit {
        /// Amount in settlement token base units
        #[arg(long)]
        amount: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting hedera-perps"
    );

    let config = load_config(&args.config_path)?;
    let key = config.validate().context("validate config")?;
    info!(
        account_id = %config.account.account_id,
        ledger_id = %config.account.ledger_id,
        key_type = %key.algorithm(),
        public_key = %key.public_key_hex(),
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let Some(command) = args.command else {
        bail!("no command given; see --help");
    };

    match command {
        Command::Credential { message } => {
            print_json(&credential_report(&key, &message)?)?;
        }
        Command::Auth { curl: true } => {
            println!("{}", prepare_curl(&config, key).await?);
        }
        Command::Auth { curl: false } => {
            let auth = AuthManager::new(config.client()?);
            let signer = account_signer(&config, key);
            let response = auth.authenticate(&signer).await.context("authenticate")?;
            print_json(&response)?;
        }
        Command::MarketInfo => {
            let info = config.client()?.market_info().await.context("market info")?;
            print_json(&info)?;
        }
        Command::Depth { levels } => {
            let depth = config
                .client()?
                .market_depth(levels)
                .await
                .context("market depth")?;
            print_json(&depth)?;
        }
        Command::Account => {
            let client = authenticated_client(&config, key).await?;
            let details = client
                .account(&config.account.account_id)
                .await
                .context("account details")?;
            print_json(&details)?;
        }
        Command::Balance => {
            let client = authenticated_client(&config, key).await?;
            let balance = client
                .balance(&config.account.account_id)
                .await
                .context("balance")?;
            print_json(&balance)?;
        }
        Command::Cancel { order_id } => {
            require_non_empty("--order-id", &order_id)?;
            let client = authenticated_client(&config, key).await?;
            let response = client
                .cancel_order(&order_id)
                .await
                .with_context(|| format!("cancel order {order_id}"))?;
            print_json(&response)?;
        }
        Command::CancelAll => {
            print_json(&cancel_all(&config, key).await?)?;
        }
        Command::SettleAll => {
            if let Some(response) = settle_all(&config, key).await? {
                print_json(&response)?;
            }
        }
        Command::Deposit { amount } => {
            print_json(&deposit(&config, key, amount).await?)?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<CliConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    CliConfig::from_file(path_str).context("load config")
}
