/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed API and account configuration, loaded account key
[POS]:    Configuration layer - everything the commands need injected
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, Result, bail};
use hedera_perps_adapter::{ClientConfig, KeyAlgorithm, PerpsClient, PrivateKey};
use serde::{Deserialize, Serialize};

/// Top-level CLI configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    pub api: ApiConfig,
    pub account: AccountConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the perpetuals API, e.g. `https://api.example.com`
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Account credentials configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Ledger account id (`0.0.N`)
    pub account_id: String,
    #[serde(default = "default_ledger_id")]
    pub ledger_id: String,
    #[serde(default = "default_key_type")]
    pub key_type: KeyAlgorithm,
    /// Private key as hex (raw or DER)
    #[serde(default)]
    pub private_key: Option<String>,
    /// Name of an environment variable holding the private key instead
    #[serde(default)]
    pub private_key_env: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_ledger_id() -> String {
    "testnet".to_string()
}

fn default_key_type() -> KeyAlgorithm {
    KeyAlgorithm::Ed25519
}

impl CliConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse YAML config")?;
        Ok(config)
    }

    /// Check the base URL and account fields and load the key
    pub fn validate(&self) -> Result<PrivateKey> {
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be positive");
        }
        PerpsClient::with_config(self.client_config(), &self.api.base_url)
            .with_context(|| format!("invalid api.base_url {:?}", self.api.base_url))?;

        let account_id = self.account.account_id.trim();
        if account_id.split('.').count() != 3
            || !account_id
                .split('.')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        {
            bail!("account.account_id must look like 0.0.1234, got {account_id:?}");
        }
        if self.account.ledger_id.trim().is_empty() {
            bail!("account.ledger_id must not be empty");
        }

        self.load_key()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn client(&self) -> Result<PerpsClient> {
        PerpsClient::with_config(self.client_config(), &self.api.base_url)
            .context("create API client")
    }

    /// Resolve and parse the account key
    pub fn load_key(&self) -> Result<PrivateKey> {
        let text = match (&self.account.private_key, &self.account.private_key_env) {
            (Some(_), Some(_)) => {
                bail!("set only one of account.private_key and account.private_key_env")
            }
            (Some(text), None) => text.clone(),
            (None, Some(var)) => std::env::var(var)
                .with_context(|| format!("environment variable {var} is not set"))?,
            (None, None) => bail!("account.private_key or account.private_key_env is required"),
        };

        PrivateKey::from_hex(self.account.key_type, &text)
            .with_context(|| format!("load {} private key", self.account.key_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519_DER_HEX: &str = "302e020100300506032b657004220420\
        9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn yaml(private_key: &str) -> String {
        format!(
            "api:\n  base_url: https://api.example.com\naccount:\n  account_id: 0.0.6978377\n  private_key: \"{private_key}\"\n"
        )
    }

    #[test]
    fn test_defaults_applied() {
        let config = CliConfig::from_yaml(&yaml(ED25519_DER_HEX)).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.account.ledger_id, "testnet");
        assert_eq!(config.account.key_type, KeyAlgorithm::Ed25519);

        let key = config.validate().unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ed25519);
        assert_eq!(
            key.public_key_hex(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
    }

    #[test]
    fn test_secp256k1_key_type() {
        let content = format!(
            "api:\n  base_url: https://api.example.com\naccount:\n  account_id: 0.0.1\n  key_type: ecdsa_secp256k1\n  private_key: \"{}\"\n",
            "11".repeat(32)
        );
        let config = CliConfig::from_yaml(&content).unwrap();
        let key = config.validate().unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::EcdsaSecp256k1);
        assert_eq!(key.public_key_bytes().len(), 33);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CliConfig::from_yaml(&yaml(ED25519_DER_HEX)).unwrap();
        config.account.account_id = "6978377".to_string();
        assert!(config.validate().is_err());

        let mut config = CliConfig::from_yaml(&yaml(ED25519_DER_HEX)).unwrap();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let config = CliConfig::from_yaml(&yaml("abcd")).unwrap();
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Key load failed"));

        let mut config = CliConfig::from_yaml(&yaml(ED25519_DER_HEX)).unwrap();
        config.account.private_key = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_private_key_from_env() {
        let var = "HEDERA_PERPS_CLI_TEST_KEY";
        // SAFETY: only this test touches this variable
        unsafe { std::env::set_var(var, ED25519_DER_HEX) };

        let mut config = CliConfig::from_yaml(&yaml(ED25519_DER_HEX)).unwrap();
        config.account.private_key = None;
        config.account.private_key_env = Some(var.to_string());
        assert!(config.load_key().is_ok());

        config.account.private_key = Some(ED25519_DER_HEX.to_string());
        assert!(config.load_key().is_err());
    }

    #[test]
    fn test_missing_sections_fail() {
        assert!(CliConfig::from_yaml("api:\n  base_url: https://x\n").is_err());
    }
}
