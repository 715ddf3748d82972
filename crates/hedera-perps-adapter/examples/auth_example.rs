/*
[INPUT]:  PERPS_BASE_URL, PERPS_ACCOUNT_ID, PERPS_PRIVATE_KEY (DER or raw hex)
[OUTPUT]: Access token for API access
[POS]:    Examples - authentication flow demonstration
[UPDATE]: When auth flow changes
*/

use hedera_perps_adapter::*;

/// Example: challenge/verify authentication
///
/// 1. Load the account key
/// 2. Print an offline credential for a sample message
/// 3. Request a challenge, sign it and verify to get a token
#[tokio::main]
async fn main() {
    println!("=== Perps Authentication Example ===\n");

    let (Ok(base_url), Ok(account_id), Ok(private_key)) = (
        std::env::var("PERPS_BASE_URL"),
        std::env::var("PERPS_ACCOUNT_ID"),
        std::env::var("PERPS_PRIVATE_KEY"),
    ) else {
        eprintln!("Set PERPS_BASE_URL, PERPS_ACCOUNT_ID and PERPS_PRIVATE_KEY");
        return;
    };
    let ledger_id = std::env::var("PERPS_LEDGER_ID").unwrap_or_else(|_| "testnet".to_string());

    let key = match PrivateKey::from_der_hex(&private_key)
        .or_else(|_| PrivateKey::from_hex(KeyAlgorithm::Ed25519, &private_key))
    {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Failed to load key: {}", e);
            return;
        }
    };
    println!("✓ Loaded {} key {}", key.algorithm(), key.public_key_hex());

    match build_auth_credential(&key, "hello") {
        Ok(credential) => println!("✓ Offline credential for \"hello\": {}", credential),
        Err(e) => println!("✗ Error: {}", e),
    }

    let client = match PerpsClient::new(&base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    let auth_manager = AuthManager::new(client);
    let signer = AccountSigner::new(account_id, ledger_id, key);

    match auth_manager.authenticate(&signer).await {
        Ok(response) => println!(
            "✓ Authenticated, token expires in {:?}s",
            response.expires_in
        ),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Authentication example complete");
}
