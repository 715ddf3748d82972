/*
[INPUT]:  PERPS_BASE_URL
[OUTPUT]: Market configuration and order book depth
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use hedera_perps_adapter::*;

/// Example: query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Perps Market Data Example ===\n");

    let Ok(base_url) = std::env::var("PERPS_BASE_URL") else {
        eprintln!("Set PERPS_BASE_URL");
        return;
    };
    let client = match PerpsClient::new(&base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    println!("Querying market info...");
    match client.market_info().await {
        Ok(info) => println!("✓ Market info: {:?}", info),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying depth (10 levels)...");
    match client.market_depth(10).await {
        Ok(depth) => {
            println!("✓ Best ask: {:?}", depth.best_ask());
            println!("✓ Best bid: {:?}", depth.best_bid());
            println!("✓ Spread: {:?}", depth.spread());
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
