/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for hedera-perps-adapter tests

use hedera_perps_adapter::{KeyAlgorithm, PerpsClient, PrivateKey};
use wiremock::MockServer;

/// Fixed Ed25519 seed used by the end-to-end credential tests
pub const TEST_SEED: [u8; 32] = [
    0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c, 0xc4,
    0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae, 0x7f, 0x60,
];

pub const TEST_ACCOUNT: &str = "0.0.6978377";
pub const TEST_LEDGER: &str = "testnet";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Deterministic Ed25519 key from [`TEST_SEED`]
#[allow(dead_code)]
pub fn test_ed25519_key() -> PrivateKey {
    PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &TEST_SEED).expect("valid seed")
}

/// Client pointed at the mock server
#[allow(dead_code)]
pub fn mock_client(server: &MockServer) -> PerpsClient {
    PerpsClient::new(&server.uri()).expect("mock server uri")
}

/// Mock access token for testing
#[allow(dead_code)]
pub fn mock_access_token() -> String {
    "eyJhbGciOiJFZERTQSJ9.test.signature".to_string()
}
