/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public perps adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    AccountSigner,
    AuthManager,
    ChallengeSigner,
    MockChallengeSigner,
    PrivateKey,
    SignatureMap,
    SignatureMapEntry,
    SignedChallengeBuilder,
    TokenData,
    TokenManager,
    build_auth_credential,
    build_signature_map,
    encode_varint,
    sign_transaction,
    unwrap_message,
    wrap_message,
};

// Re-export commonly used types from http
pub use http::{ClientConfig, PerpsClient, PerpsError, Result};

// Re-export all types
pub use types::*;
