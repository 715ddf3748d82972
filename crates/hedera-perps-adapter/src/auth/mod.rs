/*
[INPUT]:  Account keys, server challenges and access tokens
[OUTPUT]: Signed credentials, verify bodies and stored tokens
[POS]:    Auth layer - challenge signing and the login flow
[UPDATE]: When auth flow or signature methods change
*/

pub mod builder;
pub mod hip820;
pub mod key;
pub mod manager;
pub mod signature_map;
pub mod signer;
pub mod token;
pub mod transaction;

pub use builder::{SignedChallengeBuilder, build_auth_credential};
pub use hip820::{HIP820_PREFIX, unwrap_message, wrap_message};
pub use key::PrivateKey;
pub use manager::AuthManager;
pub use signature_map::{
    SignatureMap, SignatureMapEntry, build_signature_map, build_signature_map_for, decode_varint,
    encode_varint,
};
pub use signer::{AccountSigner, ChallengeSigner, MockChallengeSigner};
pub use token::{TokenData, TokenManager};
pub use transaction::sign_transaction;
