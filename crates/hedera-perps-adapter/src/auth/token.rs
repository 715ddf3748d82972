/*
[INPUT]:  Access tokens from the verify endpoint and their lifetimes
[OUTPUT]: Token retrieval and expiration status
[POS]:    Auth layer - token lifecycle shared by auth flow and HTTP client
[UPDATE]: When adding token refresh or changing storage strategy
*/

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Stored token data with metadata
#[derive(Debug, Clone)]
pub struct TokenData {
    pub access_token: String,
    pub account_id: String,
    /// `None` when the server did not report a lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenData {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Thread-safe access token holder; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct TokenManager {
    data: Arc<RwLock<Option<TokenData>>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token; `expires_in` is seconds from now
    pub fn set_token(
        &self,
        access_token: String,
        account_id: String,
        expires_in: Option<u64>,
    ) {
        // Lifetimes past chrono's range are treated as unbounded
        let expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        let token_data = TokenData {
            access_token,
            account_id,
            expires_at,
        };

        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token_data);
    }

    /// Current token, if one is stored and not expired
    pub fn get_token(&self) -> Option<String> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|data| !data.is_expired_at(Utc::now()))
            .map(|data| data.access_token.clone())
    }

    /// True when no token is stored or the stored one has expired
    pub fn is_expired(&self) -> bool {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(data) => data.is_expired_at(Utc::now()),
            None => true,
        }
    }

    pub fn token_data(&self) -> Option<TokenData> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    pub fn clear(&self) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

/// Last few characters of a token, safe for logs
pub(crate) fn token_suffix(token: &str) -> &str {
    let start = token
        .char_indices()
        .rev()
        .nth(5)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &token[start..]
}
