/*
[INPUT]:  Error sources (HTTP, API, serialization, key material, wire encoding, signing)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main error type for the perps adapter
#[derive(Error, Debug)]
pub enum PerpsError {
    /// Private key material is malformed, the wrong length, or of an unsupported type
    #[error("Key load failed: {0}")]
    KeyLoad(String),

    /// Varint or signature map assembly could not represent the input
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The signing primitive rejected the input
    #[error("Signing failed: {0}")]
    Signing(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Access token is expired
    #[error("Access token expired, please re-authenticate")]
    TokenExpired,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Connection timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },
}

/// Default wait when the server rate-limits without a Retry-After header.
/// The platform allows 5 requests per 10 seconds.
pub(crate) const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

/// RFC 7807 problem body returned by the API on failures
#[derive(Debug, Default, Deserialize)]
struct ProblemDetails {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl PerpsError {
    /// Check if the error is retryable
    ///
    /// Key, encoding and signing failures are terminal: the same inputs
    /// always produce the same invalid output.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PerpsError::Http(_)
                | PerpsError::RateLimit { .. }
                | PerpsError::Timeout { .. }
                | PerpsError::InvalidResponse(_)
        )
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            PerpsError::RateLimit { retry_after } => Some(*retry_after),
            PerpsError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            PerpsError::Authentication { .. } | PerpsError::TokenExpired
        )
    }

    /// Check if error comes from building the credential itself
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            PerpsError::KeyLoad(_) | PerpsError::Encoding(_) | PerpsError::Signing(_)
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        PerpsError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }

    /// Map a non-success response to an error
    pub fn from_response(status: StatusCode, retry_after: Option<u64>, body: &str) -> Self {
        let message = problem_message(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                PerpsError::Authentication { message }
            }
            StatusCode::TOO_MANY_REQUESTS => PerpsError::RateLimit {
                retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            },
            _ => PerpsError::api_error(status, message),
        }
    }
}

fn problem_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }

    let Ok(problem) = serde_json::from_str::<ProblemDetails>(body) else {
        return body.to_string();
    };

    let text = match (problem.title, problem.detail) {
        (Some(title), Some(detail)) => format!("{title}: {detail}"),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => return body.to_string(),
    };

    match problem.code {
        Some(serde_json::Value::String(code)) => format!("{text} [{code}]"),
        Some(serde_json::Value::Number(code)) => format!("{text} [{code}]"),
        _ => text,
    }
}

/// Result type alias for perps adapter operations
pub type Result<T> = std::result::Result<T, PerpsError>;
