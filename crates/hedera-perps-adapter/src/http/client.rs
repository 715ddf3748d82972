/*
[INPUT]:  HTTP configuration (base URL, timeouts) and the shared token store
[OUTPUT]: Configured reqwest client and typed JSON responses
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::TokenManager;
use crate::http::{PerpsError, Result};

/// Header carrying a per-call key on state-changing requests
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the perpetuals API
///
/// Cloning is cheap; clones share the connection pool and token store.
#[derive(Debug, Clone)]
pub struct PerpsClient {
    http_client: Client,
    base_url: Url,
    config: ClientConfig,
    tokens: TokenManager,
}

impl PerpsClient {
    /// Create a client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url)?,
            config,
            tokens: TokenManager::new(),
        })
    }

    /// Use an existing token store instead of a fresh one
    pub fn with_token_manager(mut self, tokens: TokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an API path such as `/api/v1/market/info`
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Unauthenticated request builder
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Request builder carrying the stored bearer token
    pub(crate) fn authed_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let token = self.tokens.get_token().ok_or(PerpsError::TokenExpired)?;
        Ok(self.request(method, endpoint)?.bearer_auth(token))
    }

    /// Send a request and decode a JSON body, mapping failures to [`PerpsError`]
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(%method, %path, status = status.as_u16(), elapsed_ms, "request failed");
            return Err(PerpsError::from_response(status, retry_after, &body));
        }

        debug!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            body_len = body.len(),
            "request completed"
        );

        if body.trim().is_empty() {
            return Err(PerpsError::InvalidResponse(format!(
                "{method} {path} returned an empty body"
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PerpsError {
        if error.is_timeout() {
            PerpsError::Timeout {
                duration: self.config.timeout.as_secs(),
            }
        } else {
            PerpsError::Http(error)
        }
    }
}

/// Attach a fresh idempotency key
pub(crate) fn with_idempotency_key(builder: RequestBuilder) -> RequestBuilder {
    builder.header(IDEMPOTENCY_KEY_HEADER, Uuid::new_v4().to_string())
}

fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let mut url = Url::parse(trimmed)?;
    if url.cannot_be_a_base() {
        return Err(PerpsError::Config(format!(
            "base URL {trimmed} cannot carry API paths"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let client = PerpsClient::new("https://api.example.com/gateway").unwrap();
        assert_eq!(
            client.url("/api/v1/market/info").unwrap().as_str(),
            "https://api.example.com/gateway/api/v1/market/info"
        );

        let client = PerpsClient::new("https://api.example.com").unwrap();
        assert_eq!(
            client.url("api/v1/market/info").unwrap().as_str(),
            "https://api.example.com/api/v1/market/info"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            PerpsClient::new("not a url"),
            Err(PerpsError::UrlParse(_))
        ));
        assert!(matches!(
            PerpsClient::new("mailto:ops@example.com"),
            Err(PerpsError::Config(_))
        ));
    }

    #[test]
    fn test_authed_request_requires_token() {
        let client = PerpsClient::new("https://api.example.com").unwrap();
        assert!(matches!(
            client.authed_request(Method::GET, "/api/v1/account"),
            Err(PerpsError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_send_json_with_bearer_and_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer token-1"))
            .and(header_exists(IDEMPOTENCY_KEY_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = PerpsClient::new(&server.uri()).unwrap();
        client
            .token_manager()
            .set_token("token-1".to_string(), "0.0.1".to_string(), None);

        let builder = with_idempotency_key(client.authed_request(Method::POST, "/ping").unwrap());
        let pong: Pong = client.send_json(builder).await.unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn test_send_json_maps_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "4"))
            .mount(&server)
            .await;

        let client = PerpsClient::new(&server.uri()).unwrap();
        let builder = client.request(Method::GET, "/ping").unwrap();
        let err = client.send_json::<Pong>(builder).await.unwrap_err();
        assert!(matches!(err, PerpsError::RateLimit { retry_after: 4 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_send_json_maps_unauthorized_and_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/denied"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = PerpsClient::new(&server.uri()).unwrap();

        let builder = client.request(Method::GET, "/denied").unwrap();
        let err = client.send_json::<Pong>(builder).await.unwrap_err();
        assert!(err.is_auth_error());

        let builder = client.request(Method::GET, "/empty").unwrap();
        let err = client.send_json::<Pong>(builder).await.unwrap_err();
        assert!(matches!(err, PerpsError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_send_json_maps_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig {
            timeout: Duration::from_millis(50),
            connect_timeout: Duration::from_secs(1),
        };
        let client = PerpsClient::with_config(config, &server.uri()).unwrap();
        let builder = client.request(Method::GET, "/slow").unwrap();
        let err = client.send_json::<Pong>(builder).await.unwrap_err();
        assert!(matches!(err, PerpsError::Timeout { .. }));
    }
}
