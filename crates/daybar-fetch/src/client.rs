//! HTTP client for the Polygon aggregates API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::response::{decode_page, error_detail};
use crate::url::{BASE_URL, aggregates_url, check_continuation};
use crate::{AggregatesPage, AggregatesSource, PageRequest};

/// Configuration for the provider client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the provider REST API.
    pub base_url: String,
    /// API key, sent as a bearer token.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for rate-limited (HTTP 429) requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000, // Free-tier keys are limited per minute
            user_agent: format!("daybar/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Errors that can occur while fetching a page.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were rejected.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Server returned a non-success status.
    #[error("Server error {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Provider-supplied detail.
        message: String,
    },

    /// Still rate limited after exhausting retries.
    #[error("Rate limited after {0} attempts")]
    RateLimited(u32),

    /// Provider reported an error in the response body.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Response or URL could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Aggregates client with connection reuse and rate-limit backoff.
///
/// Stage-level retries are never performed here: any error other than
/// HTTP 429 is returned on the first occurrence.
#[derive(Debug, Clone)]
pub struct PolygonClient {
    client: Client,
    config: ClientConfig,
}

impl PolygonClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // Request timeout
            .timeout(config.timeout)
            // Connection timeout (separate from request timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves a page request to the URL to fetch.
    fn resolve(&self, request: &PageRequest) -> Result<String, FetchError> {
        match request {
            PageRequest::First(query) => aggregates_url(&self.config.base_url, query),
            PageRequest::Next(next) => {
                check_continuation(&self.config.base_url, next)?;
                Ok(next.clone())
            }
        }
    }

    /// Performs a GET, retrying only while the provider answers 429.
    async fn get(&self, url: &str) -> Result<AggregatesPage, FetchError> {
        let mut attempts = 0;

        loop {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.config.api_key)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts < self.config.max_retries {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, "Rate limited by provider, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(FetchError::RateLimited(attempts + 1));
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Unauthorized(error_detail(&body)));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message: error_detail(&body),
                });
            }

            let body = response.bytes().await?;
            debug!(bytes = body.len(), "Received aggregates page");
            return decode_page(&body);
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        // Exponential backoff: base_delay * 2^attempt
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));

        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter (±25%) keyed on the attempt number
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let jitter_offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            jitter_offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
        Duration::from_millis(final_delay)
    }
}

#[async_trait]
impl AggregatesSource for PolygonClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AggregatesPage, FetchError> {
        let url = self.resolve(request)?;
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AggregatesQuery, Extractor};
    use chrono::NaiveDate;
    use daybar_types::{BarSpan, DateRange, Ticker};
    use std::num::NonZeroU32;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves canned HTTP responses in order, repeating the last one, and
    /// records the head of every request received. `BASE` in a body is
    /// replaced with the server's own URL.
    async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.replace("BASE", &base)))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            let mut served = 0;
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                seen.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

                let (status, body) = &responses[served.min(responses.len() - 1)];
                served += 1;
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (base, requests)
    }

    fn fast_client(base: &str) -> PolygonClient {
        PolygonClient::new(ClientConfig {
            base_url: base.to_string(),
            api_key: "key".to_string(),
            base_delay_ms: 1,
            max_delay_ms: 2,
            ..Default::default()
        })
        .unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
        )
        .unwrap()
    }

    fn first_page() -> PageRequest {
        PageRequest::First(AggregatesQuery::new(
            Ticker::new("AAPL").unwrap(),
            BarSpan::DAILY,
            range(),
            NonZeroU32::new(1).unwrap(),
        ))
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, BASE_URL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("daybar/"));
    }

    #[test]
    fn test_client_config_debug_redacts_key() {
        let config = ClientConfig {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = PolygonClient::new(ClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_backoff_delay_calculation() {
        let client = PolygonClient::new(ClientConfig::default()).unwrap();

        // First attempt: base_delay * 2 = 2000ms (plus jitter)
        let delay1 = client.calculate_backoff_delay(1);
        assert!(delay1.as_millis() >= 1500 && delay1.as_millis() <= 2500);

        // High attempt should be capped at max_delay
        let delay_high = client.calculate_backoff_delay(20);
        assert!(delay_high.as_millis() <= 75_000);
        assert!(delay_high.as_millis() >= 45_000);
    }

    #[tokio::test]
    async fn test_foreign_continuation_rejected_before_request() {
        let client = PolygonClient::new(ClientConfig::default()).unwrap();
        let request = PageRequest::Next("https://attacker.example/v2/aggs?cursor=1".to_string());

        let result = client.fetch_page(&request).await;
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let (base, requests) =
            serve(vec![(401, r#"{"status":"ERROR","error":"bad key"}"#.to_string())]).await;

        let result = fast_client(&base).fetch_page(&first_page()).await;
        assert!(matches!(result, Err(FetchError::Unauthorized(msg)) if msg == "bad key"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer key"));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_unauthorized() {
        let (base, requests) = serve(vec![(403, "denied".to_string())]).await;

        let result = fast_client(&base).fetch_page(&first_page()).await;
        assert!(matches!(result, Err(FetchError::Unauthorized(msg)) if msg == "denied"));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_fails() {
        let (base, requests) = serve(vec![(429, String::new())]).await;

        let result = fast_client(&base).fetch_page(&first_page()).await;
        assert!(matches!(result, Err(FetchError::RateLimited(4))));
        assert_eq!(requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_rate_limit_recovers() {
        let (base, requests) = serve(vec![
            (429, String::new()),
            (200, r#"{"status":"OK","results":[]}"#.to_string()),
        ])
        .await;

        let page = fast_client(&base).fetch_page(&first_page()).await.unwrap();
        assert!(page.bars.is_empty());
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let (base, requests) = serve(vec![(500, "oops".to_string())]).await;

        let result = fast_client(&base).fetch_page(&first_page()).await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status: 500, message }) if message == "oops"
        ));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_follows_next_url() {
        let first = r#"{"status":"OK","results":[{"o":1.0,"h":2.0,"l":0.5,"c":1.5,"v":10,"t":1727740800000}],"next_url":"BASE/v2/aggs/ticker/AAPL/next?cursor=x"}"#;
        let second = r#"{"status":"OK","results":[{"o":1.5,"h":2.5,"l":1.0,"c":2.0,"t":1727827200000}]}"#;
        let (base, requests) =
            serve(vec![(200, first.to_string()), (200, second.to_string())]).await;

        let extractor = Extractor::new(fast_client(&base));
        let ticker = Ticker::new("AAPL").unwrap();
        let bars = extractor
            .extract(&ticker, range(), NonZeroU32::new(1).unwrap())
            .await
            .unwrap();

        let timestamps: Vec<i64> = bars.iter().map(|b| b.timestamp).collect();
        assert_eq!(timestamps, vec![1_727_740_800_000, 1_727_827_200_000]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with(
            "GET /v2/aggs/ticker/AAPL/range/1/day/2025-10-01/2025-10-02?adjusted=true&sort=asc&limit=1 "
        ));
        assert!(requests[1].starts_with("GET /v2/aggs/ticker/AAPL/next?cursor=x "));
    }
}
