//! Scryfall HTTP client helper
//!
//! Provides one GET path for every Scryfall interaction with:
//! - Generic JSON deserialization
//! - Retry with exponential backoff on transient failures
//! - Status mapping onto [`FetcherError`]

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fetcher::scryfall_parser::error_details;
use crate::fetcher::{FetcherError, FetcherResult};
use crate::metrics::{record_retry_backoff, HttpRequestMetrics};
use crate::pipeline::config::calculate_backoff;

/// Description reported when a request exceeds its timeout
pub const TIMEOUT_DESCRIPTION: &str = "timeout";

/// Description reported for a 404
pub const NOT_FOUND_DESCRIPTION: &str = "Card or set not found";

/// HTTP client for all Scryfall API interactions
pub struct ScryfallHttpClient {
    client: Arc<Client>,
    base_url: String,
    max_retries: u32,
}

impl ScryfallHttpClient {
    /// Create a new HTTP client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client
    /// * `base_url` - API root (e.g., "<https://api.scryfall.com>")
    /// * `max_retries` - Retries after the first attempt for transient failures
    pub fn new(client: Arc<Client>, base_url: impl Into<String>, max_retries: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            max_retries,
        }
    }

    /// API root requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured retry budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET an absolute URL handed back by the API (continuation pages)
    pub async fn get_absolute<T>(&self, url: &str) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("Making GET request to: {}", url);
        self.request_with_retry(url, endpoint_label(url)).await
    }

    /// Execute with retry
    ///
    /// Retries on network errors (including timeouts), 429 and 5xx. A 404 maps
    /// to [`FetcherError::NotFound`]; other 4xx fail immediately.
    async fn request_with_retry<T>(
        &self,
        url: &str,
        label: &str,
    ) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        let total_attempts = self.max_retries + 1;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = calculate_backoff(attempt - 1);
                record_retry_backoff(backoff, attempt);
                debug!("Retrying after {:?}", backoff);
                tokio::time::sleep(backoff).await;
            }

            let request_metrics = HttpRequestMetrics::start(label, attempt + 1);

            let response = match self.client.get(url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    request_metrics.record_network_error();
                    warn!(
                        "Network error on attempt {}/{}: {}",
                        attempt + 1,
                        total_attempts,
                        e
                    );
                    last_error = Some(FetcherError::RemoteUnavailable(describe_transport(&e)));
                    continue;
                }
            };

            let status = response.status();
            request_metrics.record_complete(status.as_u16());

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(
                    "Transient status {} on attempt {}/{}",
                    status,
                    attempt + 1,
                    total_attempts
                );
                last_error = Some(FetcherError::RemoteUnavailable(format!("HTTP {status}")));
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                return Err(FetcherError::NotFound(NOT_FOUND_DESCRIPTION.to_string()));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let detail = error_details(&body).unwrap_or_else(|| "Unknown error".to_string());
                return Err(FetcherError::RemoteUnavailable(format!(
                    "HTTP {status}: {detail}"
                )));
            }

            return match response.json::<T>().await {
                Ok(data) => {
                    debug!("Request succeeded on attempt {}", attempt + 1);
                    Ok(data)
                }
                Err(e) if e.is_timeout() => Err(FetcherError::RemoteUnavailable(
                    TIMEOUT_DESCRIPTION.to_string(),
                )),
                Err(e) => Err(FetcherError::RemoteUnavailable(format!(
                    "Failed to deserialize response: {e}"
                ))),
            };
        }

        Err(last_error.unwrap_or_else(|| {
            FetcherError::RemoteUnavailable("All retries exhausted".to_string())
        }))
    }
}

fn describe_transport(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        TIMEOUT_DESCRIPTION.to_string()
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        format!("network error: {error}")
    }
}

/// Path portion of a URL, used as a low-cardinality metrics label
fn endpoint_label(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("/", |idx| &without_scheme[idx..]);
    path.split('?').next().unwrap_or(path)
}
