//! Shared HTTP client for all fetcher instances
//!
//! One process-wide client keeps connection pooling effective across
//! set fetches and single-card lookups.

use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;

use crate::pipeline::config::{HTTP_CONNECT_TIMEOUT, HTTP_REQUEST_TIMEOUT};

/// User-Agent sent with every request; Scryfall asks clients to identify themselves
pub const USER_AGENT_VALUE: &str = concat!("card-pricer/", env!("CARGO_PKG_VERSION"));

/// Global HTTP client shared by all fetcher instances
///
/// Configured with explicit timeouts to prevent indefinite hangs:
/// - Connect timeout: 10 seconds
/// - Request timeout: 10 seconds
pub static GLOBAL_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| Arc::new(build_client()));

fn build_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            panic!("FATAL: Failed to build HTTP client: {e}. Check system TLS configuration.");
        })
}

/// Get the global HTTP client
pub fn global_http_client() -> Arc<Client> {
    GLOBAL_HTTP_CLIENT.clone()
}
