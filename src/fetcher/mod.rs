//! Remote price sources

use crate::PricedItem;
use async_trait::async_trait;

pub mod pagination;
pub mod scryfall;
pub mod scryfall_http;
pub mod scryfall_parser;
pub mod shared_resources;

/// Fetcher errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetcherError {
    /// Non-2xx response other than 404, network failure, timeout, or an
    /// unparseable body
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote reported 404
    #[error("not found: {0}")]
    NotFound(String),
}

impl FetcherError {
    /// Failure description without the category prefix
    pub fn description(&self) -> &str {
        match self {
            FetcherError::RemoteUnavailable(msg) | FetcherError::NotFound(msg) => msg,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Source of priced items for whole sets and single cards
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch every priced printing in a set, in API order
    ///
    /// # Arguments
    /// * `remote_set_code` - Set code as the remote API knows it
    async fn fetch_set(&self, remote_set_code: &str) -> FetcherResult<Vec<PricedItem>>;

    /// Fetch a single printing by set and collector number
    ///
    /// # Errors
    /// Returns [`FetcherError::NotFound`] when the remote has no such card
    async fn fetch_card(
        &self,
        remote_set_code: &str,
        collector_number: &str,
    ) -> FetcherResult<PricedItem>;

    /// Base URL requests are sent to
    fn base_url(&self) -> &str;
}
