//! Scryfall price source
//!
//! Implements [`PriceSource`] on top of the `/cards/search` endpoint (whole
//! sets, paginated) and `/cards/{set}/{number}` (single printings).

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

use crate::fetcher::pagination::{Page, PaginationHelper};
use crate::fetcher::scryfall_http::ScryfallHttpClient;
use crate::fetcher::scryfall_parser::{RawCard, SearchPage};
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::{FetcherError, FetcherResult, PriceSource};
use crate::metrics::record_page_fetched;
use crate::pipeline::config::{MAX_RETRIES, PAGE_DELAY};
use crate::pipeline::rate_limit::RateLimiter;
use crate::PricedItem;

/// Production Scryfall API root
pub const SCRYFALL_BASE_URL: &str = "https://api.scryfall.com";

const SEARCH_ENDPOINT: &str = "/cards/search";
const CARDS_ENDPOINT: &str = "/cards";

/// Scryfall-backed price source
pub struct ScryfallFetcher {
    http: ScryfallHttpClient,
    page_limiter: RateLimiter,
}

impl ScryfallFetcher {
    /// Fetcher against the production API
    ///
    /// # Arguments
    /// * `max_retries` - Retries for transient request failures
    pub fn new(max_retries: u32) -> Self {
        Self::with_base_url(SCRYFALL_BASE_URL, max_retries)
    }

    /// Fetcher against an alternate API root (mirrors, test doubles)
    pub fn with_base_url(base_url: impl Into<String>, max_retries: u32) -> Self {
        Self {
            http: ScryfallHttpClient::new(global_http_client(), base_url, max_retries),
            page_limiter: RateLimiter::fixed_interval(PAGE_DELAY),
        }
    }

    /// Override the pause between continuation pages
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_limiter = RateLimiter::fixed_interval(delay);
        self
    }

    /// Configured retry budget
    pub fn max_retries(&self) -> u32 {
        self.http.max_retries()
    }

    /// First search page URL for a set
    fn search_url(&self, remote_set_code: &str) -> FetcherResult<String> {
        let query = format!("set:{}", remote_set_code.trim().to_lowercase());
        Url::parse_with_params(
            &self.http.endpoint_url(SEARCH_ENDPOINT),
            &[("q", query.as_str()), ("unique", "prints")],
        )
        .map(String::from)
        .map_err(|e| FetcherError::RemoteUnavailable(format!("Invalid search URL: {e}")))
    }

    /// Single card URL with escaped path segments
    fn card_url(&self, remote_set_code: &str, collector_number: &str) -> FetcherResult<String> {
        let mut url = Url::parse(&self.http.endpoint_url(CARDS_ENDPOINT))
            .map_err(|e| FetcherError::RemoteUnavailable(format!("Invalid card URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetcherError::RemoteUnavailable("Base URL cannot hold a path".to_string()))?
            .push(&remote_set_code.trim().to_lowercase())
            .push(collector_number.trim());
        Ok(url.into())
    }
}

impl Default for ScryfallFetcher {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

/// Map a search page onto the pagination contract
fn into_page(page: SearchPage) -> FetcherResult<Page<PricedItem>> {
    let next = match (page.has_more, page.next_page.clone()) {
        (true, Some(next)) => Some(next),
        (true, None) => {
            return Err(FetcherError::RemoteUnavailable(
                "Response declared has_more without next_page".to_string(),
            ))
        }
        (false, _) => None,
    };

    Ok(Page {
        items: page.into_items()?,
        next,
    })
}

#[async_trait]
impl PriceSource for ScryfallFetcher {
    async fn fetch_set(&self, remote_set_code: &str) -> FetcherResult<Vec<PricedItem>> {
        let first_url = self.search_url(remote_set_code)?;
        let http = &self.http;

        info!(set_code = %remote_set_code, "Fetching set from Scryfall");

        let items = PaginationHelper::paginate_cursor(first_url, &self.page_limiter, |url| async move {
            let page: SearchPage = http.get_absolute(&url).await?;
            record_page_fetched(page.data.len());
            if let Some(total) = page.total_cards {
                debug!(total_cards = total, "Search reports total");
            }
            into_page(page)
        })
        .await?;

        debug!(set_code = %remote_set_code, items = items.len(), "Set fetch complete");
        Ok(items)
    }

    async fn fetch_card(
        &self,
        remote_set_code: &str,
        collector_number: &str,
    ) -> FetcherResult<PricedItem> {
        let url = self.card_url(remote_set_code, collector_number)?;
        let card: RawCard = self.http.get_absolute(&url).await?;
        card.into_item()
    }

    fn base_url(&self) -> &str {
        self.http.base_url()
    }
}
