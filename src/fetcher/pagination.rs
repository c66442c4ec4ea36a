//! Pagination helper for cursor-style continuation pages
//!
//! Scryfall returns `has_more` plus an absolute `next_page` URL. The helper
//! follows that chain, pausing between requests, and concatenates the pages
//! in order.
//!
//! Includes safety mechanisms:
//! - Maximum iteration limit to stop a runaway continuation chain
//! - No pause after the final page

use crate::fetcher::{FetcherError, FetcherResult};
use crate::pipeline::rate_limit::RateLimiter;
use std::future::Future;
use tracing::debug;

/// Maximum number of pagination iterations to prevent infinite loops
pub const MAX_ITERATIONS: usize = 10_000;

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page, in API order
    pub items: Vec<T>,
    /// Continuation URL, `None` on the last page
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Final page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Page followed by `next`
    pub fn with_next(items: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(next.into()),
        }
    }
}

/// Pagination helper
pub struct PaginationHelper;

impl PaginationHelper {
    /// Follow continuation URLs starting at `first_url`
    ///
    /// # Arguments
    /// * `first_url` - URL of the first page
    /// * `limiter` - Pause applied between consecutive page requests
    /// * `fetch_page` - Async function to fetch a single page
    ///
    /// # Errors
    /// Returns the first page error, or [`FetcherError::RemoteUnavailable`]
    /// if the iteration cap is exceeded
    pub async fn paginate_cursor<T, F, Fut>(
        first_url: String,
        limiter: &RateLimiter,
        fetch_page: F,
    ) -> FetcherResult<Vec<T>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = FetcherResult<Page<T>>>,
    {
        Self::paginate_cursor_with_limit(first_url, limiter, MAX_ITERATIONS, fetch_page).await
    }

    /// [`paginate_cursor`](Self::paginate_cursor) with an explicit iteration cap
    pub async fn paginate_cursor_with_limit<T, F, Fut>(
        first_url: String,
        limiter: &RateLimiter,
        max_iterations: usize,
        mut fetch_page: F,
    ) -> FetcherResult<Vec<T>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = FetcherResult<Page<T>>>,
    {
        let mut all_items = Vec::new();
        let mut url = first_url;
        let mut iteration = 0;

        loop {
            if iteration >= max_iterations {
                return Err(FetcherError::RemoteUnavailable(format!(
                    "Max iterations ({max_iterations}) exceeded - possible infinite loop. Last page: {url}"
                )));
            }

            debug!("Fetching page {} from {}", iteration + 1, url);

            let page = fetch_page(url).await?;
            iteration += 1;

            debug!("Received {} items in page {}", page.items.len(), iteration);
            all_items.extend(page.items);

            match page.next {
                Some(next) => {
                    limiter.pause().await;
                    url = next;
                }
                None => break,
            }
        }

        debug!(
            "Pagination completed after {} pages. Total items: {}",
            iteration,
            all_items.len()
        );

        Ok(all_items)
    }
}
