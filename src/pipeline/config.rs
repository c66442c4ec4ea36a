//! Pipeline configuration constants

use std::time::Duration;

/// Delay between continuation page requests within one set.
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

/// Delay between consecutive sets in a bulk job.
pub const SET_DELAY: Duration = Duration::from_millis(100);

/// HTTP connect timeout - time to establish the TCP/TLS connection
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP request timeout - overall time for one request
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of retries for transient request failures.
/// 3 retries with exponential backoff wait at most 1 + 2 + 4 = 7 seconds.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30000; // 30 seconds

/// Default number of entries per combined file.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 10_000;

/// Smallest split threshold the CLI accepts.
pub const MIN_SPLIT_THRESHOLD: usize = 1_000;

/// Largest split threshold the CLI accepts.
pub const MAX_SPLIT_THRESHOLD: usize = 100_000;

/// Default export directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(retry_count));
    let delay_ms = delay_ms.min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}
