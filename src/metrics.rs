//! Observability metrics for the bulk fetch pipeline
//!
//! Counters and histograms are recorded through the `metrics` facade and are
//! no-ops until a recorder is installed. [`init_metrics`] installs a
//! Prometheus exporter with a scrape endpoint.
//!
//! ## Metrics
//!
//! - `http_requests_total{endpoint,status,attempt}`
//! - `http_request_duration_seconds{endpoint}`
//! - `http_retries_total{attempt}` and `retry_backoff_duration_seconds`
//! - `pages_fetched_total`
//! - `sets_fetched_total`, `sets_failed_total`
//! - `entries_exported_total`, `combined_files_written_total`

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Set once the Prometheus exporter is installed
static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Metrics initialization errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed (address in use, recorder already set)
    #[error("failed to install Prometheus exporter: {0}")]
    Install(String),
}

/// Initialize the metrics system with a Prometheus exporter
///
/// Idempotent: a second call is a no-op.
///
/// # Arguments
/// * `addr` - Socket address for the scrape endpoint (e.g., "127.0.0.1:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if let Some(existing) = METRICS_INITIALIZED.get() {
        debug!(%existing, "Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the pricing API"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );
    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Duration of retry backoff in seconds"
    );
    describe_counter!(
        "pages_fetched_total",
        Unit::Count,
        "Search result pages fetched"
    );
    describe_counter!(
        "sets_fetched_total",
        Unit::Count,
        "Sets fetched and exported successfully"
    );
    describe_counter!("sets_failed_total", Unit::Count, "Sets that failed");
    describe_counter!(
        "entries_exported_total",
        Unit::Count,
        "Export entries written to per-set files"
    );
    describe_counter!(
        "combined_files_written_total",
        Unit::Count,
        "Combined export files written"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one HTTP request attempt
pub struct HttpRequestMetrics {
    endpoint: String,
    start_time: Instant,
    correlation_id: String,
    attempt: u32,
}

impl HttpRequestMetrics {
    /// Start recording a new HTTP request
    pub fn start(endpoint: impl Into<String>, attempt: u32) -> Self {
        let endpoint = endpoint.into();
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            endpoint = %endpoint,
            attempt = attempt,
            "Starting HTTP request"
        );

        Self {
            endpoint,
            start_time: Instant::now(),
            correlation_id,
            attempt,
        }
    }

    /// Record completion of the HTTP request
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => status_code.to_string(),
            "attempt" => self.attempt.to_string(),
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        if status_code == 429 {
            warn!(
                correlation_id = %self.correlation_id,
                endpoint = %self.endpoint,
                attempt = self.attempt,
                "Rate limit response (429)"
            );
        }

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            status = status_code,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a network error (no status code)
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => "network_error",
            "attempt" => self.attempt.to_string(),
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            attempt = self.attempt,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "http_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!(
        "retry_backoff_duration_seconds",
        "attempt" => attempt.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record one search result page
pub fn record_page_fetched(items: usize) {
    counter!("pages_fetched_total").increment(1);
    debug!(items = items, "Page fetched");
}

/// Record a combined export file
pub fn record_combined_file(entries: usize) {
    counter!("combined_files_written_total").increment(1);
    debug!(entries = entries, "Combined file recorded");
}

/// Per-set fetch metrics
pub struct SetFetchMetrics {
    set_code: String,
    start_time: Instant,
}

impl SetFetchMetrics {
    /// Start tracking one set
    pub fn start(set_code: impl Into<String>) -> Self {
        Self {
            set_code: set_code.into(),
            start_time: Instant::now(),
        }
    }

    /// Record a set fetched and written
    pub fn record_success(&self, items: usize, entries: usize) {
        counter!("sets_fetched_total").increment(1);
        counter!("entries_exported_total").increment(entries as u64);

        info!(
            set_code = %self.set_code,
            items = items,
            entries = entries,
            duration_ms = self.start_time.elapsed().as_millis(),
            "Set exported"
        );
    }

    /// Record a failed set
    pub fn record_failure(&self, error: &str) {
        counter!("sets_failed_total").increment(1);

        warn!(
            set_code = %self.set_code,
            error = %error,
            duration_ms = self.start_time.elapsed().as_millis(),
            "Set failed"
        );
    }
}
