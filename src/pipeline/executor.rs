//! Bulk fetch executor
//!
//! Walks the requested sets in order. For each set: resolve the remote code,
//! fetch, normalize, write the per-set file, record the outcome, report
//! progress, then pause before the next set. Combined files are written only
//! when the run was not cancelled.

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cancel::CancellationToken;
use crate::catalog::{CodeResolver, SetCatalog};
use crate::fetcher::scryfall_http::TIMEOUT_DESCRIPTION;
use crate::fetcher::{FetcherError, FetcherResult, PriceSource};
use crate::metrics::SetFetchMetrics;
use crate::output::csv::{write_set_file, CombinedFileWriter};
use crate::output::ExportPaths;
use crate::pipeline::config::SET_DELAY;
use crate::pipeline::job::{FetchJob, FetchOutcome, JobReport, JobStatus};
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::rate_limit::RateLimiter;
use crate::pipeline::PipelineError;
use crate::pricing::flatten_all;
use crate::PricedItem;

/// Process-wide gate: at most one running job
static RUN_GATE: Lazy<Arc<Mutex<()>>> = Lazy::new(|| Arc::new(Mutex::new(())));

/// Orchestrates bulk fetch jobs against a price source
pub struct BulkFetchExecutor {
    source: Arc<dyn PriceSource>,
    resolver: CodeResolver,
    set_limiter: RateLimiter,
    fetch_timeout: Option<Duration>,
}

impl BulkFetchExecutor {
    /// Executor using the embedded catalog's code overrides
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            resolver: default_resolver(),
            set_limiter: RateLimiter::fixed_interval(SET_DELAY),
            fetch_timeout: None,
        }
    }

    /// Replace the code resolver
    pub fn with_resolver(mut self, resolver: CodeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Override the pause between sets
    pub fn with_set_delay(mut self, delay: Duration) -> Self {
        self.set_limiter = RateLimiter::fixed_interval(delay);
        self
    }

    /// Bound each whole-set fetch; exceeding it fails the set with `timeout`
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Run a job to completion or cancellation
    ///
    /// # Errors
    /// - [`PipelineError::Validation`] if the job is malformed
    /// - [`PipelineError::AlreadyRunning`] if another job holds the run gate
    /// - [`PipelineError::CombinedOutput`] if combined files cannot be written
    pub async fn execute(
        &self,
        job: FetchJob,
        cancel: &CancellationToken,
        progress: ProgressReporter,
    ) -> Result<JobReport, PipelineError> {
        job.validate().map_err(PipelineError::Validation)?;

        let _gate = RUN_GATE
            .clone()
            .try_lock_owned()
            .map_err(|_| PipelineError::AlreadyRunning)?;

        let span = info_span!(
            "bulk_fetch",
            sets = job.sets.len(),
            format = %job.format,
            combined = job.combined
        );
        self.run(job, cancel, &progress).instrument(span).await
    }

    async fn run(
        &self,
        mut job: FetchJob,
        cancel: &CancellationToken,
        progress: &ProgressReporter,
    ) -> Result<JobReport, PipelineError> {
        let started_at = Utc::now();
        let paths = ExportPaths::new(job.output_dir.clone());
        let sets = job.sets.clone();
        let requested = sets.len();

        job.status = JobStatus::Running;
        info!("Bulk fetch started: {} set(s)", requested);
        log_header(&job, progress);

        for (index, requested_code) in sets.iter().enumerate() {
            if cancel.is_cancelled() {
                job.status = JobStatus::Cancelled;
                break;
            }

            let display_code = requested_code.trim().to_uppercase();
            let position = index + 1;
            progress.log(format!(
                "[{position}/{requested}] Processing {display_code}..."
            ));

            let outcome = self.process_set(&mut job, &paths, &display_code).await;
            progress.log(outcome.log_line());
            progress.progress(position, requested);

            if position < requested
                && self.set_limiter.pause_unless_cancelled(cancel).await.is_err()
            {
                debug!("Pause between sets interrupted by cancellation");
                job.status = JobStatus::Cancelled;
                break;
            }
        }

        if job.status != JobStatus::Cancelled && cancel.is_cancelled() {
            job.status = JobStatus::Cancelled;
        }

        let mut combined_files = Vec::new();
        if job.status == JobStatus::Cancelled {
            warn!(
                "Bulk fetch cancelled after {} of {} set(s)",
                job.outcomes().len(),
                requested
            );
            progress.log("=== Cancelled by user ===");
        } else {
            if job.combined && !job.entries().is_empty() {
                progress.log("=== Creating combined files ===");
                let writer = CombinedFileWriter::with_paths(paths.clone());
                match writer.write_batches(job.entries(), job.format, job.split_threshold) {
                    Ok(files) => {
                        for file in &files {
                            progress.log(format!(
                                ">>> Created combined file: {} ({} entries)",
                                file.path.display(),
                                file.entries
                            ));
                        }
                        progress.log(format!(
                            "Combined files complete: {} file(s) created",
                            files.len()
                        ));
                        combined_files = files.into_iter().map(|f| f.path).collect();
                    }
                    Err(e) => {
                        warn!("Combined file stage failed: {}", e);
                        progress.log(format!("✗ Combined files failed: {e}"));
                        job.status = JobStatus::Failed;
                        let report = job.into_report(combined_files, started_at, Utc::now());
                        log_summary(&report, progress);
                        return Err(PipelineError::CombinedOutput {
                            source: e,
                            report: Box::new(report),
                        });
                    }
                }
            }
            job.status = JobStatus::Completed;
        }

        let report = job.into_report(combined_files, started_at, Utc::now());
        info!(
            status = %report.status,
            succeeded = report.succeeded,
            failed = report.failed,
            entries = report.total_entries,
            "Bulk fetch finished"
        );
        log_summary(&report, progress);
        Ok(report)
    }

    /// Fetch, normalize and write one set, recording its outcome on the job
    async fn process_set(
        &self,
        job: &mut FetchJob,
        paths: &ExportPaths,
        display_code: &str,
    ) -> FetchOutcome {
        let remote_code = self.resolver.to_remote_code(display_code);
        let span = info_span!("set", display = %display_code, remote = %remote_code);
        self.fetch_and_export(job, paths, display_code, &remote_code)
            .instrument(span)
            .await
    }

    async fn fetch_and_export(
        &self,
        job: &mut FetchJob,
        paths: &ExportPaths,
        display_code: &str,
        remote_code: &str,
    ) -> FetchOutcome {
        let metrics = SetFetchMetrics::start(display_code);
        debug!("Resolved set code");

        let items = match self.fetch(remote_code).await {
            Ok(items) => relabel(items, display_code),
            Err(e) => {
                metrics.record_failure(e.description());
                return job.record_failure(display_code, e.description());
            }
        };

        let entries = flatten_all(&items);
        match write_set_file(paths, display_code, &entries, job.format) {
            Ok(_) => {
                metrics.record_success(items.len(), entries.len());
                job.record_success(display_code, items.len(), entries)
            }
            Err(e) => {
                let error = e.to_string();
                metrics.record_failure(&error);
                job.record_failure(display_code, error)
            }
        }
    }

    async fn fetch(&self, remote_code: &str) -> FetcherResult<Vec<PricedItem>> {
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch_set(remote_code))
                .await
                .unwrap_or_else(|_| {
                    Err(FetcherError::RemoteUnavailable(
                        TIMEOUT_DESCRIPTION.to_string(),
                    ))
                }),
            None => self.source.fetch_set(remote_code).await,
        }
    }
}

fn default_resolver() -> CodeResolver {
    match SetCatalog::load() {
        Ok(catalog) => catalog.resolver().unwrap_or_else(|e| {
            warn!("Invalid override table, using identity codes: {}", e);
            CodeResolver::identity()
        }),
        Err(e) => {
            warn!("Embedded catalog unavailable, using identity codes: {}", e);
            CodeResolver::identity()
        }
    }
}

/// File every item under the display code so exports use it in composite codes
fn relabel(mut items: Vec<PricedItem>, display_code: &str) -> Vec<PricedItem> {
    for item in &mut items {
        item.set_code = display_code.to_string();
    }
    items
}

fn log_header(job: &FetchJob, progress: &ProgressReporter) {
    progress.log("=== Bulk Fetch Started ===");
    progress.log(format!("Sets selected: {}", job.sets.len()));
    progress.log(format!("Export format: {}", job.format));
    if job.combined {
        progress.log(format!(
            "Combined files: enabled (split every {} entries)",
            job.split_threshold
        ));
    } else {
        progress.log("Combined files: disabled");
    }
}

fn log_summary(report: &JobReport, progress: &ProgressReporter) {
    progress.log("=== Fetch Complete ===");
    progress.log(report.summary_line());
    progress.finished(report.status);
}
