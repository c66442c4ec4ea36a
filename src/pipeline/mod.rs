//! Bulk fetch orchestration
//!
//! This module runs a batch of sets through fetch, normalization and export
//! as one serialized unit of work.
//!
//! # Overview
//!
//! 1. **Job Creation**: Describe the run with [`job::FetchJob`]
//! 2. **Execution**: Process it with [`executor::BulkFetchExecutor`]
//! 3. **Pacing**: Fixed delays between sets via [`rate_limit::RateLimiter`]
//! 4. **Progress**: Events over an unbounded channel ([`progress::ProgressEvent`])
//! 5. **Cancellation**: A [`crate::cancel::CancellationToken`] checked between sets
//!
//! # Quick Start
//!
//! ```no_run
//! use card_pricer::cancel::CancellationToken;
//! use card_pricer::fetcher::scryfall::ScryfallFetcher;
//! use card_pricer::output::ExportFormat;
//! use card_pricer::pipeline::{progress_channel, BulkFetchExecutor, FetchJob, ProgressEvent};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = BulkFetchExecutor::new(Arc::new(ScryfallFetcher::new(3)));
//! let job = FetchJob::new(vec!["DMU".into()], ExportFormat::ItemWizard, "data");
//!
//! let (reporter, mut events) = progress_channel();
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         if let ProgressEvent::Log(line) = event {
//!             println!("{line}");
//!         }
//!     }
//! });
//!
//! let report = executor.execute(job, &CancellationToken::new(), reporter).await?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Per-set failures never abort a run; they are recorded as
//! [`job::FetchOutcome::Failure`]. Only job-level problems surface as
//! [`PipelineError`].

pub mod config;
pub mod executor;
pub mod job;
pub mod progress;
pub mod rate_limit;

pub use executor::BulkFetchExecutor;
pub use job::{FetchJob, FetchOutcome, JobReport, JobStatus};
pub use progress::{progress_channel, ProgressEvent, ProgressReporter};
pub use rate_limit::{RateLimitError, RateLimiter};

use crate::output::OutputError;

/// Job-level pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Job parameters rejected before running
    #[error("validation error: {0}")]
    Validation(String),

    /// Another job is already running in this process
    #[error("a bulk fetch job is already running")]
    AlreadyRunning,

    /// Combined files could not be written; per-set results are in `report`
    #[error("combined output failed: {source}")]
    CombinedOutput {
        /// Underlying write error
        #[source]
        source: OutputError,
        /// Report of the run up to the failure, with status `Failed`
        report: Box<JobReport>,
    },
}
