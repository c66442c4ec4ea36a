//! Bulk fetch job structures and status tracking

use crate::output::ExportFormat;
use crate::pipeline::config::DEFAULT_SPLIT_THRESHOLD;
use crate::ExportEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Job lifecycle
///
/// `Pending → Running → {Completed, Cancelled, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job created but not started
    #[default]
    Pending,
    /// Job is running
    Running,
    /// Every requested set was processed
    Completed,
    /// Stopped early at a set boundary
    Cancelled,
    /// Combined output could not be written
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Result of processing one set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum FetchOutcome {
    /// Set fetched and its file written
    Success {
        /// Display code
        set_code: String,
        /// Priced items returned by the source
        items: usize,
    },
    /// Set fetch or per-set write failed
    Failure {
        /// Display code
        set_code: String,
        /// Failure description
        error: String,
    },
}

impl FetchOutcome {
    /// Display code this outcome is for
    pub fn set_code(&self) -> &str {
        match self {
            FetchOutcome::Success { set_code, .. } | FetchOutcome::Failure { set_code, .. } => {
                set_code
            }
        }
    }

    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Operator log line for this outcome
    pub fn log_line(&self) -> String {
        match self {
            FetchOutcome::Success { set_code, items } => {
                format!("✓ {set_code} - Success ({items} cards)")
            }
            FetchOutcome::Failure { set_code, error } => {
                format!("✗ {set_code} - Failed: {error}")
            }
        }
    }
}

/// Bulk fetch job specification and accumulated state
///
/// Outcomes and entries only grow while the job runs. A job is consumed by
/// one run.
#[derive(Debug, Clone)]
pub struct FetchJob {
    /// Requested display codes, in processing order
    pub sets: Vec<String>,
    /// Export format
    pub format: ExportFormat,
    /// Write combined files after the last set
    pub combined: bool,
    /// Maximum entries per combined file
    pub split_threshold: usize,
    /// Output directory
    pub output_dir: PathBuf,
    /// Current job status
    pub status: JobStatus,
    outcomes: Vec<FetchOutcome>,
    entries: Vec<ExportEntry>,
}

impl FetchJob {
    /// Create a pending job without combined output
    pub fn new(sets: Vec<String>, format: ExportFormat, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            sets,
            format,
            combined: false,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            output_dir: output_dir.into(),
            status: JobStatus::Pending,
            outcomes: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Request combined files split every `split_threshold` entries
    pub fn with_combined(mut self, split_threshold: usize) -> Self {
        self.combined = true;
        self.split_threshold = split_threshold;
        self
    }

    /// Validate job parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.sets.is_empty() {
            return Err("At least one set must be selected".to_string());
        }

        if let Some(pos) = self.sets.iter().position(|s| s.trim().is_empty()) {
            return Err(format!("Set code at position {} is empty", pos + 1));
        }

        if self.split_threshold == 0 {
            return Err("Split threshold must be at least 1".to_string());
        }

        if self.status != JobStatus::Pending {
            return Err(format!("Job already {}", self.status));
        }

        Ok(())
    }

    /// Record a successful set and append its entries to the aggregate
    pub fn record_success(
        &mut self,
        set_code: &str,
        items: usize,
        entries: Vec<ExportEntry>,
    ) -> FetchOutcome {
        let outcome = FetchOutcome::Success {
            set_code: set_code.to_string(),
            items,
        };
        self.outcomes.push(outcome.clone());
        self.entries.extend(entries);
        outcome
    }

    /// Record a failed set
    pub fn record_failure(&mut self, set_code: &str, error: impl Into<String>) -> FetchOutcome {
        let outcome = FetchOutcome::Failure {
            set_code: set_code.to_string(),
            error: error.into(),
        };
        self.outcomes.push(outcome.clone());
        outcome
    }

    /// Outcomes so far, one per processed set
    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    /// Aggregated entries in processing order
    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    /// Number of successful sets
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed sets
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Finalize into a report
    pub fn into_report(
        self,
        combined_files: Vec<PathBuf>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> JobReport {
        let succeeded = self.success_count();
        let failed = self.failure_count();
        JobReport {
            status: self.status,
            format: self.format,
            sets_requested: self.sets.len(),
            succeeded,
            failed,
            total_entries: self.entries.len(),
            outcomes: self.outcomes,
            combined_files,
            output_dir: self.output_dir,
            started_at,
            finished_at,
            entries: self.entries,
        }
    }
}

/// Final state of a run
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Terminal status
    pub status: JobStatus,
    /// Export format used
    pub format: ExportFormat,
    /// Number of sets requested
    pub sets_requested: usize,
    /// Successful sets
    pub succeeded: usize,
    /// Failed sets
    pub failed: usize,
    /// Aggregated entry count
    pub total_entries: usize,
    /// One outcome per processed set
    pub outcomes: Vec<FetchOutcome>,
    /// Combined files written, in batch order
    pub combined_files: Vec<PathBuf>,
    /// Output directory
    pub output_dir: PathBuf,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
    /// Aggregated entries
    #[serde(skip)]
    pub entries: Vec<ExportEntry>,
}

impl JobReport {
    /// One-line summary for logs
    pub fn summary_line(&self) -> String {
        format!(
            "Successful: {} | Failed: {} | Total: {} | Total card entries: {}",
            self.succeeded, self.failed, self.sets_requested, self.total_entries
        )
    }
}
