//! Fetch command implementation

use crate::cancel::CancellationToken;
use crate::catalog::SetCatalog;
use crate::fetcher::scryfall::{ScryfallFetcher, SCRYFALL_BASE_URL};
use crate::output::ExportFormat;
use crate::pipeline::config::{
    DEFAULT_OUTPUT_DIR, DEFAULT_SPLIT_THRESHOLD, MAX_RETRIES, MAX_SPLIT_THRESHOLD,
    MIN_SPLIT_THRESHOLD,
};
use crate::pipeline::{
    progress_channel, BulkFetchExecutor, FetchJob, JobReport, JobStatus, PipelineError,
    ProgressEvent,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};

use super::CliError;

/// Parse and validate a combined-file split threshold
fn parse_split_threshold(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(MIN_SPLIT_THRESHOLD..=MAX_SPLIT_THRESHOLD).contains(&value) {
        return Err(format!(
            "split threshold {value} must be between {MIN_SPLIT_THRESHOLD} and {MAX_SPLIT_THRESHOLD}"
        ));
    }
    Ok(value)
}

/// Card set price exporter CLI
#[derive(Parser, Debug)]
#[command(name = "card-pricer")]
#[command(about = "Bulk-fetch card set prices and export point-of-sale import files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Maximum number of retries for failed requests (range: 0-10)
    #[arg(long, global = true, default_value_t = MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// Price API base URL
    #[arg(long, global = true, default_value = SCRYFALL_BASE_URL)]
    pub base_url: String,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Price source configured from the global flags
    pub fn fetcher(&self) -> ScryfallFetcher {
        ScryfallFetcher::with_base_url(self.base_url.clone(), self.max_retries)
    }
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch prices for one or more sets and write export files
    Fetch(FetchArgs),

    /// List or search the set catalog
    Sets(super::SetsCommand),

    /// Look up the exported prices of a single card
    Lookup(super::LookupArgs),
}

/// Fetch command arguments
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Set codes to fetch, in order (e.g. MKM,OTJ or MKM OTJ)
    #[arg(value_delimiter = ',', required_unless_present = "all")]
    pub sets: Vec<String>,

    /// Fetch every set in the catalog
    #[arg(long, conflicts_with = "sets")]
    pub all: bool,

    /// Export format: import-utility, item-wizard or zero-out
    #[arg(long, default_value = "import-utility")]
    pub format: ExportFormat,

    /// Also write combined files across all fetched sets
    #[arg(long)]
    pub combined: bool,

    /// Maximum entries per combined file (range: 1000-100000)
    #[arg(long, default_value_t = DEFAULT_SPLIT_THRESHOLD, value_parser = parse_split_threshold)]
    pub split: usize,

    /// Output directory
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Accept set codes missing from the catalog
    #[arg(long)]
    pub allow_unknown: bool,

    /// Print the final report as JSON instead of progress output
    #[arg(long)]
    pub json: bool,
}

impl FetchArgs {
    /// Resolve the requested display codes
    pub fn selected_sets(&self) -> Result<Vec<String>, CliError> {
        let catalog = SetCatalog::load()?;

        if self.all {
            return Ok(catalog.list().to_vec());
        }

        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if sets.is_empty() {
            return Err(CliError::InvalidArgument(
                "At least one set must be selected".to_string(),
            ));
        }

        if !self.allow_unknown {
            for code in &sets {
                catalog.validate(code)?;
            }
        }

        Ok(sets)
    }

    /// Build the job described by these arguments
    pub fn build_job(&self) -> Result<FetchJob, CliError> {
        let job = FetchJob::new(self.selected_sets()?, self.format, self.output_dir.clone());
        Ok(if self.combined {
            job.with_combined(self.split)
        } else {
            job
        })
    }

    /// Execute the fetch command
    pub async fn execute(&self, cli: &Cli, cancel: CancellationToken) -> Result<(), CliError> {
        let job = self.build_job()?;
        let requested = job.sets.len();
        info!(
            "Starting fetch of {} set(s) into {}",
            requested,
            self.output_dir.display()
        );

        let executor = BulkFetchExecutor::new(Arc::new(cli.fetcher()));
        let (reporter, events) = progress_channel();
        let progress = if self.json {
            ProgressBar::hidden()
        } else {
            create_progress_bar(requested)
        };
        let drain = tokio::spawn(drain_events(events, progress, self.json));

        let result = executor.execute(job, &cancel, reporter).await;
        if let Err(e) = drain.await {
            warn!("Progress display task ended abnormally: {}", e);
        }

        match result {
            Ok(report) => {
                self.print_report(&report)?;
                if report.status == JobStatus::Cancelled {
                    warn!(
                        "Fetch cancelled after {} of {} set(s)",
                        report.outcomes.len(),
                        report.sets_requested
                    );
                }
                Ok(())
            }
            Err(PipelineError::CombinedOutput { source, report }) => {
                self.print_report(&report)?;
                error!("Combined output failed: {}", source);
                Err(PipelineError::CombinedOutput { source, report }.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn print_report(&self, report: &JobReport) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        println!("\nFetch {}!", report.status);
        println!("Output: {}", report.output_dir.display());
        println!("{}", report.summary_line());
        for path in &report.combined_files {
            println!("Combined: {}", path.display());
        }
        Ok(())
    }
}

/// Forward pipeline events to the terminal until the channel closes
async fn drain_events(
    mut events: UnboundedReceiver<ProgressEvent>,
    progress: ProgressBar,
    quiet: bool,
) {
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Progress { completed, .. } => progress.set_position(completed as u64),
            ProgressEvent::Log(line) => {
                if !quiet {
                    progress.println(line);
                }
            }
            ProgressEvent::Finished(_) => progress.finish_and_clear(),
        }
    }
}

fn create_progress_bar(sets: usize) -> ProgressBar {
    let pb = ProgressBar::new(sets as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message("Fetching sets");
    pb
}
