//! CLI error types and conversions

use crate::catalog::CatalogError;
use crate::fetcher::FetcherError;
use crate::metrics::MetricsError;
use crate::output::OutputError;
use crate::pipeline::PipelineError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Catalog error
    #[error("catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    /// Pipeline error
    #[error("pipeline error: {0}")]
    PipelineError(#[from] PipelineError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Metrics exporter error
    #[error("metrics error: {0}")]
    MetricsError(#[from] MetricsError),

    /// Report serialization error
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<&'static CatalogError> for CliError {
    fn from(e: &'static CatalogError) -> Self {
        CliError::CatalogError(e.clone())
    }
}
