//! Export writers
//!
//! - [`ExportFormat`] - Row layouts understood by the point-of-sale import tool
//! - [`csv`] - Per-set and combined CSV writers
//! - [`path`] - File naming inside the output directory

use crate::ExportEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod csv;
pub mod path;

pub use self::csv::{write_set_file, CombinedFileWriter, CsvEntriesWriter};
pub use path::ExportPaths;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),

    /// Combined file split threshold must be positive
    #[error("invalid split threshold: {0} (must be at least 1)")]
    InvalidSplitThreshold(usize),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Import-utility header line
pub const IMPORT_UTILITY_HEADER: [&str; 8] = [
    "DEPARTMENT",
    "CATEGORY",
    "CODE",
    "DESCRIPTION",
    "EXTENDED DESCRIPTION",
    "SUB DESCRIPTION",
    "TAX",
    "PRICE",
];

/// Fixed department column for import-utility rows
const DEPARTMENT: &str = "5";
/// Fixed category column for import-utility rows
const CATEGORY: &str = "5.2";
/// Tax code column for import-utility rows
const TAX: &str = "TAX";

/// Row layout of an export file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Full item import with header and rarity/artist columns
    #[default]
    ImportUtility,
    /// Headerless price update rows
    ItemWizard,
    /// Headerless rows that zero out quantity (combined files only)
    ZeroOut,
}

impl ExportFormat {
    /// All formats, for help text and validation
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::ImportUtility,
        ExportFormat::ItemWizard,
        ExportFormat::ZeroOut,
    ];

    /// Header row, if this format has one
    pub fn header(&self) -> Option<&'static [&'static str]> {
        match self {
            ExportFormat::ImportUtility => Some(&IMPORT_UTILITY_HEADER),
            ExportFormat::ItemWizard | ExportFormat::ZeroOut => None,
        }
    }

    /// Layout used for per-set files
    ///
    /// Zero-out only applies to combined files; per-set files fall back to
    /// the item-wizard layout.
    pub fn per_set_layout(&self) -> ExportFormat {
        match self {
            ExportFormat::ZeroOut => ExportFormat::ItemWizard,
            other => *other,
        }
    }

    /// CSV fields for one entry
    pub fn row(&self, entry: &ExportEntry) -> Vec<String> {
        let artist = entry.artist.clone().unwrap_or_default();
        match self {
            ExportFormat::ImportUtility => vec![
                DEPARTMENT.to_string(),
                CATEGORY.to_string(),
                entry.code.clone(),
                entry.description.clone(),
                artist,
                entry
                    .rarity
                    .as_ref()
                    .map(|r| r.abbreviation())
                    .unwrap_or_default(),
                TAX.to_string(),
                format_price(entry),
            ],
            ExportFormat::ItemWizard => vec![
                entry.code.clone(),
                entry.description.clone(),
                String::new(),
                "0".to_string(),
                "0.0".to_string(),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
                format_price(entry),
            ],
            ExportFormat::ZeroOut => vec![
                entry.code.clone(),
                entry.description.clone(),
                artist,
                String::new(),
                "0".to_string(),
            ],
        }
    }
}

/// Two-decimal price text
pub fn format_price(entry: &ExportEntry) -> String {
    format!("{:.2}", entry.price)
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::ImportUtility => "import-utility",
            ExportFormat::ItemWizard => "item-wizard",
            ExportFormat::ZeroOut => "zero-out",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "import-utility" | "import" => Ok(ExportFormat::ImportUtility),
            "item-wizard" | "wizard" => Ok(ExportFormat::ItemWizard),
            "zero-out" | "zero" => Ok(ExportFormat::ZeroOut),
            _ => Err(format!(
                "Invalid export format: {s}. Valid options: import-utility, item-wizard, zero-out"
            )),
        }
    }
}

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Trait for writing export entries
pub trait EntriesWriter: OutputWriter {
    /// Write a single entry
    fn write_entry(&mut self, entry: &ExportEntry) -> OutputResult<()>;

    /// Write multiple entries at once
    fn write_entries(&mut self, entries: &[ExportEntry]) -> OutputResult<()> {
        for entry in entries {
            self.write_entry(entry)?;
        }
        Ok(())
    }
}
