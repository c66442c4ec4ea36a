//! File naming for exports
//!
//! All exports land flat in one output directory:
//!
//! ```text
//! data/
//!   MKM_prices.csv
//!   XED_prices.csv
//!   00_combined_list.csv
//!   01_combined_list.csv
//! ```
//!
//! # Usage Example
//!
//! ```rust
//! use card_pricer::output::ExportPaths;
//! use std::path::PathBuf;
//!
//! let paths = ExportPaths::new("data");
//! assert_eq!(paths.set_file("mkm"), PathBuf::from("data/MKM_prices.csv"));
//! assert_eq!(paths.combined_file(1), PathBuf::from("data/01_combined_list.csv"));
//! ```

use super::{OutputError, OutputResult};
use std::path::{Path, PathBuf};

/// Resolves export file paths under one root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    root: PathBuf,
}

impl ExportPaths {
    /// Paths rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory if it is missing
    pub fn ensure_root(&self) -> OutputResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            OutputError::IoError(format!(
                "Failed to create directory {}: {e}",
                self.root.display()
            ))
        })
    }

    /// Per-set export path: `{CODE}_prices.csv`
    pub fn set_file(&self, display_code: &str) -> PathBuf {
        self.root.join(set_file_name(display_code))
    }

    /// Combined export path: `{NN}_combined_list.csv`
    pub fn combined_file(&self, index: usize) -> PathBuf {
        self.root.join(combined_file_name(index))
    }
}

/// `{CODE}_prices.csv` with the code uppercased
pub fn set_file_name(display_code: &str) -> String {
    format!("{}_prices.csv", sanitize_code(display_code))
}

/// `{NN}_combined_list.csv`, zero-padded to at least two digits
pub fn combined_file_name(index: usize) -> String {
    format!("{index:02}_combined_list.csv")
}

/// Uppercase and replace anything that is not an ASCII letter or digit
fn sanitize_code(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
