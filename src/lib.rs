//! # Card Pricer Library
//!
//! Bulk price fetching and export for trading card sets. Given a list of set
//! codes, the library pulls every priced printing of each set from the
//! Scryfall search API, normalizes and rounds the prices under store pricing
//! rules, and writes point-of-sale import files.
//!
//! ## Features
//!
//! - **Paginated Fetching**: Follows Scryfall continuation pages with a fixed
//!   inter-request delay
//! - **Failure Isolation**: One set failing never aborts the rest of a bulk job
//! - **Cooperative Cancellation**: Jobs stop cleanly at the next set boundary
//! - **Deterministic Exports**: Per-set files plus optional combined files split
//!   into fixed-size batches
//!
//! ## Quick Start
//!
//! ```no_run
//! use card_pricer::cancel::CancellationToken;
//! use card_pricer::fetcher::scryfall::ScryfallFetcher;
//! use card_pricer::output::ExportFormat;
//! use card_pricer::pipeline::{BulkFetchExecutor, FetchJob, ProgressReporter};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(ScryfallFetcher::new(3));
//! let executor = BulkFetchExecutor::new(source);
//!
//! let job = FetchJob::new(
//!     vec!["MKM".to_string(), "XED".to_string()],
//!     ExportFormat::ImportUtility,
//!     "./data",
//! )
//! .with_combined(10_000);
//!
//! let report = executor
//!     .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
//!     .await?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - Embedded set list and display/remote code resolution
//! - [`fetcher`] - Remote price sources (Scryfall) with pagination
//! - [`pricing`] - Price flattening and the store rounding rule
//! - [`pipeline`] - Bulk job orchestration, progress events, pacing
//! - [`output`] - CSV export formats, per-set and combined writers
//! - [`cancel`] - Cancellation token shared with the presentation layer

#![warn(missing_docs)]
#![warn(clippy::all)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cancellation token shared between the pipeline and its caller
pub mod cancel;

/// Set catalog and code resolution
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// Remote price sources
pub mod fetcher;

/// Metrics recording helpers
pub mod metrics;

/// Export writers
pub mod output;

/// Bulk fetch orchestration
pub mod pipeline;

/// Price normalization and rounding
pub mod pricing;

pub use catalog::resolver::CodeResolver;
pub use pricing::{flatten, round_price};

/// Card rarity as reported by the pricing API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Common
    Common,
    /// Uncommon
    Uncommon,
    /// Rare
    Rare,
    /// Mythic rare
    Mythic,
    /// Special (timeshifted, etc.)
    Special,
    /// Bonus sheet
    Bonus,
    /// Any rarity tag not listed above, stored lowercase
    #[serde(untagged)]
    Other(String),
}

impl Rarity {
    /// Single-letter abbreviation used in export files (C/U/R/M)
    ///
    /// Unrecognized rarities are exported as their uppercased tag.
    pub fn abbreviation(&self) -> String {
        match self {
            Rarity::Common => "C".to_string(),
            Rarity::Uncommon => "U".to_string(),
            Rarity::Rare => "R".to_string(),
            Rarity::Mythic => "M".to_string(),
            Rarity::Special => "SPECIAL".to_string(),
            Rarity::Bonus => "BONUS".to_string(),
            Rarity::Other(tag) => tag.to_uppercase(),
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
            Rarity::Special => "special",
            Rarity::Bonus => "bonus",
            Rarity::Other(tag) => tag.as_str(),
        };
        write!(f, "{s}")
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        match tag.as_str() {
            "" => Err("Rarity cannot be empty".to_string()),
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "mythic" => Ok(Rarity::Mythic),
            "special" => Ok(Rarity::Special),
            "bonus" => Ok(Rarity::Bonus),
            _ => Ok(Rarity::Other(tag)),
        }
    }
}

/// Priced finish of a printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    /// Non-foil
    Normal,
    /// Traditional foil
    Foil,
    /// Etched foil
    Etched,
}

impl Finish {
    /// Marker appended to the composite code; empty for the normal finish
    pub fn code_marker(&self) -> &'static str {
        match self {
            Finish::Normal => "",
            Finish::Foil => "f",
            Finish::Etched => "e",
        }
    }
}

impl std::fmt::Display for Finish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Finish::Normal => "normal",
            Finish::Foil => "foil",
            Finish::Etched => "etched",
        };
        write!(f, "{s}")
    }
}

/// Independently-nullable price quotes for one printing
///
/// `None` means the API has no price for that finish. A quote of zero is a
/// real price and is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuotes {
    /// Non-foil price
    pub normal: Option<Decimal>,
    /// Foil price
    pub foil: Option<Decimal>,
    /// Etched foil price
    pub etched: Option<Decimal>,
}

impl PriceQuotes {
    /// Quote for a given finish
    pub fn get(&self, finish: Finish) -> Option<Decimal> {
        match finish {
            Finish::Normal => self.normal,
            Finish::Foil => self.foil,
            Finish::Etched => self.etched,
        }
    }

    /// Whether no finish has a quote
    pub fn is_empty(&self) -> bool {
        self.normal.is_none() && self.foil.is_none() && self.etched.is_none()
    }
}

/// One printing returned by the pricing API for a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    /// Set code the item is filed under (uppercase)
    pub set_code: String,
    /// Collector number with marker characters stripped
    pub collector_number: String,
    /// Card name
    pub name: String,
    /// Rarity, if reported
    pub rarity: Option<Rarity>,
    /// Artist attribution, if reported
    pub artist: Option<String>,
    /// Visual variant tags (frame effects) in API order
    pub frame_effects: Vec<String>,
    /// Price quotes per finish
    pub prices: PriceQuotes,
}

impl PricedItem {
    /// Human-readable label of the primary visual variant, if any
    pub fn variant_label(&self) -> Option<String> {
        let effect = self.frame_effects.first()?;
        let label = match effect.to_lowercase().as_str() {
            "showcase" => "Showcase".to_string(),
            "extendedart" => "Extended Art".to_string(),
            "borderless" => "Borderless".to_string(),
            "etched" => "Etched".to_string(),
            "inverted" => "Inverted".to_string(),
            _ => effect.clone(),
        };
        Some(label)
    }
}

/// One export-ready line: a single priced finish of a printing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Composite code: `"{SET} {number}"` plus the finish marker
    pub code: String,
    /// Display name including any variant suffix
    pub description: String,
    /// Rounded price
    pub price: Decimal,
    /// Rarity, kept for downstream rules
    pub rarity: Option<Rarity>,
    /// Artist attribution
    pub artist: Option<String>,
    /// Finish this entry prices
    pub finish: Finish,
}
