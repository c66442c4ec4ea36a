//! Scryfall response parsing
//!
//! Wire structs mirror the subset of the Scryfall card object the pipeline
//! uses. Missing optional fields are tolerated; price strings that are not
//! decimals are not.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::{PriceQuotes, PricedItem, Rarity};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// One page of `/cards/search` results
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    /// Cards on this page
    #[serde(default)]
    pub data: Vec<RawCard>,
    /// Whether a continuation page exists
    #[serde(default)]
    pub has_more: bool,
    /// Absolute URL of the continuation page
    #[serde(default)]
    pub next_page: Option<String>,
    /// Total matching cards across all pages
    #[serde(default)]
    pub total_cards: Option<u64>,
}

/// Card object as returned by Scryfall
#[derive(Debug, Deserialize)]
pub struct RawCard {
    /// Card name
    pub name: String,
    /// Set code (lowercase on the wire)
    pub set: String,
    /// Collector number, may carry markers such as `★`
    pub collector_number: String,
    /// Rarity tag
    #[serde(default)]
    pub rarity: Option<String>,
    /// Artist credit
    #[serde(default)]
    pub artist: Option<String>,
    /// Frame effects (showcase, extendedart, ...)
    #[serde(default)]
    pub frame_effects: Option<Vec<String>>,
    /// Price quotes
    #[serde(default)]
    pub prices: Option<RawPrices>,
}

/// Price block; every quote is a nullable decimal string
#[derive(Debug, Default, Deserialize)]
pub struct RawPrices {
    /// Non-foil USD
    #[serde(default)]
    pub usd: Option<String>,
    /// Foil USD
    #[serde(default)]
    pub usd_foil: Option<String>,
    /// Etched foil USD
    #[serde(default)]
    pub usd_etched: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    details: String,
}

impl RawCard {
    /// Convert into the domain model
    ///
    /// # Errors
    /// Returns [`FetcherError::RemoteUnavailable`] if a price is not a decimal
    pub fn into_item(self) -> FetcherResult<PricedItem> {
        let prices = match self.prices {
            Some(raw) => PriceQuotes {
                normal: parse_quote(raw.usd.as_deref(), &self.name)?,
                foil: parse_quote(raw.usd_foil.as_deref(), &self.name)?,
                etched: parse_quote(raw.usd_etched.as_deref(), &self.name)?,
            },
            None => PriceQuotes::default(),
        };

        let rarity = self
            .rarity
            .as_deref()
            .and_then(|tag| Rarity::from_str(tag).ok());

        Ok(PricedItem {
            set_code: self.set.to_uppercase(),
            collector_number: clean_collector_number(&self.collector_number),
            name: self.name,
            rarity,
            artist: self.artist.filter(|a| !a.trim().is_empty()),
            frame_effects: self.frame_effects.unwrap_or_default(),
            prices,
        })
    }
}

impl SearchPage {
    /// Convert every card on the page, preserving order
    pub fn into_items(self) -> FetcherResult<Vec<PricedItem>> {
        self.data.into_iter().map(RawCard::into_item).collect()
    }
}

/// Strip every character that is not an ASCII letter or digit
pub fn clean_collector_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// `details` message from a Scryfall error object, if the body is one
pub fn error_details(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|e| e.details)
}

fn parse_quote(raw: Option<&str>, card_name: &str) -> FetcherResult<Option<Decimal>> {
    match raw {
        None => Ok(None),
        Some(s) => Decimal::from_str(s.trim()).map(Some).map_err(|e| {
            FetcherError::RemoteUnavailable(format!(
                "Invalid price '{s}' for {card_name}: {e}"
            ))
        }),
    }
}
