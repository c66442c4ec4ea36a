//! Single-card price lookup

use crate::catalog::SetCatalog;
use crate::fetcher::PriceSource;
use crate::pricing::flatten;
use clap::Parser;
use serde_json::json;
use tracing::info;

use super::{Cli, CliError};

/// Lookup command arguments
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Display set code (e.g. MKM)
    pub set: String,

    /// Collector number exactly as Scryfall lists it, markers included (e.g. 123★)
    ///
    /// Export codes carry cleaned numbers, so a starred printing exported as
    /// `MKM 123` must be looked up as `123★`.
    pub number: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl LookupArgs {
    /// Fetch one card and print its rounded export prices
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let display_code = self.set.trim().to_uppercase();
        if display_code.is_empty() || self.number.trim().is_empty() {
            return Err(CliError::InvalidArgument(
                "Set code and collector number are required".to_string(),
            ));
        }

        let remote_code = SetCatalog::load()?
            .resolver()?
            .to_remote_code(&display_code);
        info!("Looking up {} #{} (remote {})", display_code, self.number, remote_code);

        let mut item = cli
            .fetcher()
            .fetch_card(&remote_code, self.number.trim())
            .await?;
        item.set_code = display_code;
        let entries = flatten(&item);

        if self.json {
            let output = json!({
                "name": item.name,
                "set_code": item.set_code,
                "collector_number": item.collector_number,
                "rarity": item.rarity,
                "prices": item.prices,
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{} ({} #{})", item.name, item.set_code, item.collector_number);
        if entries.is_empty() {
            println!("No USD prices available");
        }
        for entry in &entries {
            println!("{:<12} {:<7} {:.2}", entry.code, entry.finish.to_string(), entry.price);
        }
        Ok(())
    }
}
