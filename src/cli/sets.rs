//! CLI command for browsing the set catalog

use crate::catalog::SetCatalog;
use clap::Args;
use serde_json::json;

use super::CliError;

/// Sets subcommand
#[derive(Debug, Args)]
pub struct SetsCommand {
    #[command(subcommand)]
    action: SetsAction,
}

/// Sets actions
#[derive(Debug, clap::Subcommand)]
enum SetsAction {
    /// List selectable set codes
    List {
        /// Optional case-insensitive substring to filter codes by
        pattern: Option<String>,

        /// Print JSON instead of one code per line
        #[arg(long)]
        json: bool,
    },
    /// Show display codes that use a different code on the price API
    Overrides {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl SetsCommand {
    /// Execute the sets command
    pub fn execute(&self) -> Result<(), CliError> {
        let catalog = SetCatalog::load()?;
        match &self.action {
            SetsAction::List { pattern, json } => {
                list(catalog, pattern.as_deref().unwrap_or(""), *json)
            }
            SetsAction::Overrides { json } => overrides(catalog, *json),
        }
    }
}

fn list(catalog: &SetCatalog, pattern: &str, as_json: bool) -> Result<(), CliError> {
    let codes = catalog.filter(pattern);

    if as_json {
        let output = json!({
            "schema_version": catalog.schema_version(),
            "count": codes.len(),
            "sets": codes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for code in &codes {
            println!("{code}");
        }
        eprintln!("{} set(s)", codes.len());
    }
    Ok(())
}

fn overrides(catalog: &SetCatalog, as_json: bool) -> Result<(), CliError> {
    let pairs = catalog.overrides();

    if as_json {
        let output: Vec<_> = pairs
            .iter()
            .map(|(display, remote)| json!({ "display": display, "remote": remote }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (display, remote) in pairs {
            println!("{display} -> {remote}");
        }
    }
    Ok(())
}
