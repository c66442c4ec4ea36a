//! Main entry point for the card-pricer CLI

use card_pricer::cancel::CancellationToken;
use card_pricer::cli::{Cli, Commands};
use card_pricer::metrics::init_metrics;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("card_pricer=info"));

    // stdout carries command output; logs go to stderr
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = init_metrics(addr) {
            error!("Metrics exporter failed to start: {}", e);
            std::process::exit(1);
        }
    }

    // Ctrl+C stops the run at the next set boundary
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - stopping after the current set...");
                cancel.cancel();
            }
        }
    });

    let result = match cli.command {
        Commands::Fetch(ref args) => args
            .execute(&cli, cancel.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Sets(ref sets_cmd) => sets_cmd.execute().map_err(|e| anyhow::anyhow!(e)),
        Commands::Lookup(ref args) => args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
