//! Command-line entry point: one ingestion run, then exit.
//!
//! Reads the five `DB_*` connection variables from the environment (a local
//! `.env` file is honored when present), runs the pipeline once, and exits
//! non-zero with the underlying error if any stage fails. A failed run
//! commits nothing.

use std::error::Error;

use tracing::{error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use pravda_headlines::config::DbConfig;
use pravda_headlines::pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("pravda_headlines starting up");

    // .env is a convenience for local runs; its absence is fine.
    if dotenvy::dotenv().is_ok() {
        info!("Loaded environment from .env");
    }

    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Database configuration is incomplete");
            return Err(e.into());
        }
    };

    let report = match pipeline::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Run aborted; nothing was committed");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        extracted = report.extracted,
        news = report.outcome.news_inserted,
        authors = report.outcome.authors_inserted,
        links = report.outcome.links_inserted,
        "Execution complete"
    );

    Ok(())
}
