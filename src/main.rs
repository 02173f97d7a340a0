//! Binary entry point: bring up configuration and logging, provision the
//! database, check the connection, then print the book and copy listings.
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bibliotrack::config::{LogFormat, LoggingConfig};
use bibliotrack::{report, AppConfig, Database};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!("Starting BiblioTrack v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::new(config.database);
    db.ensure_schema()
        .context("failed to prepare the library database")?;
    db.ping().context("failed to connect to the library database")?;

    let books = db.books().list_all().context("failed to load books")?;
    let copies = db.copies().list_summaries().context("failed to load copies")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_book_list(&mut out, &books)?;
    writeln!(out)?;
    report::write_copy_list(&mut out, &copies)?;
    out.flush()?;

    Ok(())
}

/// Logs go to stderr so the listings on stdout stay clean. `RUST_LOG` wins
/// over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bibliotrack={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}
