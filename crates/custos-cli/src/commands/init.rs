//! Init command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use custos_audit::{SqliteStore, AUDIT_TABLE};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Path to the SQLite database (created if missing)
    #[arg(long, env = "CUSTOS_DATABASE")]
    pub database: PathBuf,
}

/// Runs the init command.
pub fn run(args: &InitArgs) -> Result<()> {
    info!(database = ?args.database, "Initialising audit store");

    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("Failed to open {}", args.database.display()))?;
    store
        .init_schema()
        .context("Failed to create audit table")?;

    println!(
        "✓ {} ready in {} ({} events)",
        AUDIT_TABLE,
        args.database.display(),
        store.count()?
    );
    Ok(())
}
