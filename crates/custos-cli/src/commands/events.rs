//! Events command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use custos_audit::{SqliteStore, StoredEvent, GMT_FORMAT};

/// Arguments for the events command.
#[derive(Args)]
pub struct EventsArgs {
    /// Path to the SQLite database
    #[arg(long, env = "CUSTOS_DATABASE")]
    pub database: PathBuf,

    /// Maximum number of events to show, newest first
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the events command.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runs the events command.
pub fn run(args: &EventsArgs) -> Result<()> {
    info!(database = ?args.database, limit = args.limit, "Listing audit events");

    if !args.database.exists() {
        anyhow::bail!("Database does not exist: {}", args.database.display());
    }

    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("Failed to open {}", args.database.display()))?;
    let events = store.latest(args.limit).context("Failed to read audit events")?;
    debug!(count = events.len(), "Loaded audit events");

    match args.format {
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No audit events recorded");
            }
            for event in &events {
                println!("{}", format_line(event));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }

    Ok(())
}

fn format_line(event: &StoredEvent) -> String {
    let flags = match (event.superuser, event.staff) {
        (Some(true), _) => " [superuser]",
        (_, Some(true)) => " [staff]",
        _ => "",
    };

    format!(
        "{} {:<13} {:<12} {:<36} {}{}",
        event.datetime.format(GMT_FORMAT),
        event.event.as_str(),
        event.resource_type,
        event.resource_uuid.as_deref().unwrap_or("-"),
        event.username.as_deref().unwrap_or("-"),
        flags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use custos_audit::{AuditRecord, AuditStore, EventKind};
    use custos_core::{ActorIdentity, ResourceId};

    #[test]
    fn test_format_line() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let actor = ActorIdentity::new("admin").superuser();
        store
            .append(&AuditRecord::new(
                EventKind::Delete,
                "Layer",
                Some(ResourceId::Integer(3)),
                Some(&actor),
            ))
            .unwrap();

        let event = store.latest(1).unwrap().remove(0);
        let line = format_line(&event);
        assert!(line.contains("delete"));
        assert!(line.contains("Layer"));
        assert!(line.contains(" 3 "));
        assert!(line.ends_with("admin [superuser]"));
    }

    #[test]
    fn test_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = EventsArgs {
            database: dir.path().join("missing.sqlite3"),
            limit: 5,
            format: OutputFormat::Json,
        };
        assert!(run(&args).is_err());
    }
}
