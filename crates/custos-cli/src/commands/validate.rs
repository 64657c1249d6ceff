//! Validate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use custos_core::{AuditSettings, ResourceResolver};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the audit configuration (YAML, or JSON by extension)
    #[arg(long, env = "CUSTOS_CONFIG", default_value = "custos.yaml")]
    pub config: PathBuf,

    /// Show detailed output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs the validate command.
pub fn run(args: &ValidateArgs) -> Result<()> {
    info!(config = ?args.config, "Validating audit configuration");

    println!("Custos Configuration Validator");
    println!("==============================");
    println!("Config: {}", args.config.display());
    println!();

    let settings = AuditSettings::from_file(&args.config)
        .with_context(|| format!("Invalid configuration {}", args.config.display()))?;
    let resolver = ResourceResolver::new(settings.audit_models.clone())?;

    if args.verbose {
        for entry in resolver.registry().entries() {
            println!("  {} -> {}", entry.type_path, entry.resource_type);
        }
        println!();
    }

    println!("Audited types: {}", resolver.registry().len());
    println!(
        "File auditing: {}",
        if settings.file_auditing { "on" } else { "off" }
    );
    if let Some(database) = &settings.database {
        println!("Database: {}", database.display());
    }
    if let Some(location) = &settings.logfile_location {
        println!("Trail: {}", location.display());
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}
