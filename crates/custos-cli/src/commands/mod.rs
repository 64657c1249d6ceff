//! CLI commands and argument parsing.

pub mod events;
pub mod init;
pub mod validate;

use clap::{Parser, Subcommand};

/// Custos - audit trail for file access, object lifecycle and authentication
#[derive(Parser)]
#[command(name = "custos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the audit table in a database
    Init(init::InitArgs),

    /// List recorded audit events
    Events(events::EventsArgs),

    /// Validate an audit configuration file
    Validate(validate::ValidateArgs),

    /// Print version information
    Version,
}
