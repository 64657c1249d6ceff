//! Custos CLI - operator tool for the Custos audit trail.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::init::run(&args),
        Commands::Events(args) => commands::events::run(&args),
        Commands::Validate(args) => commands::validate::run(&args),
        Commands::Version => {
            println!("custos {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
