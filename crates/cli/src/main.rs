//! Nalan Jewel CLI - session store setup and catalog inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the storefront
//! nalan-cli migrate sessions
//!
//! # Count catalog items per filter option
//! nalan-cli catalog summary
//!
//! # Show one facet only
//! nalan-cli catalog summary --facet metal
//!
//! # Inspect one product
//! nalan-cli catalog show 42
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use nalan_core::JewelleryId;
use nalan_core::catalog::Facet;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "nalan-cli")]
#[command(author, version, about = "Nalan Jewel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up local database tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect the hosted catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the `tower_sessions` schema and table
    Sessions,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Count items per filter option
    Summary {
        /// Only this facet (query key, e.g. `metal` or `jewelleryType`)
        #[arg(short, long, value_parser = parse_facet)]
        facet: Option<Facet>,
    },
    /// Show one product with its price breakdown
    Show {
        /// Product id
        id: JewelleryId,
    },
}

fn parse_facet(key: &str) -> Result<Facet, String> {
    Facet::from_key(key).ok_or_else(|| {
        let keys: Vec<&str> = Facet::ALL.iter().map(|f| f.key()).collect();
        format!("unknown facet '{key}', expected one of: {}", keys.join(", "))
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nalan_cli=info,nalan_storefront=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Summary { facet } => commands::catalog::summary(facet).await?,
            CatalogAction::Show { id } => commands::catalog::show(id).await?,
        },
    }
    Ok(())
}
