//! Lavka CLI - Persisted-state inspection and migration tools.
//!
//! # Usage
//!
//! ```bash
//! # Show every partition of both stores
//! lavka-cli dump
//!
//! # Show only the cart
//! lavka-cli dump cart
//!
//! # Delete persisted records (all data, not just the active partition)
//! lavka-cli clear favorites
//!
//! # Rewrite records at the current schema version, sweep legacy files
//! lavka-cli migrate
//! ```
//!
//! # Commands
//!
//! - `dump` - Render the persisted partitions of the cart and favorites stores
//! - `clear` - Delete persisted store records
//! - `migrate` - Upgrade on-disk records to the current schema

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "lavka-cli")]
#[command(author, version, about = "Lavka CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the persisted partitions of a store
    Dump {
        /// Which store to dump
        #[arg(value_enum, default_value = "all")]
        target: Target,
    },
    /// Delete persisted store records
    Clear {
        /// Which store's record to delete
        #[arg(value_enum, default_value = "all")]
        target: Target,
    },
    /// Upgrade on-disk records to the current schema version
    Migrate,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Cart,
    Favorites,
    All,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Dump { target } => {
            let stores = commands::open_stores()?;
            if matches!(target, Target::Cart | Target::All) {
                commands::dump::cart(&stores);
            }
            if matches!(target, Target::Favorites | Target::All) {
                commands::dump::favorites(&stores);
            }
        }
        Commands::Clear { target } => {
            let cart = matches!(target, Target::Cart | Target::All);
            let favorites = matches!(target, Target::Favorites | Target::All);
            commands::clear::records(cart, favorites)?;
        }
        Commands::Migrate => commands::migrate::records()?,
    }
    Ok(())
}
