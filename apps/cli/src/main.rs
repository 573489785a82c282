//! Marketplace CLI - drive the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the saved cart
//! marketplace show
//!
//! # Add a product (price in major units)
//! marketplace add --id 1 --title "Cadeira Rivatti" --image-url https://img/1.png --price 1400
//!
//! # Change quantities
//! marketplace increment 1
//! marketplace decrement 1
//!
//! # Throwaway session that never touches disk
//! marketplace --in-memory add --id 1 --title Mug --image-url u --price 12.5
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CLI Startup                                       │
//! │                                                                         │
//! │  1. Initialize logging (stderr, RUST_LOG or default filter)            │
//! │  2. Load CartConfig (file → MARKETPLACE_* env → validate)              │
//! │  3. Resolve database path (MARKETPLACE_DB_PATH, config, data dir)      │
//! │  4. Database::new (WAL, migrations)                                    │
//! │  5. CartStore::open (restore, spawn persister)                         │
//! │  6. Run command, print CartView as JSON on stdout                      │
//! │  7. CartStore::shutdown (final write), close pool                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use marketplace_cart::{CartConfig, CartStore};
use marketplace_db::{Database, DbConfig, KeyValueStore, MemoryKeyValueStore};

mod commands;

use commands::Command;

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(author, version, about = "GoMarketplace cart shell")]
struct Cli {
    /// Path to cart.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep the cart in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = CartConfig::load(cli.config).context("Failed to load cart config")?;

    let db = if cli.in_memory {
        None
    } else {
        let db_path = config
            .database_path()
            .context("No data directory available; set MARKETPLACE_DB_PATH")?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(&db_path))
            .await
            .with_context(|| format!("Failed to open {}", db_path.display()))?;
        Some(db)
    };

    let kv: Arc<dyn KeyValueStore> = match &db {
        Some(db) => Arc::new(db.key_values()),
        None => Arc::new(MemoryKeyValueStore::new()),
    };

    let store = CartStore::open(kv, &config).await;
    let view = commands::run(&store, cli.command);

    println!("{}", serde_json::to_string_pretty(&view)?);

    store.shutdown().await.context("Failed to save cart")?;

    if let Some(db) = db {
        db.close().await;
    }
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays valid JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=marketplace_cart=trace` - Trace the store only
/// - Default: `info,marketplace=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marketplace=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
