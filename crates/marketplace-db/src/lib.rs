//! # marketplace-db: Key-Value Persistence
//!
//! This crate provides the storage the cart mirrors itself into. The cart
//! only needs a key-value blob store, so that is the whole contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Marketplace Cart Data Flow                         │
//! │                                                                         │
//! │  CartStore persister task                                              │
//! │       │  set("@GoMarketplace:products", "[...]")                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 marketplace-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │ KeyValueStore  │   │  Implementations │   │ Migrations  │  │   │
//! │  │   │   (kv.rs)      │◄──│ SqliteKeyValue.. │   │ (embedded)  │  │   │
//! │  │   │ get/set/remove │   │ MemoryKeyValue.. │   │ 001_kv.sql  │  │   │
//! │  │   └────────────────┘   └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/gomarketplace/marketplace.db                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The `KeyValueStore` trait
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite-backed key-value repository
//! - [`memory`] - Process-local store for tests and ephemeral runs
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marketplace_db::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("path/to/marketplace.db")).await?;
//! let kv = db.key_values();
//!
//! kv.set("@GoMarketplace:products", "[]").await?;
//! assert_eq!(kv.get("@GoMarketplace:products").await?.as_deref(), Some("[]"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::KeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use pool::{Database, DbConfig};
pub use repository::key_value::SqliteKeyValueStore;
