//! # marketplace-cart: The Cart Store
//!
//! Holds the authoritative in-memory cart, restores it once at startup and
//! persists every change through a background writer.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Store Lifecycle                             │
//! │                                                                         │
//! │  CartStore::open(kv, &config).await                                    │
//! │       │                                                                 │
//! │       ├── 1. restore: kv.get(key) → decode → Cart::from_items          │
//! │       │       (missing / malformed / unreadable → empty cart, logged)   │
//! │       │                                                                 │
//! │       ├── 2. spawn CartPersister (watch channel of snapshots)          │
//! │       │                                                                 │
//! │       └── 3. return ready handle                                       │
//! │                                                                         │
//! │  add_to_cart / increment / decrement / remove / clear                  │
//! │       │  (Mutex held: mutate → recompute summary → publish snapshot)   │
//! │       ▼                                                                 │
//! │  CartView { products, cartTotal, totalItemsInCart }                    │
//! │                                                                         │
//! │  flush().await      ← wait for the latest snapshot to be written       │
//! │  shutdown().await   ← drain the writer and join it                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketplace_cart::{CartConfig, CartStore};
//! use marketplace_core::{Money, ProductCandidate};
//! use marketplace_db::MemoryKeyValueStore;
//!
//! let store = CartStore::open(Arc::new(MemoryKeyValueStore::new()), &CartConfig::default()).await;
//! let view = store.add_to_cart(ProductCandidate::new("a", "Mug", "u", Money::from_cents(1000)));
//! assert_eq!(view.cart_total, "R$10,00");
//! store.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod persister;
pub mod store;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, CartSettings, PersistenceSettings, StorageSettings};
pub use error::{CartError, CartResult};
pub use persister::{PersistOutcome, PersistStatus};
pub use store::{CartStore, RestoreOutcome};
pub use view::CartView;
