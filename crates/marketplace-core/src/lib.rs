//! # marketplace-core: Pure Cart Logic
//!
//! This crate holds the cart reconciliation rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Marketplace Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront UI (external)                        │   │
//! │  │     Product list ──► Cart screen ──► +/- buttons                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartView + operations                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           marketplace-cart (CartStore, persister)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ marketplace-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ currency  │  │   │
//! │  │   │ LineItem  │  │   Money   │  │   Cart    │  │  format   │  │   │
//! │  │   │ Candidate │  │           │  │  Summary  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line items, product candidates, zero-quantity policy
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart reconciliation and derived totals
//! - [`currency`] - Currency formatting collaborator
//! - [`codec`] - JSON encoding of the persisted line item list
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use marketplace_core::{Cart, CurrencyFormat, FormatCurrency, Money, ProductCandidate};
//!
//! let mut cart = Cart::new();
//! let shirt = ProductCandidate::new("shirt", "Camiseta", "https://img/shirt.png", Money::from_cents(1000));
//!
//! cart.add(shirt.clone());
//! cart.add(shirt);
//!
//! let summary = cart.summary();
//! assert_eq!(summary.total_items, 2);
//! assert_eq!(CurrencyFormat::default().format(summary.total_price), "R$20,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod codec;
pub mod currency;
pub mod error;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartSummary};
pub use codec::{decode_items, encode_items};
pub use currency::{CurrencyFormat, FormatCurrency};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the storefront has always used for the cart blob.
///
/// Existing installs already hold data under this key, so changing it would
/// silently empty every cart on upgrade.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";
