//! # Domain Types
//!
//! Core domain types shared by the cart store and its consumers.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────┐              │
//! │  │  ProductCandidate    │ add ──►│      LineItem        │              │
//! │  │  ──────────────────  │        │  ──────────────────  │              │
//! │  │  id                  │        │  id                  │              │
//! │  │  title               │        │  title               │              │
//! │  │  image_url           │        │  image_url           │              │
//! │  │  price               │        │  price               │              │
//! │  └──────────────────────┘        │  quantity            │              │
//! │                                  └──────────────────────┘              │
//! │                                                                         │
//! │  ┌──────────────────────┐                                              │
//! │  │ ZeroQuantityPolicy   │  What happens to a line decremented to 0     │
//! │  │  Prune | Retain      │                                              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! `LineItem` serializes with the storefront's field names, which is also
//! the persisted blob format:
//! ```json
//! {"id":"a","title":"T","image_url":"u","price":10,"quantity":2}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Candidate
// =============================================================================

/// A product offered to the cart: everything a line item has except quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductCandidate {
    /// Catalog identifier, opaque to the cart.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Image URI shown next to the line.
    pub image_url: String,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,
}

impl ProductCandidate {
    /// Creates a candidate from its parts.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Money,
    ) -> Self {
        ProductCandidate {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its quantity.
///
/// ## Invariants
/// - At most one line per `id` inside a [`crate::Cart`]
/// - `quantity == 0` means the product is logically absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,

    /// Unit price frozen at the moment the product first entered the cart.
    #[ts(type = "number")]
    pub price: Money,

    pub quantity: u32,
}

impl LineItem {
    /// Creates a fresh line with quantity 1 from a candidate.
    pub fn from_candidate(candidate: ProductCandidate) -> Self {
        LineItem {
            id: candidate.id,
            title: candidate.title,
            image_url: candidate.image_url,
            price: candidate.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// True when the line still counts towards the cart.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.quantity > 0
    }
}

// =============================================================================
// Zero Quantity Policy
// =============================================================================

/// What the in-memory cart does with a line decremented to zero.
///
/// The persisted list never contains zero-quantity lines regardless of
/// the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ZeroQuantityPolicy {
    /// Remove the line from the list as soon as it reaches zero.
    #[default]
    Prune,

    /// Keep the line at quantity 0 until the next restore.
    Retain,
}

impl fmt::Display for ZeroQuantityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroQuantityPolicy::Prune => write!(f, "prune"),
            ZeroQuantityPolicy::Retain => write!(f, "retain"),
        }
    }
}

impl FromStr for ZeroQuantityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prune" => Ok(ZeroQuantityPolicy::Prune),
            "retain" | "keep" => Ok(ZeroQuantityPolicy::Retain),
            other => Err(format!("unknown zero-quantity policy: {other}")),
        }
    }
}
