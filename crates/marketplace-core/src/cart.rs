//! # Cart Reconciliation
//!
//! The pure list transformations behind every cart operation.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add(candidate)                                                        │
//! │    ├── id not in cart ──► push LineItem { quantity: 1 }  (Inserted)    │
//! │    └── id in cart ──────► quantity += 1, other fields kept (Incremented)│
//! │                                                                         │
//! │  increment(id) ─────────► quantity += 1       (false if id unknown)    │
//! │                                                                         │
//! │  decrement(id, policy)                                                 │
//! │    ├── quantity = max(quantity - 1, 0)        (false if id unknown)    │
//! │    └── reached 0 + Prune ──► line removed                              │
//! │                                                                         │
//! │  remove(id) / clear()                                                  │
//! │                                                                         │
//! │  summary() ─────────────► { total_price, total_items }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identity is exact string equality on `id`. Order is insertion order.

use crate::money::Money;
use crate::types::{LineItem, ProductCandidate, ZeroQuantityPolicy};

// =============================================================================
// Add Outcome
// =============================================================================

/// What [`Cart::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended with quantity 1.
    Inserted,
    /// An existing line's quantity went up by one.
    Incremented,
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered list of line items, unique by `id`.
///
/// Stored lists enter only through [`Cart::from_items`]; there is no
/// `Deserialize` impl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from a stored list, repairing anything that would break
    /// the one-line-per-id invariant.
    ///
    /// ## Normalisation
    /// - Duplicate ids are merged into the first occurrence; quantities add up
    ///   and the first occurrence's title/price/image win
    /// - Zero-quantity lines are dropped
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut cart = Cart::new();

        for item in items {
            if !item.is_present() {
                continue;
            }
            match cart.position(&item.id) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }

        cart
    }

    /// Adds a product, or bumps its quantity if it is already in the cart.
    ///
    /// An existing line keeps its title, image and price even when the
    /// candidate carries different values.
    pub fn add(&mut self, candidate: ProductCandidate) -> AddOutcome {
        match self.find_mut(&candidate.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                AddOutcome::Incremented
            }
            None => {
                self.items.push(LineItem::from_candidate(candidate));
                AddOutcome::Inserted
            }
        }
    }

    /// Increases the quantity of `id` by one.
    ///
    /// Returns `false` (and leaves the cart untouched) if `id` is not present.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decreases the quantity of `id` by one, never below zero.
    ///
    /// Under [`ZeroQuantityPolicy::Prune`] a line that ends at zero is
    /// removed. A retained zero-quantity line decremented again is a no-op.
    pub fn decrement(&mut self, id: &str, policy: ZeroQuantityPolicy) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let item = &mut self.items[index];
        if item.quantity == 0 {
            return false;
        }
        item.quantity -= 1;

        if item.quantity == 0 && policy == ZeroQuantityPolicy::Prune {
            self.items.remove(index);
        }
        true
    }

    /// Removes the line for `id` regardless of its quantity.
    pub fn remove(&mut self, id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != initial_len
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Current lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// The list that gets written to storage: zero-quantity lines pruned.
    pub fn persistable_items(&self) -> Vec<LineItem> {
        self.items.iter().filter(|i| i.is_present()).cloned().collect()
    }

    /// Number of lines (including retained zero-quantity ones).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Derived totals for the current list.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.items)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Values derived from the line list, recomputed whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Σ price × quantity.
    pub total_price: Money,
    /// Σ quantity.
    pub total_items: u64,
}

impl CartSummary {
    /// Computes the totals for a list of lines.
    pub fn from_items(items: &[LineItem]) -> Self {
        CartSummary {
            total_price: items.iter().map(LineItem::line_total).sum(),
            total_items: items.iter().map(|i| u64::from(i.quantity)).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, price_cents: i64) -> ProductCandidate {
        ProductCandidate::new(
            id,
            format!("Product {id}"),
            format!("https://img/{id}.png"),
            Money::from_cents(price_cents),
        )
    }

    fn line(id: &str, price_cents: i64, quantity: u32) -> LineItem {
        LineItem {
            quantity,
            ..LineItem::from_candidate(candidate(id, price_cents))
        }
    }

    #[test]
    fn test_distinct_adds_each_get_quantity_one() {
        let mut cart = Cart::new();
        for id in ["a", "b", "c", "d"] {
            assert_eq!(cart.add(candidate(id, 100)), AddOutcome::Inserted);
        }

        assert_eq!(cart.len(), 4);
        assert!(cart.items().iter().all(|i| i.quantity == 1));
        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_add_same_id_keeps_first_fields() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 1000));

        let changed = ProductCandidate::new("a", "Renamed", "other.png", Money::from_cents(1));
        assert_eq!(cart.add(changed), AddOutcome::Incremented);

        assert_eq!(cart.len(), 1);
        let item = cart.get("a").unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.title, "Product a");
        assert_eq!(item.image_url, "https://img/a.png");
        assert_eq!(item.price.cents(), 1000);
    }

    #[test]
    fn test_id_match_is_exact() {
        let mut cart = Cart::new();
        cart.add(candidate("abc", 100));
        cart.add(candidate("ABC", 100));
        cart.add(candidate("abc ", 100));

        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_increment_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));
        let before = cart.clone();

        assert!(!cart.increment("zzz"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_existing() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));

        assert!(cart.increment("a"));
        assert!(cart.increment("a"));
        assert_eq!(cart.get("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_decrement_to_zero_prunes() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));
        cart.add(candidate("b", 100));

        assert!(cart.decrement("a", ZeroQuantityPolicy::Prune));
        assert!(cart.get("a").is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_decrement_to_zero_retains() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));

        assert!(cart.decrement("a", ZeroQuantityPolicy::Retain));
        assert_eq!(cart.get("a").unwrap().quantity, 0);

        // Already at zero: never negative, nothing changes
        assert!(!cart.decrement("a", ZeroQuantityPolicy::Retain));
        assert_eq!(cart.get("a").unwrap().quantity, 0);

        assert!(cart.persistable_items().is_empty());
        assert_eq!(cart.summary().total_items, 0);
    }

    #[test]
    fn test_retained_zero_line_can_come_back() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));
        cart.decrement("a", ZeroQuantityPolicy::Retain);

        assert_eq!(cart.add(candidate("a", 999)), AddOutcome::Incremented);
        let item = cart.get("a").unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price.cents(), 100);
    }

    #[test]
    fn test_decrement_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(candidate("a", 100));
        let before = cart.clone();

        assert!(!cart.decrement("zzz", ZeroQuantityPolicy::Prune));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut cart = Cart::from_items(vec![line("a", 100, 3)]);

        assert!(cart.decrement("a", ZeroQuantityPolicy::Prune));
        assert_eq!(cart.get("a").unwrap().quantity, 2);
    }

    #[test]
    fn test_summary_totals() {
        let cart = Cart::from_items(vec![line("a", 1000, 2), line("b", 500, 3)]);
        let summary = cart.summary();

        assert_eq!(summary.total_price.cents(), 3500);
        assert_eq!(summary.total_items, 5);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(Cart::new().summary(), CartSummary::default());
    }

    #[test]
    fn test_from_items_merges_duplicates_and_drops_zero() {
        let cart = Cart::from_items(vec![
            line("a", 1000, 1),
            line("b", 200, 0),
            line("a", 50, 2),
            line("c", 300, 1),
        ]);

        assert_eq!(cart.len(), 2);
        let a = cart.get("a").unwrap();
        assert_eq!(a.quantity, 3);
        assert_eq!(a.price.cents(), 1000);
        assert!(cart.get("b").is_none());
        assert_eq!(cart.items()[1].id, "c");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::from_items(vec![line("a", 100, 4), line("b", 100, 1)]);

        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_saturates() {
        let mut cart = Cart::from_items(vec![line("a", 1, u32::MAX)]);

        assert!(cart.increment("a"));
        assert_eq!(cart.get("a").unwrap().quantity, u32::MAX);
    }
}
