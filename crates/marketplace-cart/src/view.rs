//! # Cart View
//!
//! The read-only snapshot handed to consumers after every operation.

use marketplace_core::{CartSummary, FormatCurrency, LineItem};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What the UI renders: the line list plus the two derived values.
///
/// ## JSON Shape
/// ```json
/// {
///   "products": [{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}],
///   "cartTotal": "R$20,00",
///   "totalItemsInCart": 2
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Line items in insertion order.
    pub products: Vec<LineItem>,

    /// Σ(price × quantity), formatted for display.
    pub cart_total: String,

    /// Σ(quantity).
    #[ts(type = "number")]
    pub total_items_in_cart: u64,
}

impl CartView {
    /// Builds a view from items and their cached summary.
    pub fn new(items: &[LineItem], summary: CartSummary, formatter: &dyn FormatCurrency) -> Self {
        CartView {
            products: items.to_vec(),
            cart_total: formatter.format(summary.total_price),
            total_items_in_cart: summary.total_items,
        }
    }

    /// True when nothing counts towards the totals.
    pub fn is_empty(&self) -> bool {
        self.total_items_in_cart == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::{CurrencyFormat, Money, ProductCandidate};

    fn line(id: &str, cents: i64, quantity: u32) -> LineItem {
        let mut item =
            LineItem::from_candidate(ProductCandidate::new(id, "T", "u", Money::from_cents(cents)));
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_view_totals() {
        let items = vec![line("a", 1000, 2), line("b", 500, 3)];
        let view = CartView::new(&items, CartSummary::from_items(&items), &CurrencyFormat::default());

        assert_eq!(view.cart_total, "R$35,00");
        assert_eq!(view.total_items_in_cart, 5);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_view_json_is_camel_case() {
        let items = vec![line("a", 1000, 2)];
        let view = CartView::new(&items, CartSummary::from_items(&items), &CurrencyFormat::default());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["cartTotal"], "R$20,00");
        assert_eq!(json["totalItemsInCart"], 2);
        assert_eq!(json["products"][0]["image_url"], "u");
        assert_eq!(json["products"][0]["price"], 10);
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::new(&[], CartSummary::default(), &CurrencyFormat::default());

        assert_eq!(view.cart_total, "R$0,00");
        assert!(view.is_empty());
    }
}
