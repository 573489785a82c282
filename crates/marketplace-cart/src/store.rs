//! # Cart Store
//!
//! The single owner of the cart's line item list.
//!
//! ## Thread Safety
//! The cart sits behind a `std::sync::Mutex`. Every operation is
//! synchronous and short (no I/O happens under the lock), so mutations are
//! serialized and run to completion. Writing to storage is handed to the
//! [`crate::persister`] task through a watch channel.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action            CartStore method        Cart change               │
//! │  ─────────            ────────────────        ───────────               │
//! │                                                                         │
//! │  Tap "add" ─────────► add_to_cart(candidate) ► push or quantity += 1   │
//! │  Tap "+" ───────────► increment(id) ─────────► quantity += 1           │
//! │  Tap "-" ───────────► decrement(id) ─────────► quantity -= 1 (min 0)   │
//! │  Swipe away ────────► remove(id) ────────────► line removed            │
//! │  Checkout done ─────► clear() ───────────────► list emptied            │
//! │  Render ────────────► view() ────────────────► (read only)             │
//! │                                                                         │
//! │  After a change: summary recomputed, generation += 1, snapshot sent.   │
//! │  Unknown id / nothing to do: no recompute, no write.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use marketplace_core::{
    decode_items, Cart, CartSummary, FormatCurrency, LineItem, Money, ProductCandidate,
    ZeroQuantityPolicy,
};
use marketplace_db::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::persister::{CartPersister, PersistHandle, PersistStatus};
use crate::view::CartView;

// =============================================================================
// Restore Outcome
// =============================================================================

/// What happened when the store read its saved state at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was stored under the key.
    Empty,

    /// A saved list was loaded (after normalisation).
    Restored { items: usize },

    /// The stored value was not a valid line item list; the cart started empty.
    Malformed { error: String },

    /// Storage could not be read; the cart started empty.
    Unavailable { error: String },
}

impl RestoreOutcome {
    /// True if saved state was loaded.
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored { .. })
    }
}

// =============================================================================
// Cart Store
// =============================================================================

struct CartState {
    cart: Cart,
    summary: CartSummary,
    generation: u64,
}

/// Handle to a ready cart.
///
/// There is no way to obtain one before saved state has been restored.
/// Share it with `Arc<CartStore>`.
pub struct CartStore {
    state: Mutex<CartState>,
    formatter: Arc<dyn FormatCurrency>,
    policy: ZeroQuantityPolicy,
    restore: RestoreOutcome,
    persister: PersistHandle,
}

impl CartStore {
    /// Restores the saved cart and starts the background writer.
    ///
    /// Restore is fail-soft: a missing, malformed or unreadable value leaves
    /// the cart empty and is logged. Must be called inside a tokio runtime.
    pub async fn open(kv: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        Self::open_with_formatter(kv, config, Arc::new(config.currency.clone())).await
    }

    /// Like [`CartStore::open`] with a caller-supplied currency formatter.
    pub async fn open_with_formatter(
        kv: Arc<dyn KeyValueStore>,
        config: &CartConfig,
        formatter: Arc<dyn FormatCurrency>,
    ) -> Self {
        let key = config.storage_key();
        let (cart, restore) = restore(kv.as_ref(), key).await;
        let summary = cart.summary();

        info!(
            key = %key,
            items = cart.len(),
            outcome = ?restore,
            policy = %config.zero_quantity(),
            "Cart store ready"
        );

        let persister = CartPersister::spawn(kv, key, config.persistence.coalesce_window());

        CartStore {
            state: Mutex::new(CartState {
                cart,
                summary,
                generation: 0,
            }),
            formatter,
            policy: config.zero_quantity(),
            restore,
            persister,
        }
    }

    /// How startup restore went.
    pub fn restore_outcome(&self) -> &RestoreOutcome {
        &self.restore
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity if it is already in the cart.
    ///
    /// An existing line keeps its original title, image and price.
    pub fn add_to_cart(&self, candidate: ProductCandidate) -> CartView {
        let id = candidate.id.clone();
        self.mutate("add_to_cart", &id, |cart, _| {
            let outcome = cart.add(candidate);
            debug!(id = %id, ?outcome, "Added to cart");
            true
        })
    }

    /// Quantity += 1 for `id`. Unknown ids are a no-op.
    pub fn increment(&self, id: &str) -> CartView {
        self.mutate("increment", id, |cart, _| cart.increment(id))
    }

    /// Quantity -= 1 for `id`, never below zero. Unknown ids are a no-op.
    pub fn decrement(&self, id: &str) -> CartView {
        self.mutate("decrement", id, |cart, policy| cart.decrement(id, policy))
    }

    /// Drops the line for `id` whatever its quantity.
    pub fn remove(&self, id: &str) -> CartView {
        self.mutate("remove", id, |cart, _| cart.remove(id))
    }

    /// Empties the cart.
    pub fn clear(&self) -> CartView {
        self.mutate("clear", "*", |cart, _| {
            if cart.is_empty() {
                return false;
            }
            cart.clear();
            true
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current view: lines plus formatted totals.
    pub fn view(&self) -> CartView {
        let state = self.lock();
        self.view_of(&state)
    }

    /// Current lines in insertion order.
    pub fn products(&self) -> Vec<LineItem> {
        self.lock().cart.items().to_vec()
    }

    /// Formatted Σ(price × quantity).
    pub fn cart_total(&self) -> String {
        self.formatter.format(self.total_price())
    }

    /// Unformatted Σ(price × quantity).
    pub fn total_price(&self) -> Money {
        self.lock().summary.total_price
    }

    /// Σ(quantity).
    pub fn total_items_in_cart(&self) -> u64 {
        self.lock().summary.total_items
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Status of the most recent write attempt.
    pub fn persist_status(&self) -> PersistStatus {
        self.persister.status()
    }

    /// Waits until the state after the latest mutation has been written.
    ///
    /// Returns [`crate::CartError::PersistFailed`] if that write failed.
    pub async fn flush(&self) -> CartResult<PersistStatus> {
        let generation = self.lock().generation;
        self.persister.wait_for(generation).await
    }

    /// Writes any pending state, stops the writer and waits for it.
    pub async fn shutdown(self) -> CartResult<PersistStatus> {
        let generation = self.lock().generation;
        info!(generation, "Shutting down cart store");

        let status = self.persister.close().await?;
        if status.generation < generation {
            warn!(
                written = status.generation,
                latest = generation,
                "Cart persister stopped before the latest change was written"
            );
            return Err(CartError::PersisterStopped);
        }
        status.into_result()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(
        &self,
        op: &'static str,
        id: &str,
        apply: impl FnOnce(&mut Cart, ZeroQuantityPolicy) -> bool,
    ) -> CartView {
        let mut state = self.lock();

        if !apply(&mut state.cart, self.policy) {
            debug!(op, id = %id, "No change");
            return self.view_of(&state);
        }

        state.summary = state.cart.summary();
        state.generation += 1;
        self.persister
            .schedule(state.generation, state.cart.persistable_items());

        debug!(
            op,
            id = %id,
            generation = state.generation,
            lines = state.cart.len(),
            total_items = state.summary.total_items,
            "Cart changed"
        );

        self.view_of(&state)
    }

    fn view_of(&self, state: &CartState) -> CartView {
        CartView::new(state.cart.items(), state.summary, self.formatter.as_ref())
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CartStore")
            .field("lines", &state.cart.len())
            .field("generation", &state.generation)
            .field("policy", &self.policy)
            .field("restore", &self.restore)
            .finish()
    }
}

/// Reads and normalises the saved list. Never fails.
async fn restore(kv: &dyn KeyValueStore, key: &str) -> (Cart, RestoreOutcome) {
    let raw = match kv.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key = %key, "No saved cart");
            return (Cart::new(), RestoreOutcome::Empty);
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Could not read saved cart, starting empty");
            return (
                Cart::new(),
                RestoreOutcome::Unavailable {
                    error: e.to_string(),
                },
            );
        }
    };

    match decode_items(&raw) {
        Ok(items) => {
            let stored = items.len();
            let cart = Cart::from_items(items);
            if cart.len() != stored {
                info!(stored, kept = cart.len(), "Normalised saved cart");
            }
            let outcome = RestoreOutcome::Restored { items: cart.len() };
            (cart, outcome)
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Saved cart is malformed, starting empty");
            (
                Cart::new(),
                RestoreOutcome::Malformed {
                    error: e.to_string(),
                },
            )
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persister::PersistOutcome;
    use marketplace_core::{encode_items, CurrencyFormat, DEFAULT_STORAGE_KEY};
    use marketplace_db::{Database, DbConfig, MemoryKeyValueStore};

    fn candidate(id: &str, cents: i64) -> ProductCandidate {
        ProductCandidate::new(
            id,
            format!("Product {id}"),
            format!("https://img/{id}.png"),
            Money::from_cents(cents),
        )
    }

    async fn open_empty() -> (CartStore, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CartStore::open(kv.clone(), &CartConfig::default()).await;
        (store, kv)
    }

    async fn stored_items(kv: &MemoryKeyValueStore) -> Vec<LineItem> {
        decode_items(&kv.snapshot(DEFAULT_STORAGE_KEY).await.unwrap()).unwrap()
    }

    // -------------------------------------------------------------------------
    // Restore
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_without_saved_state() {
        let (store, _) = open_empty().await;

        assert_eq!(store.restore_outcome(), &RestoreOutcome::Empty);
        assert!(store.products().is_empty());
        assert_eq!(store.cart_total(), "R$0,00");
        assert_eq!(store.total_items_in_cart(), 0);
    }

    #[tokio::test]
    async fn test_restores_storefront_blob() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}]"#,
        ));
        let store = CartStore::open(kv.clone(), &CartConfig::default()).await;

        assert_eq!(store.restore_outcome(), &RestoreOutcome::Restored { items: 1 });
        let products = store.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "a");
        assert_eq!(products[0].title, "T");
        assert_eq!(products[0].image_url, "u");
        assert_eq!(products[0].price, Money::from_cents(1000));
        assert_eq!(products[0].quantity, 2);
        assert_eq!(store.cart_total(), "R$20,00");

        // Restore alone does not write back
        store.flush().await.unwrap();
        assert_eq!(kv.write_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_blob_starts_empty() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        let store = CartStore::open(kv, &CartConfig::default()).await;

        assert!(matches!(store.restore_outcome(), RestoreOutcome::Malformed { .. }));
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_empty() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(DEFAULT_STORAGE_KEY, "[]"));
        kv.set_fail_reads(true);
        let store = CartStore::open(kv, &CartConfig::default()).await;

        assert!(matches!(store.restore_outcome(), RestoreOutcome::Unavailable { .. }));
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_restore_normalises_duplicates_and_zeros() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(
            DEFAULT_STORAGE_KEY,
            r#"[
                {"id":"a","title":"First","image_url":"u","price":10,"quantity":1},
                {"id":"b","title":"Gone","image_url":"u","price":5,"quantity":0},
                {"id":"a","title":"Second","image_url":"u","price":99,"quantity":2}
            ]"#,
        ));
        let store = CartStore::open(kv, &CartConfig::default()).await;

        let products = store.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "First");
        assert_eq!(products[0].quantity, 3);
        assert_eq!(store.restore_outcome(), &RestoreOutcome::Restored { items: 1 });
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let mut config = CartConfig::default();
        config.storage.key = "@Test:cart".into();
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CartStore::open(kv.clone(), &config).await;

        store.add_to_cart(candidate("a", 100));
        store.flush().await.unwrap();

        assert!(kv.snapshot("@Test:cart").await.is_some());
        assert!(kv.snapshot(DEFAULT_STORAGE_KEY).await.is_none());
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_distinct_adds_each_get_quantity_one() {
        let (store, _) = open_empty().await;

        for id in ["a", "b", "c"] {
            store.add_to_cart(candidate(id, 100));
        }

        let products = store.products();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.quantity == 1));
        assert_eq!(
            products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
    }

    #[tokio::test]
    async fn test_repeat_add_keeps_first_fields() {
        let (store, _) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        let view = store.add_to_cart(ProductCandidate::new(
            "a",
            "Renamed",
            "other.png",
            Money::from_cents(1),
        ));

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].quantity, 2);
        assert_eq!(view.products[0].title, "Product a");
        assert_eq!(view.products[0].price, Money::from_cents(1000));
        assert_eq!(view.cart_total, "R$20,00");
    }

    #[tokio::test]
    async fn test_totals() {
        let (store, _) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        store.increment("a");
        store.add_to_cart(candidate("b", 500));
        store.increment("b");
        let view = store.increment("b");

        assert_eq!(view.cart_total, "R$35,00");
        assert_eq!(view.total_items_in_cart, 5);
        assert_eq!(store.total_price(), Money::from_cents(3500));
    }

    #[tokio::test]
    async fn test_unknown_id_is_noop_without_write() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        store.flush().await.unwrap();
        let before = store.view();

        assert_eq!(store.increment("zzz"), before);
        assert_eq!(store.decrement("zzz"), before);
        assert_eq!(store.remove("zzz"), before);
        store.flush().await.unwrap();

        assert_eq!(kv.write_count(), 1);
        assert_eq!(store.persist_status().generation, 1);
    }

    #[tokio::test]
    async fn test_decrement_to_zero_prunes_by_default() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        store.add_to_cart(candidate("b", 500));
        let view = store.decrement("a");

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].id, "b");
        assert_eq!(view.cart_total, "R$5,00");

        store.flush().await.unwrap();
        let stored = stored_items(&kv).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "b");
    }

    #[tokio::test]
    async fn test_decrement_to_zero_retained_in_memory_only() {
        let mut config = CartConfig::default();
        config.cart.zero_quantity = ZeroQuantityPolicy::Retain;
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CartStore::open(kv.clone(), &config).await;

        store.add_to_cart(candidate("a", 1000));
        let view = store.decrement("a");

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].quantity, 0);
        assert_eq!(view.total_items_in_cart, 0);
        assert_eq!(view.cart_total, "R$0,00");

        // Never negative; a second decrement changes nothing
        assert_eq!(store.decrement("a"), view);

        store.flush().await.unwrap();
        assert!(stored_items(&kv).await.is_empty());

        // The retained line can come back
        let view = store.increment("a");
        assert_eq!(view.products[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        store.add_to_cart(candidate("b", 500));

        let view = store.remove("a");
        assert_eq!(view.products.len(), 1);

        let view = store.clear();
        assert!(view.products.is_empty());
        assert!(view.is_empty());

        store.flush().await.unwrap();
        assert!(stored_items(&kv).await.is_empty());

        // Clearing an empty cart is a no-op
        let writes = kv.write_count();
        store.clear();
        store.flush().await.unwrap();
        assert_eq!(kv.write_count(), writes);
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_flush_writes_latest_state() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        store.add_to_cart(candidate("a", 1000));
        store.add_to_cart(candidate("b", 250));

        let status = store.flush().await.unwrap();
        assert_eq!(status.generation, 3);
        assert!(matches!(status.outcome, PersistOutcome::Saved { .. }));

        assert_eq!(stored_items(&kv).await, store.products());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_fail_mutation() {
        let (store, kv) = open_empty().await;
        kv.set_fail_writes(true);

        let view = store.add_to_cart(candidate("a", 1000));
        assert_eq!(view.total_items_in_cart, 1);

        let err = store.flush().await.unwrap_err();
        assert!(matches!(err, CartError::PersistFailed { generation: 1, .. }));
        assert!(store.persist_status().is_failed());

        // Next change goes through once storage recovers
        kv.set_fail_writes(false);
        store.increment("a");
        store.flush().await.unwrap();
        assert_eq!(stored_items(&kv).await[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_coalesce_window_still_writes_latest() {
        let mut config = CartConfig::default();
        config.persistence.coalesce_window_ms = 20;
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CartStore::open(kv.clone(), &config).await;

        for _ in 0..10 {
            store.add_to_cart(candidate("a", 100));
        }
        store.flush().await.unwrap();

        assert_eq!(kv.write_count(), 1);
        assert_eq!(stored_items(&kv).await[0].quantity, 10);
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_write() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1000));
        let status = store.shutdown().await.unwrap();

        assert_eq!(status.generation, 1);
        assert_eq!(stored_items(&kv).await.len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_through_reopen() {
        let (store, kv) = open_empty().await;

        store.add_to_cart(candidate("a", 1099));
        store.add_to_cart(candidate("b", 250));
        store.increment("b");
        let before = store.products();
        store.shutdown().await.unwrap();

        let reopened = CartStore::open(kv, &CartConfig::default()).await;
        assert_eq!(reopened.products(), before);
        assert_eq!(reopened.cart_total(), "R$15,99");
    }

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv: Arc<dyn KeyValueStore> = Arc::new(db.key_values());

        let store = CartStore::open(kv.clone(), &CartConfig::default()).await;
        store.add_to_cart(candidate("a", 1000));
        store.add_to_cart(candidate("a", 1000));
        store.shutdown().await.unwrap();

        let raw = kv.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            encode_items(&[LineItem {
                quantity: 2,
                ..LineItem::from_candidate(candidate("a", 1000))
            }])
            .unwrap()
        );

        let reopened = CartStore::open(kv, &CartConfig::default()).await;
        assert_eq!(reopened.total_items_in_cart(), 2);
    }

    #[tokio::test]
    async fn test_custom_formatter() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = CartStore::open_with_formatter(
            kv,
            &CartConfig::default(),
            Arc::new(CurrencyFormat::usd()),
        )
        .await;

        let view = store.add_to_cart(candidate("a", 123456));
        assert_eq!(view.cart_total, "$1,234.56");
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let (store, kv) = open_empty().await;
        let store = Arc::new(store);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.add_to_cart(candidate("a", 100));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.total_items_in_cart(), 8);
        store.flush().await.unwrap();
        assert_eq!(stored_items(&kv).await[0].quantity, 8);
    }
}
