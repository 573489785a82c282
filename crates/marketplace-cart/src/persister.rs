//! # Cart Persister
//!
//! Background task that mirrors the cart into the key-value store.
//!
//! ## Write-Behind Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Persister Flow                                │
//! │                                                                         │
//! │  CartStore mutation (Mutex held)                                       │
//! │       │  snapshot_tx.send_replace(Snapshot { generation: 7, items })    │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────┐                                         │
//! │  │  watch channel (1 slot)   │  newer snapshots overwrite older ones   │
//! │  └─────────────┬─────────────┘                                         │
//! │                ▼                                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CartPersister::run                           │   │
//! │  │                                                                 │   │
//! │  │  1. Wait: snapshot_rx.changed()                                 │   │
//! │  │  2. Coalesce: sleep(coalesce_window) if configured              │   │
//! │  │  3. Take newest snapshot (generations 5, 6 skipped if 7 exists) │   │
//! │  │  4. Encode: JSON array of non-zero lines                        │   │
//! │  │  5. Write: kv.set(key, json)                                    │   │
//! │  │  6. Publish: PersistStatus { generation: 7, Saved | Failed }    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Sender dropped (shutdown) → last unseen snapshot is still written     │
//! │  before the loop exits.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One task performs every write, so writes land in mutation order and the
//! stored blob always ends at the newest snapshot.

use chrono::{DateTime, Utc};
use marketplace_core::{encode_items, LineItem};
use marketplace_db::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Persist Status
// =============================================================================

/// Result of the most recent write attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PersistOutcome {
    /// Nothing written yet in this session.
    Idle,

    /// The snapshot was written.
    Saved { at: DateTime<Utc> },

    /// The write failed; the cart in memory is unaffected.
    Failed { error: String },
}

/// Latest write the persister has attempted.
///
/// `generation` counts list-changing mutations since the store opened;
/// generation 0 is the restored state, which is never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistStatus {
    pub generation: u64,
    pub outcome: PersistOutcome,
}

impl PersistStatus {
    fn idle() -> Self {
        PersistStatus {
            generation: 0,
            outcome: PersistOutcome::Idle,
        }
    }

    /// True if the last attempt failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PersistOutcome::Failed { .. })
    }

    /// Converts a failed status into [`CartError::PersistFailed`].
    pub fn into_result(self) -> CartResult<Self> {
        match self.outcome {
            PersistOutcome::Failed { error } => Err(CartError::PersistFailed {
                generation: self.generation,
                message: error,
            }),
            _ => Ok(self),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The full list to write, tagged with the mutation that produced it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub generation: u64,
    pub items: Vec<LineItem>,
}

// =============================================================================
// Persister Task
// =============================================================================

/// The background writer. Consumed by [`CartPersister::run`].
pub(crate) struct CartPersister {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    coalesce_window: Duration,
    snapshot_rx: watch::Receiver<Snapshot>,
    status_tx: watch::Sender<PersistStatus>,
}

/// Store-side handle to the running persister.
pub(crate) struct PersistHandle {
    snapshot_tx: watch::Sender<Snapshot>,
    status_rx: watch::Receiver<PersistStatus>,
    task: JoinHandle<()>,
}

impl CartPersister {
    /// Spawns the writer on the current tokio runtime.
    pub fn spawn(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        coalesce_window: Duration,
    ) -> PersistHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (status_tx, status_rx) = watch::channel(PersistStatus::idle());

        let persister = CartPersister {
            kv,
            key: key.into(),
            coalesce_window,
            snapshot_rx,
            status_tx,
        };

        let task = tokio::spawn(persister.run());

        PersistHandle {
            snapshot_tx,
            status_rx,
            task,
        }
    }

    async fn run(mut self) {
        info!(
            key = %self.key,
            coalesce_ms = self.coalesce_window.as_millis() as u64,
            "Cart persister starting"
        );

        while self.snapshot_rx.changed().await.is_ok() {
            if !self.coalesce_window.is_zero() {
                tokio::time::sleep(self.coalesce_window).await;
            }

            let snapshot = self.snapshot_rx.borrow_and_update().clone();
            let outcome = match self.write(&snapshot.items).await {
                Ok(()) => {
                    debug!(
                        generation = snapshot.generation,
                        items = snapshot.items.len(),
                        "Cart persisted"
                    );
                    PersistOutcome::Saved { at: Utc::now() }
                }
                Err(e) => {
                    warn!(
                        generation = snapshot.generation,
                        error = %e,
                        "Failed to persist cart"
                    );
                    PersistOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            self.status_tx.send_replace(PersistStatus {
                generation: snapshot.generation,
                outcome,
            });
        }

        info!("Cart persister stopped");
    }

    async fn write(&self, items: &[LineItem]) -> CartResult<()> {
        let json = encode_items(items)?;
        self.kv.set(&self.key, &json).await?;
        Ok(())
    }
}

impl PersistHandle {
    /// Hands the newest snapshot to the writer. Never blocks.
    pub fn schedule(&self, generation: u64, items: Vec<LineItem>) {
        self.snapshot_tx.send_replace(Snapshot { generation, items });
    }

    /// Latest published status.
    pub fn status(&self) -> PersistStatus {
        self.status_rx.borrow().clone()
    }

    /// Waits until the writer has attempted `generation` (or a later one).
    pub async fn wait_for(&self, generation: u64) -> CartResult<PersistStatus> {
        let mut status_rx = self.status_rx.clone();
        let status = status_rx
            .wait_for(|status| status.generation >= generation)
            .await
            .map_err(|_| CartError::PersisterStopped)?
            .clone();

        status.into_result()
    }

    /// Closes the snapshot channel and waits for the writer to drain.
    pub async fn close(self) -> CartResult<PersistStatus> {
        let PersistHandle {
            snapshot_tx,
            status_rx,
            task,
        } = self;

        drop(snapshot_tx);

        if let Err(e) = task.await {
            error!(error = %e, "Cart persister task failed");
            return Err(CartError::PersisterStopped);
        }

        let status = status_rx.borrow().clone();
        Ok(status)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::{decode_items, Money, ProductCandidate};
    use marketplace_db::MemoryKeyValueStore;

    const KEY: &str = "@GoMarketplace:products";

    fn line(id: &str, quantity: u32) -> LineItem {
        let mut item =
            LineItem::from_candidate(ProductCandidate::new(id, "T", "u", Money::from_cents(1000)));
        item.quantity = quantity;
        item
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_not_written() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let handle = CartPersister::spawn(kv.clone(), KEY, Duration::ZERO);

        let status = handle.close().await.unwrap();

        assert_eq!(status, PersistStatus::idle());
        assert_eq!(kv.write_count(), 0);
    }

    #[tokio::test]
    async fn test_writes_scheduled_snapshot() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let handle = CartPersister::spawn(kv.clone(), KEY, Duration::ZERO);

        handle.schedule(1, vec![line("a", 2)]);
        let status = handle.wait_for(1).await.unwrap();

        assert_eq!(status.generation, 1);
        assert!(matches!(status.outcome, PersistOutcome::Saved { .. }));

        let stored = decode_items(&kv.snapshot(KEY).await.unwrap()).unwrap();
        assert_eq!(stored, vec![line("a", 2)]);
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_latest() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let handle = CartPersister::spawn(kv.clone(), KEY, Duration::ZERO);

        // No await between these, so the writer only ever sees the last one
        for generation in 1..=5 {
            handle.schedule(generation, vec![line("a", generation as u32)]);
        }
        handle.wait_for(5).await.unwrap();

        assert_eq!(kv.write_count(), 1);
        let stored = decode_items(&kv.snapshot(KEY).await.unwrap()).unwrap();
        assert_eq!(stored[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_failure_is_published() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set_fail_writes(true);
        let handle = CartPersister::spawn(kv.clone(), KEY, Duration::ZERO);

        handle.schedule(1, vec![line("a", 1)]);
        let err = handle.wait_for(1).await.unwrap_err();

        assert!(matches!(err, CartError::PersistFailed { generation: 1, .. }));
        assert!(handle.status().is_failed());
    }

    #[tokio::test]
    async fn test_close_drains_last_snapshot() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let handle = CartPersister::spawn(kv.clone(), KEY, Duration::from_millis(10));

        handle.schedule(1, vec![line("a", 3)]);
        let status = handle.close().await.unwrap();

        assert_eq!(status.generation, 1);
        let stored = decode_items(&kv.snapshot(KEY).await.unwrap()).unwrap();
        assert_eq!(stored[0].quantity, 3);
    }

    #[test]
    fn test_status_json() {
        let status = PersistStatus {
            generation: 2,
            outcome: PersistOutcome::Failed {
                error: "disk full".into(),
            },
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["generation"], 2);
        assert_eq!(json["outcome"]["state"], "failed");
        assert_eq!(json["outcome"]["error"], "disk full");
    }
}
