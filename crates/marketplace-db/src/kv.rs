//! # Key-Value Store Contract
//!
//! The only storage surface the cart depends on: a string blob per key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore                                        │
//! │                                                                         │
//! │   get(key)          → Option<String>   (None = never written)          │
//! │   set(key, value)   → ()               (full overwrite)                │
//! │   remove(key)       → ()               (missing key is fine)           │
//! │                                                                         │
//! │   SqliteKeyValueStore ── on-device file, survives restarts             │
//! │   MemoryKeyValueStore ── process-local, tests and ephemeral runs       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::DbResult;

/// Asynchronous string key-value store.
///
/// Implementations must be shareable across tasks: the cart reads through
/// it once at startup and writes through it from a background task.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Deleting a missing key succeeds.
    async fn remove(&self, key: &str) -> DbResult<()>;
}

