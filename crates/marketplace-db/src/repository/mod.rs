//! # Repository Module
//!
//! SQL-backed repositories.
//!
//! ```text
//! CartStore persister
//!      │  kv.set(key, json)
//!      ▼
//! SqliteKeyValueStore
//! ├── get(&self, key)
//! ├── set(&self, key, value)      (upsert)
//! ├── remove(&self, key)
//! └── updated_at(&self, key)
//!      │
//!      ▼
//! key_value_store table
//! ```

pub mod key_value;
