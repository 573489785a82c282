//! # Cart Store Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Persistence   │  │     Underlying          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ConfigRead     │  │  PersistFailed  │  │  Storage (DbError)      │ │
//! │  │  ConfigParse    │  │  PersisterStop. │  │  Codec (CoreError)      │ │
//! │  │  InvalidConfig  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations never return these. They surface from configuration loading,
//! `flush` and `shutdown`.

use marketplace_core::CoreError;
use marketplace_db::DbError;
use thiserror::Error;

/// Result type alias for cart store operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart store error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Cart could not be encoded or decoded.
    #[error("Cart codec error: {0}")]
    Codec(#[from] CoreError),

    /// The write covering `generation` failed.
    #[error("Failed to persist cart generation {generation}: {message}")]
    PersistFailed { generation: u64, message: String },

    /// The background writer is gone.
    #[error("Cart persister stopped")]
    PersisterStopped,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::CartConfig`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but failed validation.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),
}

impl CartError {
    /// True for errors raised by the background writer.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            CartError::Storage(_)
                | CartError::Codec(_)
                | CartError::PersistFailed { .. }
                | CartError::PersisterStopped
        )
    }
}
