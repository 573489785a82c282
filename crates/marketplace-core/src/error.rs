//! # Error Types
//!
//! Domain-specific error types for marketplace-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marketplace-core errors (this file)                                   │
//! │  └── CoreError        - Encoding/decoding of the cart blob             │
//! │                                                                         │
//! │  marketplace-db errors (separate crate)                                │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  marketplace-cart errors                                               │
//! │  └── CartError        - Persist, config and store lifecycle failures   │
//! │                                                                         │
//! │  Flow: CoreError / DbError → CartError → CLI (anyhow)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations themselves cannot fail: adding, incrementing or
//! decrementing always yields a valid cart. Only the serialized form can be
//! wrong.

use thiserror::Error;

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The line item list could not be serialized.
    #[error("Failed to encode cart items: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored blob is not a valid line item list.
    ///
    /// ## When This Occurs
    /// - Blob was truncated by a power loss mid-write
    /// - Blob was written by an incompatible version
    /// - A quantity is negative or a price is not a number
    #[error("Failed to decode cart items: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
