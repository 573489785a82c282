//! # Cart Blob Codec
//!
//! The persisted form of a cart is a single JSON array of line items stored
//! under one key:
//!
//! ```json
//! [{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}]
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::LineItem;

/// Serializes a line item list to the stored JSON form.
pub fn encode_items(items: &[LineItem]) -> CoreResult<String> {
    serde_json::to_string(items).map_err(CoreError::Encode)
}

/// Parses the stored JSON form back into a line item list.
///
/// No normalisation happens here; feed the result to
/// [`crate::Cart::from_items`].
pub fn decode_items(raw: &str) -> CoreResult<Vec<LineItem>> {
    serde_json::from_str(raw).map_err(CoreError::Decode)
}
