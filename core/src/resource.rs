//! The seam between the generic client/store and a concrete record type.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Local required-field check run before any write is submitted.
pub trait Validate {
    /// Names (as they appear on the wire) of required fields that are empty
    /// or whitespace-only. An empty vector means the payload may be sent.
    fn missing_fields(&self) -> Vec<&'static str>;
}

/// A record type served from one REST collection.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Write payload for create and update. Never carries the id.
    type Fields: Serialize + Validate + Send + Sync;

    /// Collection path relative to the base URL, with a leading slash.
    const PATH: &'static str;

    /// Server-assigned identifier.
    fn id(&self) -> &str;
}

/// True when `value` has no visible content.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
