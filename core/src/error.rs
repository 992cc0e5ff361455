//! Error types for the resource client and store.
//!
//! # Design
//! `ClientError` mirrors the three ways a round-trip can fail: the server
//! answered with a status the operation does not accept, the body did not
//! match the record schema, or no response was obtained at all. The store
//! wraps it unchanged and adds its own local failures.

use thiserror::Error;

/// Errors returned by `ResourceClient`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server returned a status outside the operation's success set.
    #[error("server responded with HTTP {0}")]
    Http(u16),

    /// The response body could not be decoded into the expected records.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The request never produced a response (connect, DNS, timeout, I/O).
    #[error("request failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("could not encode request: {0}")]
    Encode(String),
}

/// Errors returned by `ResourceStore` actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Required fields were empty; nothing was sent.
    #[error("required fields are empty: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The store was torn down before or during the action.
    #[error("store has been disposed")]
    Disposed,
}
