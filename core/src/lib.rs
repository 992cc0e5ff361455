//! Client core for a REST collection of posts.
//!
//! # Overview
//! Two layers over the four endpoints of `/api/posts`:
//!
//! - `ResourceClient` builds requests, runs them through a `Transport` and
//!   maps status codes and JSON bodies into typed results.
//! - `ResourceStore` keeps the observable `CollectionState` a UI renders
//!   from and sequences user actions into client calls, reloading the whole
//!   collection after every successful mutation.
//!
//! # Design
//! - Request building and response parsing are pure (`build_*` / `parse_*`),
//!   so the status contract is testable without a network.
//! - Both layers are generic over a `Resource`; `Post` is the one shipped.
//! - The default transport is blocking `ureq`. Nothing is retried or cached.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{PostClient, ResourceClient};
pub use config::ClientConfig;
pub use error::{ClientError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::{Resource, Validate};
pub use store::{
    ActionState, CollectionState, Confirmation, Observer, PostStore, ResourceStore, Status,
    SubscriptionId,
};
pub use transport::{Transport, UreqTransport};
pub use types::{Post, PostFields};
