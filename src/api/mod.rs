//! Purpose: Define the stable public API surface of the crate.
//! Exports: Client/entry points, document types, fetcher boundary, errors.
//! Role: The only path callers need; core modules stay reachable but secondary.
//! Invariants: Additive-only surface; internal resolution machinery stays private.

mod client;
mod http;

pub use crate::core::conventions::RelConventions;
pub use crate::core::doc::{DocKind, HalDoc};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::fetch::{FetchEvent, FetchObserver, ResourceFetcher};
pub use crate::core::items::Items;
pub use crate::core::rels::Resolved;
pub use client::{ApiResult, Client, get};
pub use http::HttpFetcher;
