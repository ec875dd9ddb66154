//! Purpose: Client-side model for navigating HAL+JSON hypermedia APIs.
//! Exports: `api` (stable caller surface), `core` (document model internals).
//! Role: Fetch a root resource, then walk typed relation links lazily; every
//! relation resolves at most once per graph and is cached thereafter.
//! Invariants: Constructing documents never fetches; only relation resolution does.
//! Invariants: All network I/O flows through the injectable `ResourceFetcher`.

pub mod api;
pub mod core;
