//! Purpose: Core hypermedia document model (no transport).
//! Exports: `doc` (documents), `rels` (relation resolution), `items` (iteration),
//! `fetch` (collaborator boundary), `conventions`, `error`.
//! Role: Everything needed to navigate a HAL+JSON graph given an injected fetcher.
//! Invariants: No module here performs network I/O except through `fetch::ResourceFetcher`.

pub mod conventions;
pub mod doc;
pub mod error;
pub mod fetch;
pub mod items;
pub(crate) mod link;
pub mod rels;
