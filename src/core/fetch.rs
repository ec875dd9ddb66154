//! Purpose: Define the transport boundary and the resolve-event observer hook.
//! Exports: `ResourceFetcher`, `FetchObserver`, `FetchEvent`.
//! Role: The only seam through which the document model touches a network.
//! Invariants: The model itself performs no I/O; every round trip goes through a fetcher.
//! Invariants: Observer callbacks are notification-only and must not fail.

use crate::core::conventions::RelConventions;
use crate::core::error::Error;
use serde_json::Value;
use std::sync::Arc;

/// The sole collaborator permitted to perform network I/O. `fetch` performs
/// a read (GET semantics), `submit` a write (POST semantics); both return
/// the parsed JSON response body.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Value, Error>;
    fn submit(&self, url: &str, body: &Value) -> Result<Value, Error>;
}

/// One resolve/fetch activity notification.
#[derive(Clone, Copy, Debug)]
pub enum FetchEvent<'a> {
    /// A read round trip is about to be issued.
    Fetch { url: &'a str },
    /// A write round trip is about to be issued.
    Submit { url: &'a str },
    /// A relation access was served from the resolution cache with no I/O.
    CacheHit { relation: &'a str },
    /// Collection iteration ran off the materialized items and is fetching
    /// a continuation page.
    PageFetch { url: &'a str },
}

/// Injectable callback invoked on every fetch/resolve event. Replaces any
/// hardwired logging in the model; wire it to whatever facility the caller
/// prefers.
pub trait FetchObserver: Send + Sync {
    fn on_event(&self, event: FetchEvent<'_>);
}

impl<F> FetchObserver for F
where
    F: Fn(FetchEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: FetchEvent<'_>) {
        self(event)
    }
}

/// Shared context threaded through every document in one relation graph:
/// the fetcher, the relation-name vocabulary, and the optional observer.
pub(crate) struct Ctx {
    pub(crate) fetcher: Arc<dyn ResourceFetcher>,
    pub(crate) conventions: RelConventions,
    pub(crate) observer: Option<Arc<dyn FetchObserver>>,
}

impl Ctx {
    pub(crate) fn notify(&self, event: FetchEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }

    pub(crate) fn fetch(&self, url: &str) -> Result<Value, Error> {
        self.notify(FetchEvent::Fetch { url });
        self.fetcher.fetch(url)
    }

    pub(crate) fn submit(&self, url: &str, body: &Value) -> Result<Value, Error> {
        self.notify(FetchEvent::Submit { url });
        self.fetcher.submit(url, body)
    }
}
