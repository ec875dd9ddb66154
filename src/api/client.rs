//! Purpose: Define the top-level client surface and root entry points.
//! Exports: `Client`, `get`.
//! Role: Stable caller-facing boundary; wires fetcher, conventions, and observer
//! into the context every document in a relation graph shares.
//! Invariants: Caching is scoped to the graph under one root fetch, never global.

use crate::api::http::HttpFetcher;
use crate::core::conventions::RelConventions;
use crate::core::doc::HalDoc;
use crate::core::error::Error;
use crate::core::fetch::{Ctx, FetchObserver, ResourceFetcher};
use serde_json::Value;
use std::sync::Arc;

pub type ApiResult<T> = Result<T, Error>;

/// Entry point for navigating a HAL+JSON API. Documents fetched through one
/// client share its fetcher, relation-name conventions, and observer, but
/// each `get` roots an independent relation graph with its own cache.
#[derive(Clone)]
pub struct Client {
    ctx: Arc<Ctx>,
}

impl Client {
    /// A client backed by the production HTTP fetcher.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    /// A client backed by an injected fetcher (test double, instrumented
    /// transport, alternative protocol).
    pub fn with_fetcher(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            ctx: Arc::new(Ctx {
                fetcher,
                conventions: RelConventions::default(),
                observer: None,
            }),
        }
    }

    pub fn with_conventions(mut self, conventions: RelConventions) -> Self {
        self.ctx = Arc::new(Ctx {
            fetcher: Arc::clone(&self.ctx.fetcher),
            conventions,
            observer: self.ctx.observer.clone(),
        });
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.ctx = Arc::new(Ctx {
            fetcher: Arc::clone(&self.ctx.fetcher),
            conventions: self.ctx.conventions.clone(),
            observer: Some(observer),
        });
        self
    }

    /// Fetches a root resource and builds its document. Relation accesses on
    /// the result are resolved lazily through this client's fetcher.
    pub fn get(&self, url: &str) -> ApiResult<HalDoc> {
        let value = self.ctx.fetch(url)?;
        HalDoc::from_value(value, Some(url.to_string()), Arc::clone(&self.ctx))
    }

    /// Builds a document from an already-parsed payload without any I/O.
    /// Useful for payloads obtained out of band (webhooks, fixtures).
    pub fn from_payload(&self, value: Value, source_url: Option<&str>) -> ApiResult<HalDoc> {
        HalDoc::from_value(
            value,
            source_url.map(str::to_string),
            Arc::clone(&self.ctx),
        )
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// One-call convenience entry: fetches `url` with a default client.
pub fn get(url: &str) -> ApiResult<HalDoc> {
    Client::new().get(url)
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::core::conventions::RelConventions;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::fetch::ResourceFetcher;
    use serde_json::{Value, json};
    use std::sync::Arc;

    struct OneDoc;

    impl ResourceFetcher for OneDoc {
        fn fetch(&self, _url: &str) -> Result<Value, Error> {
            Ok(json!({
                "_links": {
                    "members": [{"href": "http://api.example/device/1"}],
                    "nextPage": {"href": "http://api.example/devices?page=2"}
                },
                "total": 12
            }))
        }

        fn submit(&self, _url: &str, _body: &Value) -> Result<Value, Error> {
            Err(Error::new(ErrorKind::Usage))
        }
    }

    #[test]
    fn get_roots_a_document_at_the_requested_url() {
        let client = Client::with_fetcher(Arc::new(OneDoc));
        let doc = client.get("http://api.example/devices").unwrap();
        assert_eq!(doc.self_url(), Some("http://api.example/devices"));
        assert_eq!(doc.try_attr("total"), Some(&json!(12)));
    }

    #[test]
    fn conventions_rename_the_collection_vocabulary() {
        let client = Client::with_fetcher(Arc::new(OneDoc)).with_conventions(
            RelConventions::new()
                .with_items_rel("members")
                .with_next_rel("nextPage"),
        );
        let doc = client.get("http://api.example/devices").unwrap();
        assert!(doc.is_collection());
        assert_eq!(doc.rel_len("members"), Some(1));
    }

    #[test]
    fn from_payload_builds_without_io() {
        let client = Client::with_fetcher(Arc::new(OneDoc));
        let doc = client
            .from_payload(json!({"name": "offline"}), None)
            .unwrap();
        assert_eq!(doc.try_attr("name"), Some(&json!("offline")));
        assert!(doc.self_url().is_none());
    }
}
