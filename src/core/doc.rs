//! Purpose: Model one fetched HAL+JSON resource and its navigable relation graph.
//! Exports: `HalDoc`, `DocKind`.
//! Role: The core abstraction; everything else serves its construction or traversal.
//! Invariants: Construction never performs I/O; all fetching is deferred to resolution.
//! Invariants: `self_url` is immutable once constructed.
//! Invariants: Embedded relations win over link-only relations of the same name.

use crate::core::error::{Error, ErrorKind};
use crate::core::fetch::{Ctx, FetchEvent};
use crate::core::items::Items;
use crate::core::link::Link;
use crate::core::rels::{RelEntry, RelTable, Resolved};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Payload shape, decided once at parse time. A resource is
/// collection-shaped when it exposes the items-convention relation
/// (directly or via a continuation link).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocKind {
    Resource,
    Collection,
}

/// Continuation state for collection pagination. `visited` guards against
/// continuation cycles.
pub(crate) struct PageState {
    next: Option<String>,
    visited: Vec<String>,
}

pub(crate) struct DocInner {
    ctx: Arc<Ctx>,
    self_url: Option<String>,
    kind: DocKind,
    attributes: Map<String, Value>,
    rels: RelTable,
    page: Mutex<PageState>,
}

/// One HAL+JSON resource: plain attributes, a relation table, and the
/// resource's canonical URL. Cheap to clone; clones share the resolution
/// cache, so a relation resolved through one handle is visible through all.
#[derive(Clone)]
pub struct HalDoc {
    inner: Arc<DocInner>,
}

impl HalDoc {
    /// Builds a document from a parsed payload. `source_url` is the URL the
    /// payload was fetched from; a `self` link in the payload takes
    /// precedence as the canonical identity. Performs no I/O.
    pub(crate) fn from_value(
        value: Value,
        source_url: Option<String>,
        ctx: Arc<Ctx>,
    ) -> Result<HalDoc, Error> {
        let Value::Object(mut payload) = value else {
            let mut err = Error::new(ErrorKind::MalformedPayload)
                .with_message("payload is not a JSON object");
            if let Some(url) = &source_url {
                err = err.with_url(url.clone());
            }
            return Err(err);
        };

        let links_zone = payload.remove("_links");
        let embedded_zone = payload.remove("_embedded");

        let mut self_url = source_url;
        let mut entries: HashMap<String, RelEntry> = HashMap::new();

        if let Some(links) = links_zone {
            let Value::Object(links) = links else {
                return Err(Error::new(ErrorKind::MalformedPayload)
                    .with_message("_links is not an object"));
            };
            for (rel, link) in links {
                if rel == ctx.conventions.self_rel() {
                    self_url = Some(link_href(&link, &rel)?);
                    continue;
                }
                match link {
                    Value::Array(seq) => {
                        let mut many = Vec::with_capacity(seq.len());
                        for item in &seq {
                            many.push(Arc::new(Link::unresolved(link_href(item, &rel)?)));
                        }
                        entries.insert(rel, RelEntry::many(many));
                    }
                    single => {
                        let href = link_href(&single, &rel)?;
                        entries.insert(rel, RelEntry::One(Arc::new(Link::unresolved(href))));
                    }
                }
            }
        }

        if let Some(embedded) = embedded_zone {
            let Value::Object(embedded) = embedded else {
                return Err(Error::new(ErrorKind::MalformedPayload)
                    .with_message("_embedded is not an object"));
            };
            // Embedded entries overwrite link-only entries of the same name:
            // the inlined representation is authoritative and fresher.
            for (rel, value) in embedded {
                match value {
                    Value::Array(seq) => {
                        let mut many = Vec::with_capacity(seq.len());
                        for item in seq {
                            let doc = HalDoc::from_value(item, None, Arc::clone(&ctx))
                                .map_err(|err| err.with_relation(rel.clone()))?;
                            many.push(Arc::new(Link::resolved(doc)));
                        }
                        entries.insert(rel, RelEntry::many(many));
                    }
                    single => {
                        let doc = HalDoc::from_value(single, None, Arc::clone(&ctx))
                            .map_err(|err| err.with_relation(rel.clone()))?;
                        entries.insert(rel, RelEntry::One(Arc::new(Link::resolved(doc))));
                    }
                }
            }
        }

        let next = match entries.get(ctx.conventions.next_rel()) {
            Some(RelEntry::One(link)) => link.href().map(str::to_string),
            _ => None,
        };
        // A page that only carries a continuation link still iterates as a
        // collection; give it an empty items sequence to append into.
        if next.is_some() {
            entries
                .entry(ctx.conventions.items_rel().to_string())
                .or_insert_with(|| RelEntry::many(Vec::new()));
        }

        let kind = if entries.contains_key(ctx.conventions.items_rel()) {
            DocKind::Collection
        } else {
            DocKind::Resource
        };
        let rels = RelTable::new(entries);

        let visited = self_url.iter().cloned().collect();
        Ok(HalDoc {
            inner: Arc::new(DocInner {
                ctx,
                self_url,
                kind,
                attributes: payload,
                rels,
                page: Mutex::new(PageState { next, visited }),
            }),
        })
    }

    /// Canonical URL of this resource, from its `self` link (or the URL it
    /// was fetched from when the payload carries none).
    pub fn self_url(&self) -> Option<&str> {
        self.inner.self_url.as_deref()
    }

    pub fn kind(&self) -> DocKind {
        self.inner.kind
    }

    pub fn is_collection(&self) -> bool {
        self.inner.kind == DocKind::Collection
    }

    /// Plain attribute map: every payload key outside `_links`/`_embedded`.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.inner.attributes
    }

    pub fn try_attr(&self, name: &str) -> Option<&Value> {
        self.inner.attributes.get(name)
    }

    pub fn attr(&self, name: &str) -> Result<&Value, Error> {
        self.try_attr(name).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("attribute '{name}' not present in payload"))
        })
    }

    pub fn has_rel(&self, name: &str) -> bool {
        self.inner.rels.contains(name)
    }

    pub fn rel_names(&self) -> Vec<&str> {
        self.inner.rels.names().collect()
    }

    /// Target href of a singular relation, without resolving it.
    pub fn rel_href(&self, name: &str) -> Option<String> {
        self.inner.rels.href(name)
    }

    /// Number of currently materialized links under a relation. For a
    /// paginated collection this grows as continuation pages are fetched.
    pub fn rel_len(&self, name: &str) -> Option<usize> {
        self.inner.rels.seq_len(name)
    }

    /// Resolves a relation, fetching on first access and serving from the
    /// cache thereafter. Sequence relations resolve every element.
    pub fn rel(&self, name: &str) -> Result<Resolved, Error> {
        self.inner.rels.resolve(name, &self.inner.ctx)
    }

    /// Resolves one element of a sequence relation without forcing its
    /// siblings. Does not trigger pagination; only already-materialized
    /// links are addressable.
    pub fn rel_at(&self, name: &str, idx: usize) -> Result<HalDoc, Error> {
        self.inner.rels.resolve_at(name, idx, &self.inner.ctx)
    }

    /// Lazy, restartable iteration over a collection's members, fetching
    /// continuation pages as needed. A non-collection (no items relation,
    /// no continuation) yields zero elements.
    pub fn items(&self) -> Items {
        Items::new(self.clone())
    }

    /// Submits `body` to this resource's create-form relation and returns
    /// the newly created resource's document. The cached items sequence is
    /// deliberately left untouched; re-fetch the collection to observe the
    /// new member under server ordering.
    pub fn create(&self, body: &Value) -> Result<HalDoc, Error> {
        let rel = self.inner.ctx.conventions.create_form_rel();
        if !self.inner.rels.contains(rel) {
            return Err(Error::new(ErrorKind::RelationNotFound)
                .with_message("resource exposes no create form")
                .with_relation(rel));
        }
        let href = self.inner.rels.href(rel).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message("create form link has no href")
                .with_relation(rel)
        })?;
        let value = self.inner.ctx.submit(&href, body)?;
        HalDoc::from_value(value, None, Arc::clone(&self.inner.ctx))
    }

    /// True when both handles refer to the same underlying document
    /// instance (as opposed to two independent fetches of the same URL).
    pub fn same_instance(&self, other: &HalDoc) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn ctx(&self) -> &Arc<Ctx> {
        &self.inner.ctx
    }

    pub(crate) fn rels(&self) -> &RelTable {
        &self.inner.rels
    }

    /// Fetches the next continuation page, appending its items links to the
    /// materialized sequence and adopting the new page's own continuation.
    /// Returns false when no continuation remains. A continuation pointing
    /// at an already-visited page is a malformed payload, not a loop.
    pub(crate) fn fetch_next_page(&self) -> Result<bool, Error> {
        let mut page = self
            .inner
            .page
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let Some(next) = page.next.clone() else {
            return Ok(false);
        };
        if page.visited.contains(&next) {
            return Err(Error::new(ErrorKind::MalformedPayload)
                .with_message("pagination cycle: continuation points at a visited page")
                .with_url(next));
        }

        let ctx = &self.inner.ctx;
        ctx.notify(FetchEvent::PageFetch { url: &next });
        let value = ctx.fetcher.fetch(&next)?;
        let page_doc = HalDoc::from_value(value, Some(next.clone()), Arc::clone(ctx))
            .map_err(|err| err.with_url(next.clone()))?;

        page.visited.push(next);
        page.next = page_doc.rel_href(ctx.conventions.next_rel());

        let items_rel = ctx.conventions.items_rel();
        let more = page_doc.rels().links_of(items_rel);
        if !more.is_empty() {
            self.inner.rels.extend_seq(items_rel, more)?;
        }
        Ok(true)
    }
}

impl fmt::Debug for HalDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalDoc")
            .field("self_url", &self.inner.self_url)
            .field("kind", &self.inner.kind)
            .field("attributes", &self.inner.attributes)
            .finish_non_exhaustive()
    }
}

fn link_href(link: &Value, rel: &str) -> Result<String, Error> {
    let href = link.as_object().and_then(|obj| obj.get("href"));
    match href {
        Some(Value::String(href)) => Ok(href.clone()),
        _ => Err(Error::new(ErrorKind::MalformedPayload)
            .with_message("link missing required href field")
            .with_relation(rel)),
    }
}
