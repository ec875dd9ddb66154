//! Purpose: Map relation names to their links and own lazy resolution.
//! Exports: `Resolved` (public), `RelTable`, `RelEntry` (crate-internal).
//! Role: The navigable `rels` surface behind every document.
//! Invariants: Multiplicity is fixed by the source payload shape and never changes.
//! Invariants: Resolving element i of a sequence never forces element j.
//! Invariants: The items sequence of a collection is append-only (pagination).

use crate::core::doc::HalDoc;
use crate::core::error::{Error, ErrorKind};
use crate::core::fetch::Ctx;
use crate::core::link::Link;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Result of resolving a relation: a single document or the full ordered
/// sequence, depending on how the server payload declared the relation.
#[derive(Clone, Debug)]
pub enum Resolved {
    One(HalDoc),
    Many(Vec<HalDoc>),
}

impl Resolved {
    /// The document, when the relation was declared singular.
    pub fn single(self) -> Option<HalDoc> {
        match self {
            Resolved::One(doc) => Some(doc),
            Resolved::Many(_) => None,
        }
    }

    /// The documents as a sequence; a singular relation becomes a
    /// one-element sequence.
    pub fn sequence(self) -> Vec<HalDoc> {
        match self {
            Resolved::One(doc) => vec![doc],
            Resolved::Many(docs) => docs,
        }
    }
}

pub(crate) enum RelEntry {
    One(Arc<Link>),
    Many(Mutex<Vec<Arc<Link>>>),
}

impl RelEntry {
    pub(crate) fn many(links: Vec<Arc<Link>>) -> Self {
        RelEntry::Many(Mutex::new(links))
    }
}

pub(crate) struct RelTable {
    entries: HashMap<String, RelEntry>,
}

impl RelTable {
    pub(crate) fn new(entries: HashMap<String, RelEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Target href of a singular relation, when the link carries one.
    pub(crate) fn href(&self, name: &str) -> Option<String> {
        match self.entries.get(name)? {
            RelEntry::One(link) => link.href().map(str::to_string),
            RelEntry::Many(_) => None,
        }
    }

    /// Number of currently materialized links under a relation. A singular
    /// relation counts as one.
    pub(crate) fn seq_len(&self, name: &str) -> Option<usize> {
        match self.entries.get(name)? {
            RelEntry::One(_) => Some(1),
            RelEntry::Many(links) => Some(
                links
                    .lock()
                    .unwrap_or_else(|poison| poison.into_inner())
                    .len(),
            ),
        }
    }

    pub(crate) fn link_at(&self, name: &str, idx: usize) -> Option<Arc<Link>> {
        match self.entries.get(name)? {
            RelEntry::One(link) => (idx == 0).then(|| Arc::clone(link)),
            RelEntry::Many(links) => links
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .get(idx)
                .map(Arc::clone),
        }
    }

    /// Snapshot of all links under a relation, in server order.
    pub(crate) fn links_of(&self, name: &str) -> Vec<Arc<Link>> {
        match self.entries.get(name) {
            None => Vec::new(),
            Some(RelEntry::One(link)) => vec![Arc::clone(link)],
            Some(RelEntry::Many(links)) => links
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .iter()
                .map(Arc::clone)
                .collect(),
        }
    }

    /// Appends continuation-page links to a sequence relation, preserving
    /// server order.
    pub(crate) fn extend_seq(&self, name: &str, more: Vec<Arc<Link>>) -> Result<(), Error> {
        match self.entries.get(name) {
            Some(RelEntry::Many(links)) => {
                links
                    .lock()
                    .unwrap_or_else(|poison| poison.into_inner())
                    .extend(more);
                Ok(())
            }
            Some(RelEntry::One(_)) => Err(Error::new(ErrorKind::MalformedPayload)
                .with_message("paginated relation is not a sequence")
                .with_relation(name)),
            None => Err(Error::new(ErrorKind::RelationNotFound)
                .with_message("relation absent from payload")
                .with_relation(name)),
        }
    }

    /// Resolves a relation by name. Singular relations yield the document;
    /// sequence relations yield every element, each independently cached.
    pub(crate) fn resolve(&self, name: &str, ctx: &Arc<Ctx>) -> Result<Resolved, Error> {
        match self.entries.get(name) {
            None => Err(Error::new(ErrorKind::RelationNotFound)
                .with_message("relation absent from payload")
                .with_relation(name)),
            Some(RelEntry::One(link)) => Ok(Resolved::One(link.resolve(ctx, name)?)),
            Some(RelEntry::Many(links)) => {
                let snapshot: Vec<Arc<Link>> = links
                    .lock()
                    .unwrap_or_else(|poison| poison.into_inner())
                    .iter()
                    .map(Arc::clone)
                    .collect();
                let mut docs = Vec::with_capacity(snapshot.len());
                for link in snapshot {
                    docs.push(link.resolve(ctx, name)?);
                }
                Ok(Resolved::Many(docs))
            }
        }
    }

    /// Resolves exactly one element of a sequence relation without forcing
    /// its siblings.
    pub(crate) fn resolve_at(
        &self,
        name: &str,
        idx: usize,
        ctx: &Arc<Ctx>,
    ) -> Result<HalDoc, Error> {
        if !self.contains(name) {
            return Err(Error::new(ErrorKind::RelationNotFound)
                .with_message("relation absent from payload")
                .with_relation(name));
        }
        let link = self.link_at(name, idx).ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("index {idx} out of bounds for relation"))
                .with_relation(name)
        })?;
        link.resolve(ctx, name)
    }
}
