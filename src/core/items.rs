//! Purpose: Iterate a collection's members across continuation pages.
//! Exports: `Items`.
//! Role: The lazy, forward-only, restartable view over a collection resource.
//! Invariants: Every member is yielded exactly once, in server order.
//! Invariants: Already-resolved members are yielded with zero I/O.
//! Invariants: A failed step terminates the pass; the cache keeps what succeeded.

use crate::core::doc::HalDoc;
use crate::core::error::Error;

/// Iterator over a collection's member documents. Resolution fills the
/// collection's shared cache rather than consuming it, so a fresh `items()`
/// pass replays resolved members without refetching and only fetches pages
/// that remain.
pub struct Items {
    doc: HalDoc,
    idx: usize,
    done: bool,
}

impl Items {
    pub(crate) fn new(doc: HalDoc) -> Self {
        Self {
            doc,
            idx: 0,
            done: false,
        }
    }
}

impl Iterator for Items {
    type Item = Result<HalDoc, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let items_rel = self.doc.ctx().conventions.items_rel().to_string();
        loop {
            if let Some(link) = self.doc.rels().link_at(&items_rel, self.idx) {
                match link.resolve(self.doc.ctx(), &items_rel) {
                    Ok(doc) => {
                        self.idx += 1;
                        return Some(Ok(doc));
                    }
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
            }
            // Materialized sequence exhausted; pull the continuation page
            // if one remains.
            match self.doc.fetch_next_page() {
                Ok(true) => continue,
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
