//! Purpose: Represent one relation target and its resolution state machine.
//! Exports: `Link`, `LinkState` (crate-internal).
//! Role: The unit of caching; every relation access ends at a link.
//! Invariants: Unresolved -> Resolved happens at most once per link.
//! Invariants: At most one in-flight fetch per link; waiters observe the result.
//! Invariants: Failures reset to Unresolved so a later access retries.

use crate::core::doc::HalDoc;
use crate::core::error::{Error, ErrorKind};
use crate::core::fetch::{Ctx, FetchEvent};
use std::sync::{Arc, Condvar, Mutex};

pub(crate) enum LinkState {
    Unresolved,
    Resolving,
    Resolved(HalDoc),
}

pub(crate) struct Link {
    href: Option<String>,
    state: Mutex<LinkState>,
    cond: Condvar,
}

impl Link {
    /// A link-only relation target; resolving it requires a fetch.
    pub(crate) fn unresolved(href: String) -> Self {
        Self {
            href: Some(href),
            state: Mutex::new(LinkState::Unresolved),
            cond: Condvar::new(),
        }
    }

    /// An embedded relation target, pre-resolved at construction time.
    /// Accessing it never triggers I/O.
    pub(crate) fn resolved(doc: HalDoc) -> Self {
        let href = doc.self_url().map(str::to_string);
        Self {
            href,
            state: Mutex::new(LinkState::Resolved(doc)),
            cond: Condvar::new(),
        }
    }

    pub(crate) fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Cached document, if this link has been resolved. Never fetches.
    pub(crate) fn peek(&self) -> Option<HalDoc> {
        let state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        match &*state {
            LinkState::Resolved(doc) => Some(doc.clone()),
            _ => None,
        }
    }

    /// Returns the target document, fetching it on first access. Concurrent
    /// callers on the same unresolved link are serialized: one fetches, the
    /// rest block and then read the cached result.
    pub(crate) fn resolve(&self, ctx: &Arc<Ctx>, relation: &str) -> Result<HalDoc, Error> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        loop {
            match &*state {
                LinkState::Resolved(doc) => {
                    let doc = doc.clone();
                    drop(state);
                    ctx.notify(FetchEvent::CacheHit { relation });
                    return Ok(doc);
                }
                LinkState::Resolving => {
                    state = self
                        .cond
                        .wait(state)
                        .unwrap_or_else(|poison| poison.into_inner());
                }
                LinkState::Unresolved => break,
            }
        }
        *state = LinkState::Resolving;
        drop(state);

        let result = self.fetch_target(ctx, relation);

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        match result {
            Ok(doc) => {
                *state = LinkState::Resolved(doc.clone());
                self.cond.notify_all();
                Ok(doc)
            }
            Err(err) => {
                *state = LinkState::Unresolved;
                self.cond.notify_all();
                Err(err)
            }
        }
    }

    fn fetch_target(&self, ctx: &Arc<Ctx>, relation: &str) -> Result<HalDoc, Error> {
        let Some(href) = self.href.as_deref() else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("unresolved link has no href")
                .with_relation(relation));
        };
        let value = ctx
            .fetch(href)
            .map_err(|err| err.with_relation(relation))?;
        HalDoc::from_value(value, Some(href.to_string()), Arc::clone(ctx))
            .map_err(|err| err.with_relation(relation))
    }
}
