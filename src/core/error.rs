//! Purpose: Define the single error type shared by the document model and fetchers.
//! Exports: `Error`, `ErrorKind`.
//! Role: Error boundary; every fallible operation in the crate returns this type.
//! Invariants: Errors surface synchronously to the caller; nothing is swallowed.
//! Invariants: Kinds map one-to-one onto the failure taxonomy of the wire contract.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Requested relation absent from the payload. An API-contract error,
    /// never retried by the model.
    RelationNotFound,
    /// Transport failure or non-2xx status during a read. The link stays
    /// unresolved, so a later access retries.
    FetchFailed,
    /// Response is not valid HAL+JSON (non-object body, link without href,
    /// pagination cycle).
    MalformedPayload,
    /// Write rejected by the server. Carries status and any structured
    /// server detail; no partial document is produced.
    CreateFailed,
    /// Caller error outside the wire taxonomy (invalid URL, unresolved link
    /// missing an href).
    Usage,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    url: Option<String>,
    relation: Option<String>,
    status: Option<u16>,
    detail: Option<serde_json::Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            url: None,
            relation: None,
            status: None,
            detail: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Structured error body returned by the server, when it sent one.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        self.detail.as_ref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(relation) = &self.relation {
            write!(f, " (rel: {relation})")?;
        }
        if let Some(url) = &self.url {
            write!(f, " (url: {url})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}
