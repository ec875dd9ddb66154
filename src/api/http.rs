//! Purpose: Provide the ureq-backed HTTP implementation of `ResourceFetcher`.
//! Exports: `HttpFetcher`.
//! Role: The production transport; one synchronous round trip per call.
//! Invariants: Reads map failures to FetchFailed, writes to CreateFailed.
//! Invariants: Response bodies must parse as JSON or the call is MalformedPayload.
//! Invariants: Retry, timeout, and TLS policy live here or below, never in the model.

use crate::core::error::{Error, ErrorKind};
use crate::core::fetch::ResourceFetcher;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct HttpFetcher {
    inner: Arc<HttpFetcherInner>,
}

struct HttpFetcherInner {
    agent: ureq::Agent,
    token: Option<String>,
}

/// Common shape of structured server error bodies; used to lift a
/// human-readable message out of the detail payload when one exists.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HttpFetcherInner {
                agent: ureq::AgentBuilder::new().build(),
                token: None,
            }),
        }
    }

    /// Attaches a bearer token sent as `Authorization` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token.into());
        } else {
            self.inner = Arc::new(HttpFetcherInner {
                agent: self.inner.agent.clone(),
                token: Some(token.into()),
            });
        }
        self
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        let mut request = self.inner.agent.request(method, url.as_str());
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.set("Accept", "application/hal+json, application/json")
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Value, Error> {
        let url = parse_url(url)?;
        tracing::debug!(url = %url, "http get");
        match self.request("GET", &url).call() {
            Ok(response) => read_json_response(response, url.as_str()),
            Err(ureq::Error::Status(status, response)) => Err(status_error(
                ErrorKind::FetchFailed,
                status,
                response,
                url.as_str(),
            )),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::FetchFailed)
                .with_message("request failed")
                .with_url(url.as_str())
                .with_source(err)),
        }
    }

    fn submit(&self, url: &str, body: &Value) -> Result<Value, Error> {
        let url = parse_url(url)?;
        tracing::debug!(url = %url, "http post");
        let payload = serde_json::to_string(body).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("failed to encode request body")
                .with_source(err)
        })?;
        let response = self
            .request("POST", &url)
            .set("Content-Type", "application/json")
            .send_string(&payload);
        match response {
            Ok(response) => read_json_response(response, url.as_str()),
            Err(ureq::Error::Status(status, response)) => Err(status_error(
                ErrorKind::CreateFailed,
                status,
                response,
                url.as_str(),
            )),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::CreateFailed)
                .with_message("request failed")
                .with_url(url.as_str())
                .with_source(err)),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid url")
            .with_url(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("url must use http or https scheme")
            .with_url(raw));
    }
    Ok(url)
}

fn read_json_response(response: ureq::Response, url: &str) -> Result<Value, Error> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::FetchFailed)
            .with_message("failed to read response body")
            .with_url(url)
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::MalformedPayload)
            .with_message("response body is not valid JSON")
            .with_url(url)
            .with_source(err)
    })
}

fn status_error(kind: ErrorKind, status: u16, response: ureq::Response, url: &str) -> Error {
    let body = response.into_string().unwrap_or_default();
    let mut err = Error::new(kind)
        .with_message(format!("server returned status {status}"))
        .with_status(status)
        .with_url(url);
    if let Ok(detail) = serde_json::from_str::<Value>(&body) {
        if let Ok(parsed) = serde_json::from_value::<ErrorBody>(detail.clone()) {
            if let Some(message) = parsed.message.or(parsed.error) {
                err = err.with_message(message);
            }
        }
        err = err.with_detail(detail);
    }
    err
}
