//! Purpose: End-to-end tests for lazy relation resolution and caching.
//! Exports: None (integration test module).
//! Role: Validate idempotent resolution, embedded precedence, and create
//! semantics against a counting in-memory fetcher.
//! Invariants: No test touches a real network.

use haldoc::api::{Client, Error, ErrorKind, FetchEvent, FetchObserver, ResourceFetcher};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct MockApi {
    routes: Mutex<HashMap<String, Value>>,
    fetched: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, Value)>>,
    create_response: Mutex<Option<Value>>,
}

impl MockApi {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            fetched: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            create_response: Mutex::new(None),
        })
    }

    fn route(&self, url: &str, payload: Value) {
        self.routes.lock().unwrap().insert(url.to_string(), payload);
    }

    fn on_create(&self, payload: Value) {
        *self.create_response.lock().unwrap() = Some(payload);
    }

    fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    fn submissions(&self) -> Vec<(String, Value)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl ResourceFetcher for MockApi {
    fn fetch(&self, url: &str) -> Result<Value, Error> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| {
                Error::new(ErrorKind::FetchFailed)
                    .with_message("no route")
                    .with_status(404)
                    .with_url(url)
            })
    }

    fn submit(&self, url: &str, body: &Value) -> Result<Value, Error> {
        self.submitted
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        self.create_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| {
                Error::new(ErrorKind::CreateFailed)
                    .with_message("write rejected")
                    .with_status(422)
                    .with_detail(json!({"message": "invalid body"}))
                    .with_url(url)
            })
    }
}

fn client(api: &Arc<MockApi>) -> Client {
    Client::with_fetcher(Arc::clone(api) as Arc<dyn ResourceFetcher>)
}

#[test]
fn resolution_is_idempotent() {
    let api = MockApi::new();
    api.route(
        "http://api.example/device/1",
        json!({
            "_links": {
                "self": {"href": "http://api.example/device/1"},
                "site": {"href": "http://api.example/site/9"}
            },
            "name": "thermostat"
        }),
    );
    api.route(
        "http://api.example/site/9",
        json!({
            "_links": {"self": {"href": "http://api.example/site/9"}},
            "name": "rooftop"
        }),
    );

    let doc = client(&api).get("http://api.example/device/1").unwrap();
    assert_eq!(api.fetch_count(), 1);

    let first = doc.rel("site").unwrap().single().unwrap();
    assert_eq!(api.fetch_count(), 2);

    let second = doc.rel("site").unwrap().single().unwrap();
    assert_eq!(api.fetch_count(), 2, "second access must not refetch");
    assert!(first.same_instance(&second));
    assert_eq!(second.try_attr("name"), Some(&json!("rooftop")));
}

#[test]
fn embedded_relations_never_fetch() {
    let api = MockApi::new();
    api.route(
        "http://api.example/device/1",
        json!({
            "_links": {"self": {"href": "http://api.example/device/1"}},
            "_embedded": {
                "site": {
                    "_links": {"self": {"href": "http://api.example/site/9"}},
                    "name": "rooftop"
                }
            }
        }),
    );

    let doc = client(&api).get("http://api.example/device/1").unwrap();
    let site = doc.rel("site").unwrap().single().unwrap();
    assert_eq!(site.try_attr("name"), Some(&json!("rooftop")));
    assert_eq!(api.fetch_count(), 1, "only the root fetch");
}

#[test]
fn embedded_wins_when_relation_is_also_linked() {
    let api = MockApi::new();
    api.route(
        "http://api.example/device/1",
        json!({
            "_links": {
                "site": {"href": "http://api.example/site/9"}
            },
            "_embedded": {
                "site": {"name": "from-embedded"}
            }
        }),
    );
    // Deliberately no route for the linked URL: a fetch would fail loudly.

    let doc = client(&api).get("http://api.example/device/1").unwrap();
    let site = doc.rel("site").unwrap().single().unwrap();
    assert_eq!(site.try_attr("name"), Some(&json!("from-embedded")));
    assert_eq!(api.fetch_count(), 1);
}

#[test]
fn failed_resolution_leaves_link_retryable() {
    let api = MockApi::new();
    api.route(
        "http://api.example/device/1",
        json!({
            "_links": {"site": {"href": "http://api.example/site/9"}}
        }),
    );

    let doc = client(&api).get("http://api.example/device/1").unwrap();
    let err = doc.rel("site").expect_err("route is missing");
    assert_eq!(err.kind(), ErrorKind::FetchFailed);
    assert_eq!(err.url(), Some("http://api.example/site/9"));

    // Route appears; the unresolved link retries instead of serving a
    // cached failure.
    api.route("http://api.example/site/9", json!({"name": "late"}));
    let site = doc.rel("site").unwrap().single().unwrap();
    assert_eq!(site.try_attr("name"), Some(&json!("late")));
}

#[test]
fn create_posts_to_the_form_and_returns_the_new_resource() {
    let api = MockApi::new();
    api.route(
        "http://api.example/devices",
        json!({
            "_links": {
                "self": {"href": "http://api.example/devices"},
                "createForm": {"href": "http://api.example/devices/new"}
            },
            "_embedded": {
                "items": [
                    {"name": "a"},
                    {"name": "b"}
                ]
            }
        }),
    );
    api.on_create(json!({
        "_links": {"self": {"href": "http://api.example/device/3"}},
        "name": "c"
    }));

    let coll = client(&api).get("http://api.example/devices").unwrap();
    let resolved: Vec<_> = coll.rel("items").unwrap().sequence();
    assert_eq!(resolved.len(), 2);

    let created = coll.create(&json!({"name": "c"})).unwrap();
    assert_eq!(created.self_url(), Some("http://api.example/device/3"));
    assert_eq!(created.try_attr("name"), Some(&json!("c")));

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0, "http://api.example/devices/new");
    assert_eq!(submissions[0].1, json!({"name": "c"}));

    // The cached items sequence is untouched; only a fresh fetch observes
    // the new member.
    assert_eq!(coll.rel_len("items"), Some(2));
    api.route(
        "http://api.example/devices",
        json!({
            "_embedded": {
                "items": [{"name": "a"}, {"name": "b"}, {"name": "c"}]
            }
        }),
    );
    let fresh = client(&api).get("http://api.example/devices").unwrap();
    assert_eq!(fresh.rel_len("items"), Some(3));
}

#[test]
fn rejected_create_surfaces_status_and_detail() {
    let api = MockApi::new();
    api.route(
        "http://api.example/devices",
        json!({
            "_links": {"createForm": {"href": "http://api.example/devices/new"}}
        }),
    );

    let coll = client(&api).get("http://api.example/devices").unwrap();
    let err = coll.create(&json!({})).expect_err("mock rejects writes");
    assert_eq!(err.kind(), ErrorKind::CreateFailed);
    assert_eq!(err.status(), Some(422));
    assert_eq!(
        err.detail().and_then(|d| d["message"].as_str()),
        Some("invalid body")
    );
}

#[test]
fn create_without_form_is_relation_not_found() {
    let api = MockApi::new();
    api.route("http://api.example/device/1", json!({"name": "x"}));

    let doc = client(&api).get("http://api.example/device/1").unwrap();
    let err = doc.create(&json!({})).expect_err("no create form");
    assert_eq!(err.kind(), ErrorKind::RelationNotFound);
    assert_eq!(err.relation(), Some("createForm"));
}

#[test]
fn observer_sees_fetches_and_cache_hits() {
    struct Tally {
        fetches: Mutex<Vec<String>>,
        hits: Mutex<Vec<String>>,
    }

    impl FetchObserver for Tally {
        fn on_event(&self, event: FetchEvent<'_>) {
            match event {
                FetchEvent::Fetch { url } => self.fetches.lock().unwrap().push(url.to_string()),
                FetchEvent::CacheHit { relation } => {
                    self.hits.lock().unwrap().push(relation.to_string())
                }
                _ => {}
            }
        }
    }

    let api = MockApi::new();
    api.route(
        "http://api.example/device/1",
        json!({
            "_links": {"site": {"href": "http://api.example/site/9"}}
        }),
    );
    api.route("http://api.example/site/9", json!({"name": "rooftop"}));

    let tally = Arc::new(Tally {
        fetches: Mutex::new(Vec::new()),
        hits: Mutex::new(Vec::new()),
    });
    let client = client(&api).with_observer(Arc::clone(&tally) as Arc<dyn FetchObserver>);

    let doc = client.get("http://api.example/device/1").unwrap();
    doc.rel("site").unwrap();
    doc.rel("site").unwrap();

    assert_eq!(
        tally.fetches.lock().unwrap().as_slice(),
        ["http://api.example/device/1", "http://api.example/site/9"]
    );
    assert_eq!(tally.hits.lock().unwrap().as_slice(), ["site"]);
}
