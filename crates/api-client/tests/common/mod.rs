//! In-process tikwm stand-in for integration tests
//!
//! Serves the three upstream operations on `127.0.0.1:0` and records every
//! call so tests can assert on what the client actually sent.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, Uri};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tikwm_api_client::{ClientConfig, TikwmClient};
use tokio::net::TcpListener;

/// Handle that answers for a missing user
pub const UNKNOWN_USER: &str = "nobody";

/// Post id whose enrichment call fails
pub const BROKEN_POST: &str = "broken";

/// Post id whose enrichment call takes five seconds
pub const SLOW_POST: &str = "slow";

/// How every call to a mock is answered
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Serve the feed script, posts and profiles
    Healthy,
    /// Answer every call with this envelope error
    Failing { code: i64, message: &'static str },
    /// Answer every call with a non-JSON body
    Garbage,
    /// Wait before answering like `Healthy`
    Slow(Duration),
    /// Wait on the first call only, then answer like `Healthy`
    SlowFirst(Duration),
}

/// One scripted feed page, keyed by the cursor that requests it
#[derive(Debug, Clone)]
pub enum PageScript {
    Page {
        items: Vec<Value>,
        cursor: &'static str,
        has_more: bool,
    },
    Error {
        code: i64,
        message: &'static str,
    },
}

/// A call as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub accept: Option<String>,
    pub query: HashMap<String, String>,
    pub at: Instant,
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    pages: Arc<HashMap<String, PageScript>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Running mock upstream
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    /// Start a mock with no feed script
    pub async fn start(behavior: Behavior) -> Self {
        Self::with_pages(behavior, HashMap::new()).await
    }

    /// Start a mock serving `pages` on `user/posts`
    pub async fn with_pages(behavior: Behavior, pages: HashMap<String, PageScript>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behavior,
            pages: Arc::new(pages),
            calls: Arc::clone(&calls),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            calls,
            _handle: handle,
        }
    }

    /// Base URL to use as an endpoint
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls received on one operation path
    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }
}

/// An endpoint nothing listens on
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Unthrottled client over `endpoints`
pub fn client(endpoints: &[String]) -> TikwmClient {
    let config = ClientConfig::default()
        .with_endpoints(endpoints.iter().cloned())
        .without_throttle()
        .with_timeout(Duration::from_secs(5));
    TikwmClient::with_config(config).unwrap()
}

/// Throttled client over `endpoints`
pub fn throttled_client(endpoints: &[String], interval: Duration) -> TikwmClient {
    let config = ClientConfig::default()
        .with_endpoints(endpoints.iter().cloned())
        .with_min_interval(interval)
        .with_timeout(Duration::from_secs(10));
    TikwmClient::with_config(config).unwrap()
}

/// Feed item as the upstream lists it: no HD link
pub fn feed_item(id: &str) -> Value {
    json!({
        "id": id,
        "video_id": id,
        "title": format!("post {id}"),
        "play": format!("https://cdn.test/{id}.mp4"),
        "wmplay": format!("https://cdn.test/{id}-wm.mp4"),
        "images": []
    })
}

/// Feed script entry
pub fn page(ids: &[&str], cursor: &'static str, has_more: bool) -> PageScript {
    PageScript::Page {
        items: ids.iter().map(|id| feed_item(id)).collect(),
        cursor,
        has_more,
    }
}

fn ok(data: Value) -> String {
    json!({"code": 0, "msg": "success", "processed_time": 0.01, "data": data}).to_string()
}

fn err(code: i64, message: &str) -> String {
    json!({"code": code, "msg": message, "processed_time": 0.01, "data": []}).to_string()
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> String {
    let path = uri
        .path()
        .trim_start_matches("/api")
        .trim_start_matches('/')
        .to_string();

    let seen = {
        let mut calls = state.calls.lock().unwrap();
        calls.push(RecordedCall {
            method,
            path: path.clone(),
            accept: headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            query: query.clone(),
            at: Instant::now(),
        });
        calls.len()
    };

    match state.behavior {
        Behavior::Failing { code, message } => return err(code, message),
        Behavior::Garbage => return "<html>502 Bad Gateway</html>".to_string(),
        Behavior::Slow(delay) => tokio::time::sleep(delay).await,
        Behavior::SlowFirst(delay) if seen == 1 => tokio::time::sleep(delay).await,
        Behavior::SlowFirst(_) | Behavior::Healthy => {}
    }

    match path.as_str() {
        "" => post_response(&query).await,
        "user/posts" => feed_response(&state, &query),
        "user/info" => profile_response(&query),
        other => err(-1, &format!("unknown operation {other}")),
    }
}

async fn post_response(query: &HashMap<String, String>) -> String {
    let id = query.get("url").cloned().unwrap_or_default();
    if id == BROKEN_POST {
        return err(-1, "video not found");
    }
    if id == SLOW_POST {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    let id = id
        .split('?')
        .next()
        .and_then(|url| url.rsplit('/').next())
        .unwrap_or_default()
        .to_string();
    let hd = query.get("hd").is_some_and(|v| v == "1");
    let mut post = feed_item(&id);
    post["id"] = json!(id);
    if hd {
        post["hdplay"] = json!(format!("https://cdn.test/{id}-hd.mp4"));
    }
    ok(post)
}

fn feed_response(state: &MockState, query: &HashMap<String, String>) -> String {
    let cursor = query.get("cursor").cloned().unwrap_or_default();
    match state.pages.get(&cursor) {
        Some(PageScript::Page {
            items,
            cursor,
            has_more,
        }) => ok(json!({"videos": items, "cursor": cursor, "hasMore": has_more})),
        Some(PageScript::Error { code, message }) => err(*code, message),
        None => ok(json!({"videos": [], "cursor": cursor, "hasMore": false})),
    }
}

fn profile_response(query: &HashMap<String, String>) -> String {
    let unique_id = query.get("unique_id").cloned().unwrap_or_default();
    if unique_id == UNKNOWN_USER {
        return err(-1, "user not exist");
    }

    ok(json!({
        "user": {"id": "6789", "uniqueId": unique_id, "nickname": "Gio", "verified": true},
        "stats": {"followerCount": 2000, "followingCount": 10, "heartCount": 50000, "videoCount": 120}
    }))
}
