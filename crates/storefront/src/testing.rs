//! Test helpers: an in-process stand-in for the remote storefront API.
//!
//! Responses are queued per `(method, path?query)`. Each request pops the
//! next one; the last response repeats. Unmatched requests answer 404.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
};
use serde_json::{Value, json};
use tower_sessions::{MemoryStore, Session};

use grips_gears_core::UserRole;

use crate::config::{StorefrontConfig, test_config};
use crate::models::CurrentUser;
use crate::state::AppState;

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct MockInner {
    responses: HashMap<(Method, String), VecDeque<(StatusCode, Value)>>,
    requests: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockInner>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `200 OK` JSON response.
    pub fn ok(self, method: Method, path: &str, body: Value) -> Self {
        self.respond(method, path, StatusCode::OK, body)
    }

    /// Queue a response with any status.
    pub fn respond(self, method: Method, path: &str, status: StatusCode, body: Value) -> Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back((status, body));
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// How many times `method path` was called.
    pub fn calls(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    /// Bodies sent to `method path`, in order.
    pub fn bodies(&self, method: &Method, path: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .map(|r| r.body)
            .collect()
    }

    /// Serve on an ephemeral local port and return its base URL.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Serve and build an `AppState` whose API client points at the mock.
    pub async fn state(&self) -> AppState {
        self.state_with(|_| {}).await
    }

    /// Like [`Self::state`], adjusting the configuration first.
    pub async fn state_with(&self, adjust: impl FnOnce(&mut StorefrontConfig)) -> AppState {
        let mut config = test_config();
        config.api.base_url = self.serve().await;
        adjust(&mut config);
        AppState::new(config).unwrap()
    }
}

async fn handle(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut inner = mock.inner.lock().unwrap();
    inner.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let reply = inner
        .responses
        .get_mut(&(method, path))
        .and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
    let (status, body) = reply.unwrap_or((StatusCode::NOT_FOUND, json!({"message": "not found"})));
    (status, Json(body))
}

/// A fresh session on an in-memory store.
pub fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// A signed-in customer.
pub fn customer(email: &str) -> CurrentUser {
    CurrentUser::new(
        email.to_string(),
        "Rider".to_string(),
        UserRole::User,
        "token-123".to_string(),
    )
}

/// A signed-in admin.
pub fn admin(email: &str) -> CurrentUser {
    CurrentUser::new(
        email.to_string(),
        "Admin".to_string(),
        UserRole::Admin,
        "token-admin".to_string(),
    )
}
