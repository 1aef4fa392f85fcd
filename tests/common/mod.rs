#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use devhabit_api::app::{router, AppState};
use devhabit_api::database::{seed, MemoryStore};

pub const HATEOAS: &str = "application/vnd.dev-habit.hateoas+json";
pub const HATEOAS_V2: &str = "application/vnd.dev-habit.hateoas.2+json";

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).with_context(|| format!("body is not JSON: {:?}", self.body))
    }
}

/// A fresh app over an empty in-memory store.
pub fn app() -> Router {
    app_over(Arc::new(MemoryStore::new()))
}

/// An app over an in-memory store holding the demo habits.
pub async fn seeded_app() -> Result<Router> {
    let store = Arc::new(MemoryStore::new());
    seed::apply(store.as_ref()).await?;
    Ok(app_over(store))
}

fn app_over(store: Arc<MemoryStore>) -> Router {
    let state = AppState::new(store, None).expect("sort mappings register");
    state.warm_field_tables().expect("field tables build");
    router(state)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    accept: Option<&str>,
    body: Option<Value>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header_value(header::CONTENT_TYPE);
    let location = header_value(header::LOCATION);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    Ok(TestResponse {
        status,
        content_type,
        location,
        body: String::from_utf8(bytes.to_vec())?,
    })
}

pub async fn get(app: &Router, uri: &str, accept: Option<&str>) -> Result<TestResponse> {
    send(app, Method::GET, uri, accept, None).await
}

pub fn habit_body(name: &str, habit_type: &str, times_per_period: i32) -> Value {
    json!({
        "name": name,
        "description": format!("{} every day", name),
        "type": habit_type,
        "frequency": { "type": "daily", "timesPerPeriod": times_per_period },
        "target": { "value": 30, "unit": "minutes" },
    })
}

/// Create a habit and return its id.
pub async fn create_habit(app: &Router, name: &str, habit_type: &str, times_per_period: i32) -> Result<String> {
    let res = send(app, Method::POST, "/habits", None, Some(habit_body(name, habit_type, times_per_period))).await?;
    anyhow::ensure!(res.status == StatusCode::CREATED, "create habit failed: {} {}", res.status, res.body);
    id_of(&res)
}

/// Create a tag and return its id.
pub async fn create_tag(app: &Router, name: &str) -> Result<String> {
    let res = send(app, Method::POST, "/tags", None, Some(json!({ "name": name }))).await?;
    anyhow::ensure!(res.status == StatusCode::CREATED, "create tag failed: {} {}", res.status, res.body);
    id_of(&res)
}

fn id_of(res: &TestResponse) -> Result<String> {
    res.json()?
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("response has no id")
}

/// `(rel, href, method)` for every link in a JSON array.
pub fn links_of(value: &Value) -> Vec<(String, String, String)> {
    value
        .as_array()
        .map(|links| {
            links
                .iter()
                .map(|link| {
                    let field = |name: &str| link[name].as_str().unwrap_or_default().to_string();
                    (field("rel"), field("href"), field("method"))
                })
                .collect()
        })
        .unwrap_or_default()
}
