//! Shared fixtures: a fake upstream use case API and request helpers

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, header::HeaderName, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};

use crate::proxy::config::PortalConfig;
use crate::proxy::server::{build_router, AppState};

#[derive(Clone)]
pub(crate) enum UpstreamBehavior {
    /// Serve `total` records, paged per request
    Pages { total: usize },
    Status(u16),
    Garbage,
    Stall(Duration),
}

#[derive(Clone)]
struct FakeState {
    behavior: UpstreamBehavior,
    queries: Arc<Mutex<Vec<String>>>,
}

pub(crate) struct FakeUpstream {
    pub base_url: String,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    /// Raw query strings received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

pub(crate) fn sample_record(capability: usize) -> Value {
    json!({
        "Capability": capability,
        "Business Function": format!("Function {}", capability),
        "Business Capability": format!("Capability {}", capability),
        "Stakeholder or User": "Analyst",
        "AI Use Case": format!("Use case {}", capability),
        "AI Algorithms & Frameworks": "Gradient boosting, Transformers",
        "Datasets": "CRM, ERP",
        "Action / Implementation": "Pilot",
        "AI Tools & Models": "XGBoost",
        "Digital Platforms and Tools": "Databricks",
        "Expected Outcomes and Results": null,
    })
}

fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

async fn fake_use_cases(State(state): State<FakeState>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    state.queries.lock().unwrap().push(query.clone());

    match state.behavior {
        UpstreamBehavior::Pages { total } => {
            let page: usize = query_value(&query, "page").and_then(|v| v.parse().ok()).unwrap_or(1);
            let page_size: usize = query_value(&query, "page_size")
                .and_then(|v| v.parse().ok())
                .unwrap_or(20);
            let start = page.saturating_sub(1) * page_size;
            let end = (start + page_size).min(total);
            let data: Vec<Value> = (start..end.max(start)).map(|i| sample_record(i + 1)).collect();

            Json(json!({
                "total": total,
                "page": page,
                "page_size": page_size,
                "data": data,
            }))
            .into_response()
        }
        UpstreamBehavior::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "upstream says no").into_response()
        }
        UpstreamBehavior::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
        UpstreamBehavior::Stall(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "total": 0, "page": 1, "page_size": 20, "data": [] })).into_response()
        }
    }
}

/// Serve a fake upstream on an ephemeral loopback port
pub(crate) async fn spawn_upstream(behavior: UpstreamBehavior) -> FakeUpstream {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        behavior,
        queries: queries.clone(),
    };

    let app = Router::new()
        .route("/use-cases", get(fake_use_cases))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    FakeUpstream {
        base_url: format!("http://{}", addr),
        queries,
    }
}

pub(crate) fn portal_router_with(upstream_base_url: String, max_page_size: Option<u32>) -> Router {
    let mut config = PortalConfig::default();
    config.upstream.base_url = upstream_base_url;
    config.upstream.request_timeout = 5;
    config.upstream.max_page_size = max_page_size;

    let state = AppState::from_config(&config).unwrap();
    build_router(state, Path::new("/nonexistent-web-root"))
}

/// Portal router with the default secret in front of `upstream_base_url`
pub(crate) fn portal_router(upstream_base_url: String) -> Router {
    portal_router_with(upstream_base_url, None)
}

/// Serve the full portal on an ephemeral loopback port, returning its base URL
pub(crate) async fn spawn_portal(upstream_base_url: String) -> String {
    let app = portal_router(upstream_base_url);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

pub(crate) fn request(
    method: Method,
    uri: &str,
    headers: &[(HeaderName, &str)],
    json_body: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name.clone(), *value);
    }

    let typed = headers.iter().any(|(name, _)| *name == header::CONTENT_TYPE);
    match json_body {
        Some(body) if typed => builder.body(Body::from(body.to_string())).unwrap(),
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
