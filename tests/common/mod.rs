#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use gridwatch_db::RedbActivityStore;
use gridwatch_kernel::{InitCtx, Settings};

/// Router over freshly seeded in-memory stores, with `/metrics` exposed
pub async fn test_app() -> Router {
    let settings = Settings::default();
    let metrics = gridwatch_telemetry::install_recorder().expect("recorder");
    let store = RedbActivityStore::in_memory().expect("in-memory store");
    let registry = gridwatch_app::registry_with_store(Arc::new(store)).expect("registry");
    registry
        .init_all(&InitCtx {
            settings: &settings,
        })
        .await
        .expect("init modules");

    gridwatch_http::build_router(&registry, &settings, Some(metrics))
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// Value of the first exposition sample named `name` whose labels contain every `labels` entry
pub fn sample(exposition: &str, name: &str, labels: &[&str]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| {
            line.strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('{') || rest.starts_with(' '))
        })
        .find(|line| labels.iter().all(|label| line.contains(label)))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}
