//! Liveness endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use gridwatch_kernel::Module;
use serde_json::{json, Value};

pub const HEALTH_PATH: &str = "/health";

pub struct HealthModule;

#[async_trait]
impl Module for HealthModule {
    fn name(&self) -> &'static str {
        "health"
    }

    /// `{prefix}/health` permanently redirects to the root health check.
    fn routes(&self) -> Router {
        Router::new().route(HEALTH_PATH, get(redirect_to_health))
    }

    fn public_routes(&self) -> Router {
        Router::new().route(HEALTH_PATH, get(health))
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn redirect_to_health() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, HEALTH_PATH)])
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(HealthModule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_ok() {
        let response = HealthModule
            .public_routes()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "OK" }));
    }

    #[tokio::test]
    async fn prefixed_health_redirects_permanently() {
        let response = HealthModule
            .routes()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/health");
    }
}
