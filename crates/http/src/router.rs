//! Router builder for the gridwatch HTTP server

use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use gridwatch_telemetry::PrometheusHandle;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use crate::error::route_not_found;
use crate::middleware::track_http_metrics;

/// Builder for constructing the main HTTP router
///
/// Layers only wrap routes that exist when they are added, so mount every route
/// before calling the `with_*` middleware methods.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Mount API routes under `prefix`; an empty or `/` prefix mounts them at the root
    pub fn mount_api(mut self, prefix: &str, api_router: Router) -> Self {
        let prefix = prefix.trim_end_matches('/');
        self.router = if prefix.is_empty() {
            self.router.merge(api_router)
        } else {
            self.router.nest(prefix, api_router)
        };
        self
    }

    /// Merge routes that live at the server root
    pub fn merge(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    /// Expose the Prometheus text exposition at `/metrics`
    pub fn with_metrics_endpoint(mut self, handle: PrometheusHandle) -> Self {
        self.router = self
            .router
            .route("/metrics", get(move || async move { handle.render() }));
        self
    }

    /// Answer unmatched routes with the standard JSON error body
    pub fn with_fallback(mut self) -> Self {
        self.router = self.router.fallback(route_not_found);
        self
    }

    /// Count requests and record latency per matched route
    pub fn with_http_metrics(mut self) -> Self {
        self.router = self
            .router
            .layer(axum::middleware::from_fn(track_http_metrics));
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Time-ordered request ID generator
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_router_builder_basic() {
        let router = RouterBuilder::new()
            .merge(Router::new().route("/test", get(|| async { "test" })))
            .build();

        let response = router.oneshot(get_request("/test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_mounting_under_prefix() {
        let api = Router::new().route("/books", get(|| async { "books" }));
        let router = RouterBuilder::new().mount_api("/api/v1", api).build();

        let response = router
            .clone()
            .oneshot(get_request("/api/v1/books"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router.oneshot(get_request("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_prefix_merges_routes() {
        let api = Router::new().route("/books", get(|| async { "books" }));
        let router = RouterBuilder::new().mount_api("/", api).build();

        let response = router.oneshot(get_request("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let router = RouterBuilder::new()
            .merge(Router::new().route("/health", get(|| async { "ok" })))
            .with_fallback()
            .with_http_metrics()
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .build();

        let response = router.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .expect("request id header")
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(request_id).is_ok());

        let response = router.oneshot(get_request("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
