//! HTTP server facade for gridwatch with Axum, error handling, and metrics exposition.

use anyhow::Context;
use axum::Router;

use gridwatch_kernel::{settings::Settings, ModuleRegistry};
use gridwatch_telemetry::PrometheusHandle;

pub mod error;
pub mod middleware;
pub mod router;

pub use error::AppError;
use router::RouterBuilder;

/// Start the HTTP server with the given module registry and serve until Ctrl-C
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &Settings,
    metrics: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    tracing::info!(
        "starting HTTP server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let app = build_router(registry, settings, metrics);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
///
/// Module API routes are nested under `settings.server.api_prefix`; public routes and
/// `/metrics` (when a handle is given) live at the root.
pub fn build_router(
    registry: &ModuleRegistry,
    settings: &Settings,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let mut api = Router::new();
    let mut router_builder = RouterBuilder::new();

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under {}",
            settings.server.api_prefix
        );
        api = api.merge(module.routes());
        router_builder = router_builder.merge(module.public_routes());
    }

    router_builder = router_builder.mount_api(&settings.server.api_prefix, api);

    if let Some(handle) = metrics {
        router_builder = router_builder.with_metrics_endpoint(handle);
    }

    // Global middlewares wrap everything mounted above.
    router_builder
        .with_fallback()
        .with_http_metrics()
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
