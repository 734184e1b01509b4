//! Usage statistics API.
//!
//! Every handler counts itself in `stats_operations_total` through a [`ScopedCounter`],
//! so validation failures and not-found answers are counted as well.

pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use gridwatch_http::AppError;
use gridwatch_kernel::{InitCtx, Module};
use gridwatch_telemetry::{instruments::STATS_OPERATIONS_TOTAL, ScopedCounter};

use crate::utils::is_valid_id;
use models::{CreateStats, UsageStats};
use store::StatsStore;

pub struct StatsModule {
    store: Arc<StatsStore>,
}

impl StatsModule {
    pub fn new(store: Arc<StatsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for StatsModule {
    fn name(&self) -> &'static str {
        "stats"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let records = self.store.len().await;
        tracing::info!(module = self.name(), records, "stats module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/stats", get(list_stats).post(create_stats))
            .route(
                "/stats/endpoints/{endpoint}",
                get(stats_by_endpoint).delete(delete_stats_by_endpoint),
            )
            .route("/stats/{id}", delete(delete_stats))
            .with_state(self.store.clone())
    }
}

fn operation(name: &'static str) -> ScopedCounter {
    ScopedCounter::new(STATS_OPERATIONS_TOTAL, &[("operation", name)])
}

async fn create_stats(
    State(store): State<Arc<StatsStore>>,
    payload: Result<Json<CreateStats>, JsonRejection>,
) -> Result<(StatusCode, Json<UsageStats>), AppError> {
    let _op = operation("create");
    let Json(payload) = payload?;
    let record = store.insert(payload).await;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_stats(State(store): State<Arc<StatsStore>>) -> Json<Vec<UsageStats>> {
    let _op = operation("list");
    Json(store.list().await)
}

/// `endpoint` arrives percent-decoded, so `%2Fhealth` matches records for `/health`
async fn stats_by_endpoint(
    State(store): State<Arc<StatsStore>>,
    Path(endpoint): Path<String>,
) -> Json<Vec<UsageStats>> {
    let _op = operation("get_by_endpoint");
    Json(store.by_endpoint(&endpoint).await)
}

async fn delete_stats_by_endpoint(
    State(store): State<Arc<StatsStore>>,
    Path(endpoint): Path<String>,
) -> Result<StatusCode, AppError> {
    let _op = operation("delete_by_endpoint");
    match store.remove_by_endpoint(&endpoint).await {
        0 => Err(AppError::not_found("No stats found for endpoint")),
        removed => {
            tracing::info!(%endpoint, removed, "stats removed for endpoint");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

async fn delete_stats(
    State(store): State<Arc<StatsStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _op = operation("delete");
    if !is_valid_id(&id) {
        return Err(AppError::validation("Invalid UUID format"));
    }
    match store.remove(&id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::not_found("Stats not found")),
    }
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(StatsModule::new(Arc::new(StatsStore::with_samples())))
}
