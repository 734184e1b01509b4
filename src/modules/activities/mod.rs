//! Device activity tracking, persisted in the embedded activity store.

pub mod handlers;
pub mod models;
pub mod repository;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{delete, get},
    Router,
};
use gridwatch_db::{ActivityStore, DeviceActivity};
use gridwatch_kernel::{InitCtx, Module};
use time::{Duration, OffsetDateTime};

use crate::utils::generate_id;
use handlers::{
    activities_by_device, activities_by_grid, create_activity, delete_activity, list_activities,
};
use repository::{ActivityRepository, RepositoryResult};

pub struct ActivitiesModule {
    repository: Arc<ActivityRepository>,
}

impl ActivitiesModule {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self {
            repository: Arc::new(ActivityRepository::new(store)),
        }
    }
}

#[async_trait]
impl Module for ActivitiesModule {
    fn name(&self) -> &'static str {
        "activities"
    }

    /// Seeds two sample activities into an empty store, then publishes the per-pair counts.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let repository = Arc::clone(&self.repository);
        let activities = tokio::task::spawn_blocking(move || seed(&repository)).await??;
        tracing::info!(module = self.name(), activities, "activities module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/activities", get(list_activities).post(create_activity))
            .route("/activities/device/{device}", get(activities_by_device))
            .route("/activities/grid/{grid}", get(activities_by_grid))
            .route("/activities/{id}", delete(delete_activity))
            .with_state(self.repository.clone())
    }
}

/// Write the samples into an empty store, publish per-pair counts, return the total.
fn seed(repository: &ActivityRepository) -> RepositoryResult<u64> {
    if repository.count()? == 0 {
        for activity in sample_activities(OffsetDateTime::now_utc()) {
            repository.create(activity)?;
        }
        tracing::info!("seeded sample activities");
    }
    repository.recalculate_activity_counts()?;
    repository.count()
}

fn sample_activities(now: OffsetDateTime) -> [DeviceActivity; 2] {
    [
        DeviceActivity {
            id: 0,
            unique_id: generate_id(),
            source_ip: "192.168.1.100".to_string(),
            device_name: "device-alpha".to_string(),
            grid_name: "grid-east".to_string(),
            action: "login".to_string(),
            headers: "{}".to_string(),
            timestamp: now - Duration::hours(1),
        },
        DeviceActivity {
            id: 0,
            unique_id: generate_id(),
            source_ip: "192.168.1.101".to_string(),
            device_name: "device-beta".to_string(),
            grid_name: "grid-west".to_string(),
            action: "data_sync".to_string(),
            headers: "{}".to_string(),
            timestamp: now - Duration::minutes(30),
        },
    ]
}

pub fn create_module(store: Arc<dyn ActivityStore>) -> Arc<dyn Module> {
    Arc::new(ActivitiesModule::new(store))
}
