use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use gridwatch_http::AppError;
use gridwatch_telemetry::{
    instruments::{ACTIVITY_OPERATIONS_TOTAL, ACTIVITY_OPERATION_DURATION_SECONDS},
    LatencyTimer,
};
use time::OffsetDateTime;

use super::models::{CreateActivity, DeviceActivity};
use super::repository::{ActivityRepository, RepositoryError, RepositoryResult};
use crate::utils::{generate_id, is_valid_id};

/// Record an activity; identifier, timestamp and headers come from the server side.
pub async fn create_activity(
    State(repository): State<Arc<ActivityRepository>>,
    headers: HeaderMap,
    payload: Result<Json<CreateActivity>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceActivity>), AppError> {
    let _latency = LatencyTimer::start(
        ACTIVITY_OPERATION_DURATION_SECONDS,
        &[("operation", "create")],
    );
    let Json(payload) = payload?;

    let mut activity = payload.into_activity(generate_id(), OffsetDateTime::now_utc());
    activity
        .set_headers(&capture_headers(&headers))
        .map_err(AppError::internal)?;

    let activity = offload(&repository, move |repo| repo.create(activity))
        .await?
        .map_err(AppError::internal)?;

    metrics::counter!(
        ACTIVITY_OPERATIONS_TOTAL,
        "operation" => "create",
        "grid" => activity.grid_name.clone(),
        "device" => activity.device_name.clone()
    )
    .increment(1);

    tracing::info!(
        unique_id = %activity.unique_id,
        device = %activity.device_name,
        grid = %activity.grid_name,
        "activity recorded"
    );
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn list_activities(
    State(repository): State<Arc<ActivityRepository>>,
) -> Result<Json<Vec<DeviceActivity>>, AppError> {
    offload(&repository, |repo| repo.get_all())
        .await?
        .map(Json)
        .map_err(AppError::internal)
}

pub async fn activities_by_device(
    State(repository): State<Arc<ActivityRepository>>,
    Path(device_name): Path<String>,
) -> Result<Json<Vec<DeviceActivity>>, AppError> {
    offload(&repository, move |repo| repo.get_by_device(&device_name))
        .await?
        .map(Json)
        .map_err(AppError::internal)
}

pub async fn activities_by_grid(
    State(repository): State<Arc<ActivityRepository>>,
    Path(grid_name): Path<String>,
) -> Result<Json<Vec<DeviceActivity>>, AppError> {
    offload(&repository, move |repo| repo.get_by_grid(&grid_name))
        .await?
        .map(Json)
        .map_err(AppError::internal)
}

/// Delete by `uniqueId`. Any repository failure is answered with 404.
pub async fn delete_activity(
    State(repository): State<Arc<ActivityRepository>>,
    Path(unique_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !is_valid_id(&unique_id) {
        return Err(AppError::validation("Invalid UUID format"));
    }

    let target = unique_id.clone();
    match offload(&repository, move |repo| repo.delete(&target)).await? {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RepositoryError::NotFound(_)) => Err(AppError::not_found("Activity not found")),
        Err(err) => {
            tracing::warn!(error = %err, %unique_id, "activity delete failed");
            Err(AppError::not_found(err.to_string()))
        }
    }
}

/// Run a repository call on the blocking pool; redb commits wait on the disk.
async fn offload<T, F>(
    repository: &Arc<ActivityRepository>,
    call: F,
) -> Result<RepositoryResult<T>, AppError>
where
    F: FnOnce(&ActivityRepository) -> RepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let repository = Arc::clone(repository);
    tokio::task::spawn_blocking(move || call(&repository))
        .await
        .map_err(AppError::internal)
}

/// First value of every request header, lossily decoded as UTF-8.
fn capture_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter_map(|name| {
            headers.get(name).map(|value| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
        })
        .collect()
}
