//! Activity repository: the activity store plus operation metrics.
//!
//! Every operation records its duration in `store_operation_duration_seconds` on every
//! exit path, and counts itself in `store_operations_total` only when it succeeds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gridwatch_db::{ActivityStore, DbError, DeviceActivity};
use gridwatch_telemetry::instruments::{
    ACTIVITY_COUNT, STORE_ENTITY_COUNT, STORE_OPERATIONS_TOTAL, STORE_OPERATION_DURATION_SECONDS,
};
use gridwatch_telemetry::LatencyTimer;
use thiserror::Error;

const ENTITY: &str = "activity";

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No stored activity carries the requested `uniqueId`
    #[error("activity '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

type PairCounts = HashMap<(String, String), u64>;

pub struct ActivityRepository {
    store: Arc<dyn ActivityStore>,
    /// Last published `activity_count` per `(grid, device)`
    counts: Mutex<PairCounts>,
}

impl ActivityRepository {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        let repository = Self {
            store,
            counts: Mutex::new(HashMap::new()),
        };
        repository.refresh_entity_count();
        repository
    }

    /// Persist an activity and return it with its storage key filled in.
    pub fn create(&self, activity: DeviceActivity) -> RepositoryResult<DeviceActivity> {
        let _timer = timer("create");
        let id = self.store.put(&activity)?;
        record_success("create");
        self.refresh_entity_count();
        self.adjust_activity_count(&activity, CountChange::Added);
        Ok(DeviceActivity { id, ..activity })
    }

    pub fn get_all(&self) -> RepositoryResult<Vec<DeviceActivity>> {
        let _timer = timer("get_all");
        let activities = self.store.get_all()?;
        record_success("get_all");
        Ok(activities)
    }

    pub fn get_by_grid(&self, grid_name: &str) -> RepositoryResult<Vec<DeviceActivity>> {
        let _timer = timer("get_by_grid");
        let activities = self.store.find_by_grid(grid_name)?;
        record_success("get_by_grid");
        Ok(activities)
    }

    pub fn get_by_device(&self, device_name: &str) -> RepositoryResult<Vec<DeviceActivity>> {
        let _timer = timer("get_by_device");
        let activities = self.store.find_by_device(device_name)?;
        record_success("get_by_device");
        Ok(activities)
    }

    /// Delete the activity with the given external identifier.
    ///
    /// A `uniqueId` with no stored activity is reported as [`RepositoryError::NotFound`].
    pub fn delete(&self, unique_id: &str) -> RepositoryResult<()> {
        let _timer = timer("delete");
        let removed = self
            .store
            .remove_by_unique_id(unique_id)?
            .ok_or_else(|| RepositoryError::NotFound(unique_id.to_string()))?;

        record_success("delete");
        self.refresh_entity_count();
        self.adjust_activity_count(&removed, CountChange::Removed);
        Ok(())
    }

    pub fn count(&self) -> RepositoryResult<u64> {
        Ok(self.store.count()?)
    }

    /// Republish `activity_count{grid,device}` from a full scan of the store.
    ///
    /// Pairs that no longer have any activity are reset to zero. The scan is not counted
    /// as a store operation.
    pub fn recalculate_activity_counts(&self) -> RepositoryResult<()> {
        let mut scanned = PairCounts::new();
        for activity in self.store.get_all()? {
            *scanned
                .entry((activity.grid_name, activity.device_name))
                .or_default() += 1;
        }

        let mut counts = self.lock_counts();
        for (pair, count) in counts.iter_mut() {
            if !scanned.contains_key(pair) {
                *count = 0;
                publish_count(pair, 0);
            }
        }
        for (pair, count) in scanned {
            publish_count(&pair, count);
            counts.insert(pair, count);
        }
        Ok(())
    }

    #[cfg(test)]
    fn activity_count(&self, grid_name: &str, device_name: &str) -> u64 {
        self.lock_counts()
            .get(&(grid_name.to_string(), device_name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn adjust_activity_count(&self, activity: &DeviceActivity, change: CountChange) {
        let pair = (activity.grid_name.clone(), activity.device_name.clone());
        let mut counts = self.lock_counts();
        let count = counts.entry(pair.clone()).or_default();
        *count = match change {
            CountChange::Added => *count + 1,
            CountChange::Removed => count.saturating_sub(1),
        };
        // Publish while holding the lock so the gauge follows write order.
        publish_count(&pair, *count);
    }

    fn lock_counts(&self) -> std::sync::MutexGuard<'_, PairCounts> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refresh_entity_count(&self) {
        match self.store.count() {
            Ok(count) => {
                metrics::gauge!(STORE_ENTITY_COUNT, "entity" => ENTITY).set(count as f64);
            }
            Err(err) => {
                tracing::warn!(error = %err, entity = ENTITY, "failed to refresh entity count");
            }
        }
    }
}

enum CountChange {
    Added,
    Removed,
}

fn publish_count((grid, device): &(String, String), count: u64) {
    metrics::gauge!(ACTIVITY_COUNT, "grid" => grid.clone(), "device" => device.clone())
        .set(count as f64);
}

fn timer(operation: &'static str) -> LatencyTimer {
    LatencyTimer::start(
        STORE_OPERATION_DURATION_SECONDS,
        &[("operation", operation), ("entity", ENTITY)],
    )
}

fn record_success(operation: &'static str) {
    metrics::counter!(STORE_OPERATIONS_TOTAL, "operation" => operation, "entity" => ENTITY)
        .increment(1);
}
