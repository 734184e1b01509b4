use std::path::Path;

use gridwatch_kernel::settings::DatabaseSettings;
use redb::backends::InMemoryBackend;
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable,
    ReadableTableMetadata, TableDefinition,
};

use crate::error::{DbError, DbResult};
use crate::models::DeviceActivity;

/// Records keyed by surrogate id; values are JSON-encoded [`DeviceActivity`].
const ACTIVITIES: TableDefinition<u64, &[u8]> = TableDefinition::new("activities");

/// Unique index: `uniqueId` -> surrogate id.
const BY_UNIQUE_ID: TableDefinition<&str, u64> = TableDefinition::new("activities_by_unique_id");

/// Equality index: device name -> surrogate ids.
const BY_DEVICE: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("activities_by_device");

/// Equality index: grid name -> surrogate ids.
const BY_GRID: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("activities_by_grid");

/// Store bookkeeping; holds the next surrogate key under [`NEXT_ID`].
const META: TableDefinition<&str, u64> = TableDefinition::new("activities_meta");

const NEXT_ID: &str = "next_id";

/// Storage operations the activity repository relies on.
pub trait ActivityStore: Send + Sync {
    /// Persist a new activity and return its assigned surrogate key.
    ///
    /// Fails with [`DbError::UniqueViolation`] if `unique_id` is already stored.
    fn put(&self, activity: &DeviceActivity) -> DbResult<u64>;

    fn get_all(&self) -> DbResult<Vec<DeviceActivity>>;

    fn find_by_device(&self, device_name: &str) -> DbResult<Vec<DeviceActivity>>;

    fn find_by_grid(&self, grid_name: &str) -> DbResult<Vec<DeviceActivity>>;

    fn find_by_unique_id(&self, unique_id: &str) -> DbResult<Option<DeviceActivity>>;

    /// Remove the activity carrying `unique_id` and return it; `None` when nothing matched.
    ///
    /// Lookup and removal happen in one write transaction.
    fn remove_by_unique_id(&self, unique_id: &str) -> DbResult<Option<DeviceActivity>>;

    fn count(&self) -> DbResult<u64>;
}

/// [`ActivityStore`] backed by an embedded redb database.
pub struct RedbActivityStore {
    db: Database,
}

impl RedbActivityStore {
    /// Open (or create) a file-backed store, creating parent directories as needed.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        tracing::info!(target: "gridwatch-db", path = %path.display(), "activity store opened");
        Self::with_database(db)
    }

    /// Open a store that lives only in memory.
    pub fn in_memory() -> DbResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_database(db)
    }

    /// Open the store described by the database settings.
    pub fn from_settings(settings: &DatabaseSettings) -> DbResult<Self> {
        if settings.in_memory {
            Self::in_memory()
        } else {
            Self::open(&settings.path)
        }
    }

    fn with_database(db: Database) -> DbResult<Self> {
        // Create every table up front so read transactions never hit a missing table.
        let txn = db.begin_write()?;
        {
            txn.open_table(ACTIVITIES)?;
            txn.open_table(BY_UNIQUE_ID)?;
            txn.open_multimap_table(BY_DEVICE)?;
            txn.open_multimap_table(BY_GRID)?;
            txn.open_table(META)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    fn find_by_index(
        &self,
        index: MultimapTableDefinition<'static, &'static str, u64>,
        key: &str,
    ) -> DbResult<Vec<DeviceActivity>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_multimap_table(index)?;
        let records = txn.open_table(ACTIVITIES)?;

        let mut activities = Vec::new();
        for id in index.get(key)? {
            let id = id?.value();
            if let Some(bytes) = records.get(id)? {
                activities.push(decode(id, bytes.value())?);
            }
        }
        Ok(activities)
    }
}

fn decode(id: u64, bytes: &[u8]) -> DbResult<DeviceActivity> {
    let mut activity: DeviceActivity = serde_json::from_slice(bytes)?;
    activity.id = id;
    Ok(activity)
}

impl ActivityStore for RedbActivityStore {
    fn put(&self, activity: &DeviceActivity) -> DbResult<u64> {
        let bytes = serde_json::to_vec(activity)?;
        let txn = self.db.begin_write()?;
        let id = {
            let mut records = txn.open_table(ACTIVITIES)?;
            let mut unique = txn.open_table(BY_UNIQUE_ID)?;
            let mut by_device = txn.open_multimap_table(BY_DEVICE)?;
            let mut by_grid = txn.open_multimap_table(BY_GRID)?;
            let mut meta = txn.open_table(META)?;

            if unique.get(activity.unique_id.as_str())?.is_some() {
                return Err(DbError::UniqueViolation(activity.unique_id.clone()));
            }

            // Keys are never handed out twice, even after the newest record is removed.
            let stored_next = meta.get(NEXT_ID)?.map(|next| next.value());
            let id = match stored_next {
                Some(next) => next,
                None => match records.last()? {
                    Some((key, _)) => key.value() + 1,
                    None => 1,
                },
            };

            meta.insert(NEXT_ID, id + 1)?;
            records.insert(id, bytes.as_slice())?;
            unique.insert(activity.unique_id.as_str(), id)?;
            by_device.insert(activity.device_name.as_str(), id)?;
            by_grid.insert(activity.grid_name.as_str(), id)?;
            id
        };
        txn.commit()?;
        Ok(id)
    }

    fn get_all(&self) -> DbResult<Vec<DeviceActivity>> {
        let txn = self.db.begin_read()?;
        let records = txn.open_table(ACTIVITIES)?;

        let mut activities = Vec::new();
        for entry in records.iter()? {
            let (key, value) = entry?;
            activities.push(decode(key.value(), value.value())?);
        }
        Ok(activities)
    }

    fn find_by_device(&self, device_name: &str) -> DbResult<Vec<DeviceActivity>> {
        self.find_by_index(BY_DEVICE, device_name)
    }

    fn find_by_grid(&self, grid_name: &str) -> DbResult<Vec<DeviceActivity>> {
        self.find_by_index(BY_GRID, grid_name)
    }

    fn find_by_unique_id(&self, unique_id: &str) -> DbResult<Option<DeviceActivity>> {
        let txn = self.db.begin_read()?;
        let unique = txn.open_table(BY_UNIQUE_ID)?;
        let records = txn.open_table(ACTIVITIES)?;

        let id = match unique.get(unique_id)? {
            Some(id) => id.value(),
            None => return Ok(None),
        };
        match records.get(id)? {
            Some(bytes) => Ok(Some(decode(id, bytes.value())?)),
            None => Ok(None),
        }
    }

    fn remove_by_unique_id(&self, unique_id: &str) -> DbResult<Option<DeviceActivity>> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut unique = txn.open_table(BY_UNIQUE_ID)?;
            let id = unique.remove(unique_id)?.map(|id| id.value());

            match id {
                Some(id) => {
                    let mut records = txn.open_table(ACTIVITIES)?;
                    let existing = match records.remove(id)? {
                        Some(bytes) => Some(decode(id, bytes.value())?),
                        None => None,
                    };
                    if let Some(activity) = &existing {
                        let mut by_device = txn.open_multimap_table(BY_DEVICE)?;
                        let mut by_grid = txn.open_multimap_table(BY_GRID)?;
                        by_device.remove(activity.device_name.as_str(), id)?;
                        by_grid.remove(activity.grid_name.as_str(), id)?;
                    }
                    existing
                }
                None => None,
            }
        };
        txn.commit()?;
        Ok(removed)
    }

    fn count(&self) -> DbResult<u64> {
        let txn = self.db.begin_read()?;
        let records = txn.open_table(ACTIVITIES)?;
        Ok(records.len()?)
    }
}
