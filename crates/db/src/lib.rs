//! Embedded, indexed object store for device activities.
//!
//! Activities live in a single [`redb`] database with one record table and three index
//! tables: a unique index on `uniqueId` and equality indices on device and grid names.

pub mod error;
pub mod models;
pub mod store;

pub use error::{DbError, DbResult};
pub use models::DeviceActivity;
pub use store::{ActivityStore, RedbActivityStore};
