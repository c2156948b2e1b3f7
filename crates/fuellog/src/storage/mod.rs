//! Storage layer for fuellog.
//!
//! All persisted state is two flat documents: vehicles keyed by plate
//! number, and users keyed by account id. Both live behind the
//! [`KeyValueStore`] trait so the backing mechanism can change without
//! touching the registry, trip log or workflow:
//!
//! - [`SqliteStore`]: one `SQLite` file (default)
//! - [`JsonFileStore`]: `cars.json` and `users.json` in a directory
//! - [`MemoryStore`]: in-process, for tests and throwaway sessions

mod json_file;
mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use serde_json::Value;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::error::Result;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A top-level document in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Vehicle identifier to consumption norms.
    Vehicles,
    /// User identifier to trip list.
    Users,
}

impl Collection {
    /// All collections, in a stable order.
    pub const ALL: [Self; 2] = [Self::Vehicles, Self::Users];

    /// Stable name used for tables rows and file names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal key-value contract used by every component that persists data.
///
/// Keys are returned in the backend's iteration order, which for all
/// bundled backends is insertion order.
pub trait KeyValueStore: std::fmt::Debug + Send {
    /// Human-readable description of where the data lives.
    fn location(&self) -> String;

    /// Read one value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>>;

    /// Insert or replace one value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn put(&self, collection: Collection, key: &str, value: &Value) -> Result<()>;

    /// Remove one value. Returns `false` when the key was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&self, collection: Collection, key: &str) -> Result<bool>;

    /// List every key of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self, collection: Collection) -> Result<Vec<String>>;

    /// Count the keys of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.keys(collection)?.len())
    }
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened or initialized.
pub fn open(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Sqlite => Box::new(SqliteStore::open(config.database_path())?),
        StorageBackend::Json => Box::new(JsonFileStore::open(config.data_dir())?),
    };
    info!("Using {} storage at {}", config.storage.backend, store.location());
    Ok(store)
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Where the data lives.
    pub location: String,
    /// Number of registered vehicles.
    pub vehicles: usize,
    /// Number of users with a trip log.
    pub users: usize,
}

impl StoreStats {
    /// Collect statistics from a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn collect(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            location: store.location(),
            vehicles: store.count(Collection::Vehicles)?,
            users: store.count(Collection::Users)?,
        })
    }
}
