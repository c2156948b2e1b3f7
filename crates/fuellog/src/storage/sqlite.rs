//! `SQLite`-backed key-value store.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use super::{migrations, Collection, KeyValueStore};
use crate::error::{Error, Result};

/// Key-value store persisted in a single `SQLite` database.
///
/// Every entry of the vehicle and user documents is one row of the
/// `documents` table, with the value kept as JSON text.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SqliteStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(Error::from)
    }

    fn put(&self, collection: Collection, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let updated_at = Utc::now().to_rfc3339();

        // Upsert keeps the original rowid, so listing order stays insertion order
        self.conn.execute(
            r"
            INSERT INTO documents (collection, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (collection, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![collection.as_str(), key, text, updated_at],
        )?;

        debug!("Stored {}/{}", collection, key);
        Ok(())
    }

    fn delete(&self, collection: Collection, key: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection.as_str(), key],
        )?;
        Ok(affected > 0)
    }

    fn keys(&self, collection: Collection) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM documents WHERE collection = ?1 ORDER BY rowid")?;

        let keys = stmt
            .query_map([collection.as_str()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(keys)
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
