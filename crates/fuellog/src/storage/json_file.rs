//! Key-value store backed by flat JSON documents.
//!
//! Each collection is one pretty-printed file (`cars.json` for vehicles,
//! `users.json` for trip logs). Every call reads the whole document; every mutation
//! rewrites it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Collection, KeyValueStore};
use crate::error::{Error, Result};

/// Store keeping each collection as a JSON object in its own file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` as the document directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { dir })
    }

    /// Path of the document holding `collection`.
    #[must_use]
    pub fn document_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(file_name(collection))
    }

    fn load(&self, collection: Collection) -> Result<Map<String, Value>> {
        let path = self.document_path(collection);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(Error::DocumentRead {
                    path,
                    message: e.to_string(),
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::DocumentRead {
                path,
                message: "top-level value is not an object".to_string(),
            }),
            Err(e) => Err(Error::DocumentRead {
                path,
                message: e.to_string(),
            }),
        }
    }

    fn save(&self, collection: Collection, map: &Map<String, Value>) -> Result<()> {
        let path = self.document_path(collection);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        map.serialize(&mut ser)?;

        // Write next to the target and rename over it
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &buf).map_err(|source| Error::DocumentWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| Error::DocumentWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Saved {} ({} entries)", path.display(), map.len());
        Ok(())
    }
}

fn file_name(collection: Collection) -> &'static str {
    match collection {
        Collection::Vehicles => "cars.json",
        Collection::Users => "users.json",
    }
}

impl KeyValueStore for JsonFileStore {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        Ok(self.load(collection)?.remove(key))
    }

    fn put(&self, collection: Collection, key: &str, value: &Value) -> Result<()> {
        let mut map = self.load(collection)?;
        map.insert(key.to_string(), value.clone());
        self.save(collection, &map)
    }

    fn delete(&self, collection: Collection, key: &str) -> Result<bool> {
        let mut map = self.load(collection)?;
        if map.shift_remove(key).is_none() {
            return Ok(false);
        }
        self.save(collection, &map)?;
        Ok(true)
    }

    fn keys(&self, collection: Collection) -> Result<Vec<String>> {
        Ok(self.load(collection)?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Action, Assistant};
    use crate::config::WorkflowConfig;
    use crate::session::SessionId;
    use serde_json::json;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fuellog_json_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_document_is_empty() {
        let dir = temp_dir("missing");
        let store = JsonFileStore::open(&dir).unwrap();

        assert!(store.keys(Collection::Vehicles).unwrap().is_empty());
        assert!(store.get(Collection::Users, "1").unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_put_writes_pretty_document() {
        let dir = temp_dir("pretty");
        let store = JsonFileStore::open(&dir).unwrap();
        store
            .put(Collection::Vehicles, "А123ВМ", &json!({"city": "8.5"}))
            .unwrap();

        let text = std::fs::read_to_string(store.document_path(Collection::Vehicles)).unwrap();
        assert!(text.contains("А123ВМ"), "non-ASCII keys are written verbatim");
        assert!(text.contains("\n    \"А123ВМ\""));
        assert_eq!(store.document_path(Collection::Vehicles), dir.join("cars.json"));
        assert!(!dir.join("cars.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_roundtrip_and_order() {
        let dir = temp_dir("order");
        let store = JsonFileStore::open(&dir).unwrap();
        store.put(Collection::Vehicles, "Z9", &json!(1)).unwrap();
        store.put(Collection::Vehicles, "A1", &json!(2)).unwrap();
        store.put(Collection::Vehicles, "M5", &json!(3)).unwrap();
        assert!(store.delete(Collection::Vehicles, "A1").unwrap());

        let reopened = JsonFileStore::open(&dir).unwrap();
        assert_eq!(reopened.keys(Collection::Vehicles).unwrap(), vec!["Z9", "M5"]);
        assert_eq!(
            reopened.get(Collection::Vehicles, "M5").unwrap(),
            Some(json!(3))
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_delete_missing_does_not_create_file() {
        let dir = temp_dir("delete_missing");
        let store = JsonFileStore::open(&dir).unwrap();

        assert!(!store.delete(Collection::Vehicles, "nope").unwrap());
        assert!(!store.document_path(Collection::Vehicles).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let dir = temp_dir("empty_file");
        let store = JsonFileStore::open(&dir).unwrap();
        std::fs::write(store.document_path(Collection::Users), "  \n").unwrap();

        assert_eq!(store.count(Collection::Users).unwrap(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = temp_dir("corrupt");
        let store = JsonFileStore::open(&dir).unwrap();
        std::fs::write(store.document_path(Collection::Users), "{ not json").unwrap();

        let err = store.keys(Collection::Users).unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));

        // A failed read must not be followed by a write that loses data
        assert!(store
            .put(Collection::Users, "1", &json!({"trips": []}))
            .is_err());
        let text = std::fs::read_to_string(store.document_path(Collection::Users)).unwrap();
        assert_eq!(text, "{ not json");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_non_object_document_is_an_error() {
        let dir = temp_dir("array");
        let store = JsonFileStore::open(&dir).unwrap();
        std::fs::write(store.document_path(Collection::Vehicles), "[1, 2]").unwrap();

        assert!(store.get(Collection::Vehicles, "1").is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_conversation_documents_on_disk() {
        let dir = temp_dir("conversation");
        let store = JsonFileStore::open(&dir).unwrap();
        let mut assistant = Assistant::new(Box::new(store.clone()), &WorkflowConfig::default());
        let session = SessionId::new("chat-1");

        let mut send = |action: Action| {
            let _ = assistant.handle(&session, "7", action);
        };
        send(Action::AddVehicle);
        send(Action::Text("X001 8.5 6.2 7.1 1.0".into()));
        send(Action::AddTrip { id: "X001".into() });
        for answer in ["1000", "100", "40 40 20", "2", "50", "30"] {
            send(Action::Text(answer.into()));
        }

        let read = |name: &str| -> Value {
            serde_json::from_str(&std::fs::read_to_string(dir.join(name)).unwrap()).unwrap()
        };

        assert_eq!(
            read("cars.json"),
            json!({"X001": {"city": "8.5", "highway": "6.2", "district": "7.1", "idle": "1.0"}})
        );

        let users = read("users.json");
        let trips = users["7"]["trips"].as_array().unwrap();
        assert_eq!(trips.len(), 1);
        let trip = &trips[0];
        assert_eq!(trip["car"], json!("X001"));
        assert_eq!(trip["start_odometer"], json!(1000.0));
        assert_eq!(trip["end_odometer"], json!(1100.0));
        assert_eq!(trip["km"], json!(100.0));
        assert_eq!(trip["city"], json!(40.0));
        assert_eq!(trip["highway"], json!(40.0));
        assert_eq!(trip["district"], json!(20.0));
        assert_eq!(trip["idle"], json!(2.0));
        assert_eq!(trip["fuel_start"], json!(50.0));
        assert_eq!(trip["refuel"], json!(30.0));
        assert_eq!(trip["total_fuel"], json!(732.0));
        assert_eq!(trip["fuel_end"], json!(-652.0));
        assert!(trip["recorded_at"].is_string());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
