//! Per-user trip log.
//!
//! Each user owns one document `{"trips": [...]}` in the users collection.
//! Records are only ever appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{Collection, KeyValueStore};

/// One completed trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Plate number of the vehicle.
    pub car: String,
    /// Odometer at departure.
    pub start_odometer: f64,
    /// Odometer at return.
    pub end_odometer: f64,
    /// Distance driven.
    pub km: f64,
    /// Kilometres driven in the city.
    pub city: f64,
    /// Kilometres driven on the highway.
    pub highway: f64,
    /// Kilometres driven in the district.
    pub district: f64,
    /// Hours spent idling.
    pub idle: f64,
    /// Fuel in the tank at departure.
    pub fuel_start: f64,
    /// Fuel added during the trip.
    #[serde(deserialize_with = "number_or_text")]
    pub refuel: f64,
    /// Fuel in the tank at return. May be negative.
    pub fuel_end: f64,
    /// Total fuel used.
    pub total_fuel: f64,
    /// When the trip was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Older logs stored the refuel amount as the typed text.
fn number_or_text<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid refuel amount {text:?}"))),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    trips: Vec<TripRecord>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// Trip log operations over a key-value store.
#[derive(Debug, Clone, Copy)]
pub struct TripLog<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> TripLog<'a> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Append a record to the user's log, creating the log if needed.
    ///
    /// Returns the number of trips now in the log.
    ///
    /// # Errors
    ///
    /// Returns a storage error, or [`Error::DocumentRead`] if the existing
    /// user document cannot be read as a trip log.
    pub fn append(&self, user_id: &str, record: TripRecord) -> Result<usize> {
        let mut document = self.load(user_id)?;
        document.trips.push(record);
        let count = document.trips.len();

        self.store
            .put(Collection::Users, user_id, &serde_json::to_value(&document)?)?;
        info!("Appended trip {} for user {}", count, user_id);
        Ok(count)
    }

    /// All trips of a user, oldest first. Unknown users have none.
    ///
    /// # Errors
    ///
    /// Returns a storage error or an unreadable user document.
    pub fn list(&self, user_id: &str) -> Result<Vec<TripRecord>> {
        Ok(self.load(user_id)?.trips)
    }

    /// Users that have a trip log.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn users(&self) -> Result<Vec<String>> {
        self.store.keys(Collection::Users)
    }

    fn load(&self, user_id: &str) -> Result<UserDocument> {
        match self.store.get(Collection::Users, user_id)? {
            Some(value) => serde_json::from_value(value).map_err(|e| Error::DocumentRead {
                path: format!("{}/{}", Collection::Users, user_id).into(),
                message: e.to_string(),
            }),
            None => Ok(UserDocument::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn record(car: &str, km: f64) -> TripRecord {
        TripRecord {
            car: car.to_string(),
            start_odometer: 1000.0,
            end_odometer: 1000.0 + km,
            km,
            city: km * 0.4,
            highway: km * 0.4,
            district: km * 0.2,
            idle: 2.0,
            fuel_start: 50.0,
            refuel: 0.0,
            fuel_end: -682.0,
            total_fuel: 732.0,
            recorded_at: None,
        }
    }

    #[test]
    fn test_append_creates_log() {
        let store = MemoryStore::new();
        let log = TripLog::new(&store);

        assert_eq!(log.append("42", record("X001", 100.0)).unwrap(), 1);
        assert_eq!(log.list("42").unwrap(), vec![record("X001", 100.0)]);
        assert_eq!(log.users().unwrap(), vec!["42"]);
    }

    #[test]
    fn test_append_grows_by_one_and_keeps_order() {
        let store = MemoryStore::new();
        let log = TripLog::new(&store);

        log.append("42", record("X001", 10.0)).unwrap();
        log.append("42", record("X002", 20.0)).unwrap();
        assert_eq!(log.append("42", record("X001", 30.0)).unwrap(), 3);

        let kms: Vec<f64> = log.list("42").unwrap().iter().map(|r| r.km).collect();
        assert_eq!(kms, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_users_are_separate() {
        let store = MemoryStore::new();
        let log = TripLog::new(&store);
        log.append("1", record("X001", 10.0)).unwrap();

        assert!(log.list("2").unwrap().is_empty());
    }

    #[test]
    fn test_document_shape() {
        let store = MemoryStore::new();
        TripLog::new(&store)
            .append("42", record("X001", 100.0))
            .unwrap();

        let doc = store.get(Collection::Users, "42").unwrap().unwrap();
        let trip = &doc["trips"][0];
        assert_eq!(trip["car"], json!("X001"));
        assert_eq!(trip["end_odometer"], json!(1100.0));
        assert_eq!(trip["fuel_end"], json!(-682.0));
        assert!(trip.get("recorded_at").is_none());
    }

    #[test]
    fn test_reads_text_refuel_and_keeps_extra_fields() {
        let store = MemoryStore::new();
        store
            .put(
                Collection::Users,
                "42",
                &json!({
                    "name": "driver",
                    "trips": [{
                        "car": "X001", "start_odometer": 1000.0, "end_odometer": 1100.0,
                        "km": 100.0, "city": 40.0, "highway": 40.0, "district": 20.0,
                        "idle": 2.0, "fuel_start": 50.0, "refuel": "20", "fuel_end": -662.0,
                        "total_fuel": 732.0
                    }]
                }),
            )
            .unwrap();

        let log = TripLog::new(&store);
        assert!((log.list("42").unwrap()[0].refuel - 20.0).abs() < f64::EPSILON);

        log.append("42", record("X002", 5.0)).unwrap();
        let doc = store.get(Collection::Users, "42").unwrap().unwrap();
        assert_eq!(doc["name"], json!("driver"));
        assert_eq!(doc["trips"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unreadable_log_is_not_overwritten() {
        let store = MemoryStore::new();
        store
            .put(Collection::Users, "42", &json!({"trips": "oops"}))
            .unwrap();

        let err = TripLog::new(&store)
            .append("42", record("X001", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));
        assert_eq!(
            store.get(Collection::Users, "42").unwrap(),
            Some(json!({"trips": "oops"}))
        );
    }

    #[test]
    fn test_recorded_at_roundtrip() {
        let mut rec = record("X001", 1.0);
        rec.recorded_at = Some(Utc::now());
        let value = serde_json::to_value(&rec).unwrap();
        let back: TripRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, rec);
    }
}
