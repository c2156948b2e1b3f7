//! Vehicle registry.
//!
//! Maps a plate number to the vehicle's four fuel-consumption norms. Norms
//! are kept exactly as the user typed them (trimmed) and only parsed when a
//! calculation needs them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::input;
use crate::storage::{Collection, KeyValueStore};

/// Format of a norm edit.
pub const NORMS_FORMAT: &str = "<city> <highway> <district> <idle>";

/// Format of a vehicle registration.
pub const VEHICLE_FORMAT: &str = "<number> <city> <highway> <district> <idle>";

/// Plate numbers whose buttons would read as a menu entry
/// (`view_car_menu`, `add_trip_menu`).
pub const RESERVED_IDS: [&str; 1] = ["menu"];

/// Fuel-consumption norms of one vehicle, as decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Norms {
    /// Consumption rate in the city.
    pub city: String,
    /// Consumption rate on the highway.
    pub highway: String,
    /// Consumption rate in the district.
    pub district: String,
    /// Consumption rate per idle hour.
    pub idle: String,
}

impl Norms {
    /// Build norms from four pieces of text, rejecting anything that is not
    /// a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first bad value.
    pub fn parse(city: &str, highway: &str, district: &str, idle: &str) -> Result<Self> {
        let norms = Self {
            city: city.trim().to_string(),
            highway: highway.trim().to_string(),
            district: district.trim().to_string(),
            idle: idle.trim().to_string(),
        };
        norms.validate()?;
        Ok(norms)
    }

    /// Parse a `<city> <highway> <district> <idle>` line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] on wrong arity or a non-numeric value.
    pub fn parse_line(text: &str) -> Result<Self> {
        let [city, highway, district, idle] = input::split_exact::<4>(text, NORMS_FORMAT)?;
        Self::parse(city, highway, district, idle)
    }

    /// Check that every norm is a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        for (_, text) in self.fields() {
            if !input::is_amount(text) {
                return Err(Error::invalid_input(NORMS_FORMAT, text.clone()));
            }
        }
        Ok(())
    }

    /// The four norms with their names, in canonical order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &String); 4] {
        [
            ("city", &self.city),
            ("highway", &self.highway),
            ("district", &self.district),
            ("idle", &self.idle),
        ]
    }
}

/// A registered vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    /// Plate number.
    pub id: String,
    /// Consumption norms.
    pub norms: Norms,
}

/// Parse a `<number> <city> <highway> <district> <idle>` registration line.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] on wrong arity or a non-numeric norm.
pub fn parse_registration(text: &str) -> Result<Vehicle> {
    let [id, city, highway, district, idle] = input::split_exact::<5>(text, VEHICLE_FORMAT)?;
    Ok(Vehicle {
        id: id.to_string(),
        norms: Norms::parse(city, highway, district, idle)?,
    })
}

/// Registry operations over a key-value store.
#[derive(Debug, Clone, Copy)]
pub struct VehicleRegistry<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> VehicleRegistry<'a> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Register a new vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank id or invalid norms,
    /// [`Error::DuplicateVehicle`] if the id is taken, or a storage error.
    pub fn register(&self, id: &str, norms: Norms) -> Result<Vehicle> {
        validate_id(id)?;
        norms.validate()?;

        if self.store.get(Collection::Vehicles, id)?.is_some() {
            debug!("Rejected duplicate vehicle {}", id);
            return Err(Error::DuplicateVehicle { id: id.to_string() });
        }

        self.store
            .put(Collection::Vehicles, id, &serde_json::to_value(&norms)?)?;
        info!("Registered vehicle {}", id);
        Ok(Vehicle {
            id: id.to_string(),
            norms,
        })
    }

    /// Look up a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VehicleNotFound`] if absent, [`Error::InvalidNorms`]
    /// if the stored entry lacks a norm, or a storage error.
    pub fn get(&self, id: &str) -> Result<Vehicle> {
        let value = self
            .store
            .get(Collection::Vehicles, id)?
            .ok_or_else(|| Error::vehicle_not_found(id))?;
        Ok(Vehicle {
            id: id.to_string(),
            norms: decode_norms(id, value)?,
        })
    }

    /// Check whether a vehicle is registered.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.store.get(Collection::Vehicles, id)?.is_some())
    }

    /// Replace all four norms of an existing vehicle.
    ///
    /// Nothing is written unless every norm is valid and the vehicle exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`], [`Error::VehicleNotFound`] or a
    /// storage error.
    pub fn update(&self, id: &str, norms: Norms) -> Result<Vehicle> {
        norms.validate()?;
        if !self.contains(id)? {
            return Err(Error::vehicle_not_found(id));
        }

        self.store
            .put(Collection::Vehicles, id, &serde_json::to_value(&norms)?)?;
        info!("Updated norms of vehicle {}", id);
        Ok(Vehicle {
            id: id.to_string(),
            norms,
        })
    }

    /// Remove a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VehicleNotFound`] if absent, or a storage error.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(Collection::Vehicles, id)? {
            return Err(Error::vehicle_not_found(id));
        }
        info!("Deleted vehicle {}", id);
        Ok(())
    }

    /// All registered plate numbers, in storage order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.keys(Collection::Vehicles)
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(Error::invalid_input(
            "a vehicle number without spaces",
            id.to_string(),
        ));
    }
    if RESERVED_IDS.contains(&id) {
        return Err(Error::invalid_input(
            "a vehicle number other than a menu name",
            id.to_string(),
        ));
    }
    Ok(())
}

fn decode_norms(id: &str, value: Value) -> Result<Norms> {
    serde_json::from_value(value).map_err(|e| Error::invalid_norms(id, e.to_string()))
}
