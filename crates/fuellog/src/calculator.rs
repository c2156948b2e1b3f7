//! Fuel consumption from norms and a distance breakdown.
//!
//! Each segment consumes `distance * norm` (idle: `hours * norm`). Segment
//! results and the total are rounded to two decimals independently; the
//! total is rounded from the unrounded sum, so it can differ from the sum of
//! the rounded segments by a cent.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::registry::Vehicle;

/// Distances and idle time of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Segments {
    /// Kilometres driven in the city.
    pub city_km: f64,
    /// Kilometres driven on the highway.
    pub highway_km: f64,
    /// Kilometres driven in the district.
    pub district_km: f64,
    /// Hours spent idling.
    pub idle_hours: f64,
}

impl Segments {
    /// Sum of the three distance segments.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.city_km + self.highway_km + self.district_km
    }
}

/// Fuel used per segment and in total, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FuelBreakdown {
    /// Fuel used in the city.
    pub city: f64,
    /// Fuel used on the highway.
    pub highway: f64,
    /// Fuel used in the district.
    pub district: f64,
    /// Fuel used idling.
    pub idle: f64,
    /// Total fuel used.
    pub total: f64,
}

/// Round to two decimals.
///
/// Rounds the exact binary value of `value`, with ties going to the even
/// digit: `0.125` becomes `0.12` and `2.675` (stored just below) `2.67`.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Compute fuel usage of `segments` under the norms of `vehicle`.
///
/// # Errors
///
/// Returns [`Error::InvalidNorms`] if a stored norm is not a non-negative
/// number.
pub fn calculate(vehicle: &Vehicle, segments: &Segments) -> Result<FuelBreakdown> {
    let [city, highway, district, idle] = rates(vehicle)?;

    let raw = [
        segments.city_km * city,
        segments.highway_km * highway,
        segments.district_km * district,
        segments.idle_hours * idle,
    ];

    Ok(FuelBreakdown {
        city: round2(raw[0]),
        highway: round2(raw[1]),
        district: round2(raw[2]),
        idle: round2(raw[3]),
        total: round2(raw.iter().sum()),
    })
}

fn rates(vehicle: &Vehicle) -> Result<[f64; 4]> {
    let mut rates = [0.0; 4];
    for (rate, (name, text)) in rates.iter_mut().zip(vehicle.norms.fields()) {
        *rate = match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                return Err(Error::invalid_norms(
                    vehicle.id.clone(),
                    format!("{name} norm {text:?} is not a non-negative number"),
                ))
            }
        };
    }
    Ok(rates)
}
