//! Trip entry as a step-by-step workflow.
//!
//! A [`TripSession`] collects the trip fields one answer at a time. Every
//! transition parses its input first and only then touches the session, so a
//! rejected answer leaves the session exactly as it was and the same step is
//! asked again.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::calculator::{self, FuelBreakdown, Segments};
use crate::error::{Error, Result};
use crate::input;
use crate::registry::{Vehicle, VehicleRegistry};
use crate::trips::{TripLog, TripRecord};

/// Format of the distance breakdown answer.
pub const DISTRIBUTION_FORMAT: &str = "<city_km> <highway_km> <district_km>";

/// The question a trip session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStep {
    /// Odometer reading at departure.
    StartOdometer,
    /// Total distance driven.
    Km,
    /// City, highway and district kilometres.
    Distribution,
    /// Idle hours.
    Idle,
    /// Fuel in the tank at departure.
    FuelStart,
    /// Fuel added on the way.
    Refuel,
}

impl TripStep {
    /// Steps in the order they are asked.
    pub const ORDER: [Self; 6] = [
        Self::StartOdometer,
        Self::Km,
        Self::Distribution,
        Self::Idle,
        Self::FuelStart,
        Self::Refuel,
    ];

    /// Stable name of the step.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartOdometer => "start_odometer",
            Self::Km => "km",
            Self::Distribution => "distribution",
            Self::Idle => "idle",
            Self::FuelStart => "fuel_start",
            Self::Refuel => "refuel",
        }
    }

    /// The step that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let pos = Self::ORDER.iter().position(|s| *s == self)?;
        Self::ORDER.get(pos + 1).copied()
    }
}

impl std::fmt::Display for TripStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trip in progress for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSession {
    vehicle_id: String,
    step: TripStep,
    start_odometer: Option<f64>,
    km: Option<f64>,
    segments: Option<(f64, f64, f64)>,
    idle_hours: Option<f64>,
    fuel_start: Option<f64>,
    refuel: Option<f64>,
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The session moved on and now waits for this step.
    Next(TripStep),
    /// Every field is known; the trip can be finalized.
    Ready(TripInput),
}

/// All answers of a trip session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripInput {
    /// Plate number of the vehicle.
    pub vehicle_id: String,
    /// Odometer at departure.
    pub start_odometer: f64,
    /// Distance driven.
    pub km: f64,
    /// Distance breakdown and idle time.
    pub segments: Segments,
    /// Fuel at departure.
    pub fuel_start: f64,
    /// Fuel added.
    pub refuel: f64,
}

/// Outcome of a finalized trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    /// The vehicle, with the norms used.
    pub vehicle: Vehicle,
    /// Fuel used per segment.
    pub fuel: FuelBreakdown,
    /// The record that was appended.
    pub record: TripRecord,
    /// Trips in the user's log after the append.
    pub trip_count: usize,
}

/// Start a trip for a registered vehicle.
///
/// # Errors
///
/// Returns [`Error::VehicleNotFound`] if the vehicle is not registered, or a
/// storage error.
pub fn begin(registry: &VehicleRegistry<'_>, vehicle_id: &str) -> Result<TripSession> {
    if !registry.contains(vehicle_id)? {
        return Err(Error::vehicle_not_found(vehicle_id));
    }
    debug!("Starting trip session for {}", vehicle_id);
    Ok(TripSession::new(vehicle_id))
}

impl TripSession {
    /// A fresh session waiting for the start odometer.
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            step: TripStep::StartOdometer,
            start_odometer: None,
            km: None,
            segments: None,
            idle_hours: None,
            fuel_start: None,
            refuel: None,
        }
    }

    /// Plate number of the vehicle.
    #[must_use]
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// The step currently asked.
    #[must_use]
    pub fn step(&self) -> TripStep {
        self.step
    }

    /// Feed the answer to the current step.
    ///
    /// The distance breakdown must add up to the trip distance within
    /// `tolerance` kilometres. The refuel answer is not kept in the session;
    /// it only goes into the returned [`TripInput`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed answers and
    /// [`Error::DistributionMismatch`] for an inconsistent breakdown. The
    /// session is unchanged in both cases.
    pub fn advance(&mut self, text: &str, tolerance: f64) -> Result<Advance> {
        match self.step {
            TripStep::StartOdometer => self.start_odometer = Some(input::parse_amount(text)?),
            TripStep::Km => self.km = Some(input::parse_amount(text)?),
            TripStep::Distribution => {
                let [city, highway, district] =
                    input::parse_amounts::<3>(text, DISTRIBUTION_FORMAT)?;
                let total_km = self
                    .km
                    .ok_or_else(|| Error::IncompleteSession { missing: vec!["km"] })?;
                let sum = city + highway + district;
                if (sum - total_km).abs() > tolerance {
                    return Err(Error::DistributionMismatch { total_km, sum });
                }
                self.segments = Some((city, highway, district));
            }
            TripStep::Idle => self.idle_hours = Some(input::parse_amount(text)?),
            TripStep::FuelStart => self.fuel_start = Some(input::parse_amount(text)?),
            TripStep::Refuel => {
                let refuel = input::parse_amount(text)?;
                let mut filled = self.clone();
                filled.refuel = Some(refuel);
                return filled.complete().map(Advance::Ready);
            }
        }

        if let Some(next) = self.step.next() {
            self.step = next;
        }
        debug!("Trip for {} now at {}", self.vehicle_id, self.step);
        Ok(Advance::Next(self.step))
    }

    /// Collect every answer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSession`] naming each unset field.
    pub fn complete(&self) -> Result<TripInput> {
        let mut missing = Vec::new();
        if self.start_odometer.is_none() {
            missing.push("start_odometer");
        }
        if self.km.is_none() {
            missing.push("km");
        }
        if self.segments.is_none() {
            missing.push("distribution");
        }
        if self.idle_hours.is_none() {
            missing.push("idle");
        }
        if self.fuel_start.is_none() {
            missing.push("fuel_start");
        }
        if self.refuel.is_none() {
            missing.push("refuel");
        }

        match (
            self.start_odometer,
            self.km,
            self.segments,
            self.idle_hours,
            self.fuel_start,
            self.refuel,
        ) {
            (
                Some(start_odometer),
                Some(km),
                Some((city_km, highway_km, district_km)),
                Some(idle_hours),
                Some(fuel_start),
                Some(refuel),
            ) => Ok(TripInput {
                vehicle_id: self.vehicle_id.clone(),
                start_odometer,
                km,
                segments: Segments {
                    city_km,
                    highway_km,
                    district_km,
                    idle_hours,
                },
                fuel_start,
                refuel,
            }),
            _ => Err(Error::IncompleteSession { missing }),
        }
    }
}

/// Compute fuel use for a completed trip and append it to the user's log.
///
/// # Errors
///
/// Returns [`Error::VehicleNotFound`] if the vehicle was deleted
/// meanwhile, [`Error::InvalidNorms`] if its norms are unusable, or a
/// storage error. Nothing is appended on error.
pub fn finalize(
    input: &TripInput,
    registry: &VehicleRegistry<'_>,
    log: &TripLog<'_>,
    user_id: &str,
) -> Result<TripSummary> {
    let vehicle = registry.get(&input.vehicle_id)?;
    let fuel = calculator::calculate(&vehicle, &input.segments)?;

    let record = TripRecord {
        car: vehicle.id.clone(),
        start_odometer: input.start_odometer,
        end_odometer: input.start_odometer + input.km,
        km: input.km,
        city: input.segments.city_km,
        highway: input.segments.highway_km,
        district: input.segments.district_km,
        idle: input.segments.idle_hours,
        fuel_start: input.fuel_start,
        refuel: input.refuel,
        fuel_end: input.fuel_start + input.refuel - fuel.total,
        total_fuel: fuel.total,
        recorded_at: Some(Utc::now()),
    };

    let trip_count = log.append(user_id, record.clone())?;
    info!(
        "Recorded trip of {} km for {} ({} l)",
        record.km, record.car, record.total_fuel
    );

    Ok(TripSummary {
        vehicle,
        fuel,
        record,
        trip_count,
    })
}
