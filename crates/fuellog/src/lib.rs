//! `fuellog` - Conversational fuel-norm and trip-log keeper for vehicle fleets
//!
//! Vehicles are registered with four fuel-consumption norms (city, highway,
//! district, idle). A trip is entered one answer at a time; once complete,
//! the fuel used per segment is computed from the norms and the trip is
//! appended to the user's log.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod calculator;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod registry;
pub mod session;
pub mod storage;
pub mod trips;
pub mod workflow;

pub use calculator::{calculate, FuelBreakdown, Segments};
pub use chat::{Action, Assistant, Reply};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use registry::{Norms, Vehicle, VehicleRegistry};
pub use session::{Flow, SessionId, Sessions};
pub use storage::{KeyValueStore, StoreStats};
pub use trips::{TripLog, TripRecord};
pub use workflow::{TripSession, TripStep, TripSummary};
