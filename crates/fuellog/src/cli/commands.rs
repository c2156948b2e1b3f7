//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::error::Result;
use crate::registry::Norms;

/// Chat command arguments.
#[derive(Debug, Args)]
pub struct ChatCommand {
    /// Account the trips are logged under (defaults to `chat.user_id`)
    #[arg(short, long)]
    pub user: Option<String>,
}

/// The four consumption norms, as typed.
#[derive(Debug, Clone, Args)]
pub struct NormsArgs {
    /// City norm
    pub city: String,
    /// Highway norm
    pub highway: String,
    /// District norm
    pub district: String,
    /// Idle norm, per hour
    pub idle: String,
}

impl NormsArgs {
    /// Validate into [`Norms`].
    ///
    /// # Errors
    ///
    /// Returns an error if any value is not a non-negative number.
    pub fn to_norms(&self) -> Result<Norms> {
        Norms::parse(&self.city, &self.highway, &self.district, &self.idle)
    }
}

/// Vehicle registry commands.
#[derive(Debug, Subcommand)]
pub enum VehicleCommand {
    /// Register a vehicle
    Add {
        /// Plate number
        id: String,

        /// Consumption norms
        #[command(flatten)]
        norms: NormsArgs,
    },

    /// List registered vehicles
    List,

    /// Show the norms of a vehicle
    Show {
        /// Plate number
        id: String,
    },

    /// Replace the norms of a vehicle
    Edit {
        /// Plate number
        id: String,

        /// New consumption norms
        #[command(flatten)]
        norms: NormsArgs,
    },

    /// Delete a vehicle
    Delete {
        /// Plate number
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Trip log command arguments.
#[derive(Debug, Args)]
pub struct TripsCommand {
    /// Account whose log to show
    pub user: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
