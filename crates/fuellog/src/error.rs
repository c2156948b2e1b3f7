//! Error types for fuellog.
//!
//! This module defines all error types used throughout the fuellog crate.
//! Domain failures (bad input, duplicate or unknown vehicles, inconsistent
//! trip breakdowns) live next to storage and configuration failures so the
//! chat layer can classify any of them with [`Error::kind`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fuellog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// Text could not be parsed into the expected shape.
    #[error("invalid input {found:?}: expected {expected}")]
    InvalidInput {
        /// Human-readable description of the accepted format.
        expected: &'static str,
        /// The offending text.
        found: String,
    },

    /// A vehicle with this identifier is already registered.
    #[error("vehicle {id} already exists")]
    DuplicateVehicle {
        /// The colliding identifier.
        id: String,
    },

    /// No vehicle with this identifier is registered.
    #[error("vehicle {id} not found")]
    VehicleNotFound {
        /// The missing identifier.
        id: String,
    },

    /// The city/highway/district split does not add up to the trip distance.
    #[error("distance breakdown sums to {sum} km but the trip was {total_km} km")]
    DistributionMismatch {
        /// Declared total distance.
        total_km: f64,
        /// Sum of the three segments that were entered.
        sum: f64,
    },

    /// A trip session reached finalization with fields still unset.
    #[error("trip session is missing {}", .missing.join(", "))]
    IncompleteSession {
        /// Names of the unset fields.
        missing: Vec<&'static str>,
    },

    /// A stored vehicle carries norms that cannot be used for calculation.
    #[error("invalid norms for vehicle {id}: {message}")]
    InvalidNorms {
        /// The vehicle whose norms are broken.
        id: String,
        /// What is wrong with them.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A JSON document could not be read or parsed.
    #[error("failed to read document {path}: {message}")]
    DocumentRead {
        /// Path to the document.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// A JSON document could not be written.
    #[error("failed to write document {path}: {source}")]
    DocumentWrite {
        /// Path to the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fuellog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed, non-numeric or wrong-arity text.
    InvalidInput,
    /// Vehicle identifier collision.
    Duplicate,
    /// Vehicle or record absent.
    NotFound,
    /// Distance breakdown does not match the declared total.
    Consistency,
    /// A session field was missing at finalization.
    IncompleteSession,
    /// Stored norms are unusable.
    InvalidNorms,
    /// Persistence failed.
    Storage,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Anything else.
    Internal,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(expected: &'static str, found: impl Into<String>) -> Self {
        Self::InvalidInput {
            expected,
            found: found.into(),
        }
    }

    /// Create a vehicle not found error.
    #[must_use]
    pub fn vehicle_not_found(id: impl Into<String>) -> Self {
        Self::VehicleNotFound { id: id.into() }
    }

    /// Create an invalid norms error.
    #[must_use]
    pub fn invalid_norms(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNorms {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DuplicateVehicle { .. } => ErrorKind::Duplicate,
            Self::VehicleNotFound { .. } => ErrorKind::NotFound,
            Self::DistributionMismatch { .. } => ErrorKind::Consistency,
            Self::IncompleteSession { .. } => ErrorKind::IncompleteSession,
            Self::InvalidNorms { .. } => ErrorKind::InvalidNorms,
            Self::DatabaseOpen { .. }
            | Self::DatabaseQuery(_)
            | Self::DatabaseMigration { .. }
            | Self::DocumentRead { .. }
            | Self::DocumentWrite { .. }
            | Self::DirectoryCreate { .. }
            | Self::Io(_)
            | Self::Json(_) => ErrorKind::Storage,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable by asking the user again.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput | ErrorKind::Consistency
        )
    }
}
