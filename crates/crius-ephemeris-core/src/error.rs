//! Error types.
//!
//! [`EphemerisError`] is a ready-made taxonomy for adapter failures. The
//! adapter trait does not require it: services propagate whatever error type
//! an adapter declares.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris data not found at path: {path}. {message}")]
    EphemerisDataNotFound { path: String, message: String },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Invalid ayanamsa: {ayanamsa}. Valid ayanamsas: {valid:?}")]
    InvalidAyanamsa { ayanamsa: String, valid: Vec<String> },
    #[error("Failed to calculate position for {planet_id} at {datetime}: {message}")]
    CalculationFailed {
        planet_id: String,
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("Date {datetime} is outside the ephemeris range {start} to {end}")]
    DateOutOfRange {
        datetime: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Errors raised while assembling a service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("cache must be provided when enable_cache is true")]
    MissingCache,
}

/// Structural errors collected while validating a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} validation error(s): {}", .errors.len(), .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

/// An adapter did not conform to the adapter contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}: {}", .errors.join("; "))]
pub struct ProtocolConformanceError {
    pub message: String,
    pub errors: Vec<String>,
}

impl ProtocolConformanceError {
    pub fn new(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    /// `Ok(())` when `errors` is empty, otherwise the wrapped mismatch list.
    pub fn check(message: impl Into<String>, errors: Vec<String>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(message, errors))
        }
    }
}
