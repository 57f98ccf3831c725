//! Core data models for pitwatch
//!
//! Raw records come straight from the telemetry CSV. Readings are the
//! transformed, human-readable form. They are separate types so a series
//! can only be transformed once.

pub mod client;
pub mod loader;
pub mod projection;
pub mod transform;

pub use client::CookClient;
pub use loader::{parse_records, CookLoader, LoadSource, LoadedCook, LoaderError};
pub use projection::{project_linear, Projection, ProjectionError, ProjectionPoint};
pub use transform::{raw_duty_to_fraction, raw_temp_to_fahrenheit, transform};

use serde::Deserialize;

/// One sample as delivered by the telemetry service
///
/// Temperatures are tenths of a degree Celsius and may hold out-of-range
/// sentinel values when a probe is disconnected. Columns the service sends
/// beyond these (e.g. `meat_temp2`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    /// Seconds since the Unix epoch
    pub time: i64,
    /// Controller set point
    pub set_temp: i64,
    /// Pit probe
    pub pit_temp: i64,
    /// Meat probe
    pub meat_temp1: i64,
    /// Fan duty cycle, scaled by 100
    pub duty_cycle: i64,
}

/// One sample in physical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Seconds since the Unix epoch
    pub time: i64,
    /// Controller set point in °F
    pub set_temp: f64,
    /// Pit temperature in °F
    pub pit_temp: f64,
    /// Meat temperature in °F
    pub meat_temp: f64,
    /// Fraction of time the fan is on
    pub duty_cycle: f64,
}
