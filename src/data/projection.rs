//! Linear projection of meat temperature
//!
//! Draws a line through two samples of the meat probe, one at
//! `floor(n * start_fraction)` and the most recent one, and extrapolates it to
//! the target temperature:
//!
//! ```text
//! t3 = t1 + (t2 - t1) / (m2 - m1) * (target - m1)
//! ```

use chrono::{DateTime, FixedOffset, TimeZone};
use thiserror::Error;

use super::Reading;
use crate::error::ErrorKind;

/// Errors that can occur when projecting the meat temperature
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Start fraction outside [0, 1] or not a number
    #[error("Start fraction must be between 0 and 1, got {0}")]
    InvalidStartFraction(f64),

    /// Fewer than two samples
    #[error("Need at least 2 samples to project, have {0}")]
    InsufficientSamples(usize),

    /// Start fraction selects the most recent sample, leaving no span
    #[error("Start fraction {fraction} leaves no samples before the latest of {len}")]
    EmptyWindow { fraction: f64, len: usize },

    /// Meat temperature did not change between the reference points
    #[error("No temperature trend detected (meat temp {0:.2}°F at both reference points)")]
    NoTemperatureTrend(f64),
}

impl ProjectionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Projection
    }
}

/// A (time, temperature) point of the projection overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPoint {
    /// Seconds since the Unix epoch
    pub time: f64,
    /// Temperature in °F
    pub temp: f64,
}

/// Result of a linear projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// First reference point `(t1, m1)`
    pub start: ProjectionPoint,
    /// Most recent sample `(t2, m2)`
    pub latest: ProjectionPoint,
    /// Predicted arrival `(t3, target)`
    pub predicted: ProjectionPoint,
}

impl Projection {
    /// Predicted arrival time in seconds since the epoch
    pub fn predicted_time(&self) -> f64 {
        self.predicted.time
    }

    /// Predicted arrival as a wall-clock time, truncated to the minute
    ///
    /// `None` if the prediction lies outside chrono's representable range.
    pub fn predicted_at(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        let secs = self.predicted.time.floor();
        if !secs.is_finite() || secs.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        let secs = secs as i64;
        offset.timestamp_opt(secs - secs.rem_euclid(60), 0).single()
    }

    /// Whether the meat is heading toward the target (prediction not in the past)
    pub fn is_converging(&self) -> bool {
        self.predicted.time >= self.latest.time
    }

    /// The three reference points, for plotting
    pub fn overlay_points(&self) -> [(f64, f64); 3] {
        [
            (self.start.time, self.start.temp),
            (self.latest.time, self.latest.temp),
            (self.predicted.time, self.predicted.temp),
        ]
    }

    /// Human-readable summary, e.g. `203.00°F at 2024-07-19 18:42`
    pub fn describe(&self, offset: &FixedOffset) -> String {
        match self.predicted_at(offset) {
            Some(at) => format!("{:5.2}°F at {}", self.predicted.temp, at.format("%Y-%m-%d %H:%M")),
            None => format!("{:5.2}°F at an unrepresentable time", self.predicted.temp),
        }
    }
}

/// Projects when the meat probe reaches `target`
///
/// # Arguments
/// * `readings` - Transformed series, ascending by time
/// * `target` - Target meat temperature in °F
/// * `start_fraction` - Position of the first reference point, in [0, 1]
///
/// # Returns
/// * `Ok(Projection)` with the reference points and the predicted arrival
/// * `Err(ProjectionError)` if the series cannot support a projection
pub fn project_linear(
    readings: &[Reading],
    target: f64,
    start_fraction: f64,
) -> Result<Projection, ProjectionError> {
    if !(0.0..=1.0).contains(&start_fraction) {
        return Err(ProjectionError::InvalidStartFraction(start_fraction));
    }

    let n = readings.len();
    if n < 2 {
        return Err(ProjectionError::InsufficientSamples(n));
    }

    let i2 = n - 1;
    let i1 = ((n as f64 * start_fraction).floor() as usize).min(i2);
    if i1 == i2 {
        return Err(ProjectionError::EmptyWindow {
            fraction: start_fraction,
            len: n,
        });
    }

    let (t1, m1) = (readings[i1].time as f64, readings[i1].meat_temp);
    let (t2, m2) = (readings[i2].time as f64, readings[i2].meat_temp);

    if m2 == m1 {
        return Err(ProjectionError::NoTemperatureTrend(m1));
    }

    let t3 = t1 + (t2 - t1) / (m2 - m1) * (target - m1);

    Ok(Projection {
        start: ProjectionPoint { time: t1, temp: m1 },
        latest: ProjectionPoint { time: t2, temp: m2 },
        predicted: ProjectionPoint {
            time: t3,
            temp: target,
        },
    })
}
