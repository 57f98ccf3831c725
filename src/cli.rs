//! Command-line interface parsing for pitwatch
//!
//! Flags override values from the config file; see [`crate::config::Config::resolve`].

use std::path::PathBuf;

use clap::Parser;

/// pitwatch - Live smoker telemetry and meat temperature projection
#[derive(Parser, Debug, Default)]
#[command(name = "pitwatch")]
#[command(about = "Live smoker telemetry chart with meat temperature projection")]
#[command(version)]
pub struct Cli {
    /// Cook identifier on the telemetry service
    ///
    /// Optional when `cook_id` is set in the config file.
    #[arg(value_name = "COOK_ID")]
    pub cook_id: Option<u64>,

    /// Meat target temperature in °F [default: 203]
    #[arg(short, long, value_name = "DEG_F")]
    pub target: Option<f64>,

    /// Seconds before cached telemetry is refetched [default: 300]
    #[arg(short, long, value_name = "SECS")]
    pub refresh: Option<u64>,

    /// Directory for the `<cook_id>.csv` cache file [default: .]
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Telemetry URL template containing `{cook_id}`
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Fraction of the series where the projection starts, 0 to 1 [default: 0.9]
    #[arg(short = 'f', long, value_name = "FRACTION")]
    pub start_fraction: Option<f64>,

    /// Hours east of UTC used to display times [default: local offset]
    ///
    /// Examples:
    ///   pitwatch 4115257 --utc-offset -6
    ///   pitwatch 4115257 --utc-offset 5.5
    #[arg(long, value_name = "HOURS", allow_negative_numbers = true)]
    pub utc_offset: Option<f64>,

    /// Hide the fan duty cycle panel
    #[arg(long)]
    pub no_duty_cycle: bool,

    /// Only refresh on `r`, never on the timer
    #[arg(long)]
    pub no_auto_refresh: bool,

    /// Path of a JSON config file [default: platform config dir]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run one fetch and projection, print a summary and exit
    #[arg(long)]
    pub once: bool,
}
