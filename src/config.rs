//! Runtime configuration
//!
//! A `Config` is resolved once at startup from three layers: built-in
//! defaults, an optional JSON config file, and command-line flags (highest
//! precedence). It is validated here so the rest of the pipeline can trust it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Local};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;
use crate::error::ErrorKind;

/// Default endpoint; `{cook_id}` is replaced with the cook identifier
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://myflameboss.com/en/cooks/{cook_id}/raw";

/// Placeholder substituted in the endpoint template
pub const COOK_ID_PLACEHOLDER: &str = "{cook_id}";

const DEFAULT_TARGET_TEMP_F: f64 = 203.0;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
const DEFAULT_START_FRACTION: f64 = 0.9;

/// Longest accepted freshness threshold (one day)
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Errors that can occur while resolving the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No cook id on the command line or in the config file
    #[error("No cook id given. Pass it as an argument or set \"cook_id\" in {0}")]
    MissingCookId(String),

    /// Config file is missing or could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this structure
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Start fraction outside [0, 1]
    #[error("Start fraction must be between 0 and 1, got {0}")]
    InvalidStartFraction(f64),

    /// Refresh interval of zero seconds or longer than a day
    #[error("Refresh interval must be between 1 and 86400 seconds, got {0}")]
    InvalidRefreshInterval(u64),

    /// Target temperature is not a finite number
    #[error("Target temperature must be a finite number, got {0}")]
    InvalidTargetTemp(f64),

    /// Endpoint template lacks the cook id placeholder
    #[error("Endpoint template must contain {{cook_id}}: {0}")]
    InvalidEndpoint(String),

    /// UTC offset outside what a timezone can express
    #[error("UTC offset must be between -23 and +23 hours, got {0}")]
    InvalidUtcOffset(f64),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

/// Values read from the optional JSON config file
///
/// Every field is optional; missing fields fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub cook_id: Option<u64>,
    pub target_temp: Option<f64>,
    pub refresh_interval_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub endpoint_template: Option<String>,
    pub start_fraction: Option<f64>,
    pub utc_offset_hours: Option<f64>,
    pub show_duty_cycle: Option<bool>,
    pub auto_refresh: Option<bool>,
}

impl FileConfig {
    /// Reads a config file; a missing file is an error
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads a config file, returning defaults if the file does not exist
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Fully resolved configuration for one cook
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Cook identifier on the telemetry service
    pub cook_id: u64,
    /// Meat target temperature in °F
    pub target_temp: f64,
    /// Maximum cache age before a refresh is forced
    pub refresh_interval: Duration,
    /// Directory holding `<cook_id>.csv`
    pub cache_dir: PathBuf,
    /// Remote URL with a `{cook_id}` placeholder
    pub endpoint_template: String,
    /// Position of the first projection reference point, as a fraction of the series
    pub start_fraction: f64,
    /// Offset used to display sample timestamps
    pub utc_offset: FixedOffset,
    /// Whether the duty cycle panel is shown
    pub show_duty_cycle: bool,
    /// Whether cycles also run on the timer, not only on request
    pub auto_refresh: bool,
}

impl Config {
    /// Default location of the config file (`pitwatch/config.json` in the
    /// platform config directory)
    pub fn default_config_file() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "pitwatch")?;
        Some(project_dirs.config_dir().join("config.json"))
    }

    /// Resolves the configuration from parsed CLI arguments
    ///
    /// Reads the file named by `--config`, which must exist, or the default
    /// config file if it exists, and applies the flags on top.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let (config_path, file) = match &cli.config {
            Some(path) => (Some(path.clone()), FileConfig::load(path)?),
            None => {
                let path = Self::default_config_file();
                let file = match &path {
                    Some(path) => FileConfig::load_optional(path)?,
                    None => FileConfig::default(),
                };
                (path, file)
            }
        };
        let location = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the config file".to_string());
        Self::merge(cli, file, &location)
    }

    /// Layers CLI flags over file values over defaults, then validates
    pub fn merge(cli: &Cli, file: FileConfig, location: &str) -> Result<Self, ConfigError> {
        let cook_id = cli
            .cook_id
            .or(file.cook_id)
            .ok_or_else(|| ConfigError::MissingCookId(location.to_string()))?;

        let target_temp = cli
            .target
            .or(file.target_temp)
            .unwrap_or(DEFAULT_TARGET_TEMP_F);
        if !target_temp.is_finite() {
            return Err(ConfigError::InvalidTargetTemp(target_temp));
        }

        let refresh_secs = cli
            .refresh
            .or(file.refresh_interval_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        if !(1..=MAX_REFRESH_INTERVAL_SECS).contains(&refresh_secs) {
            return Err(ConfigError::InvalidRefreshInterval(refresh_secs));
        }

        let start_fraction = cli
            .start_fraction
            .or(file.start_fraction)
            .unwrap_or(DEFAULT_START_FRACTION);
        if !(0.0..=1.0).contains(&start_fraction) {
            return Err(ConfigError::InvalidStartFraction(start_fraction));
        }

        let endpoint_template = cli
            .endpoint
            .clone()
            .or(file.endpoint_template)
            .unwrap_or_else(|| DEFAULT_ENDPOINT_TEMPLATE.to_string());
        if !endpoint_template.contains(COOK_ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidEndpoint(endpoint_template));
        }

        let utc_offset = match cli.utc_offset.or(file.utc_offset_hours) {
            Some(hours) => offset_from_hours(hours)?,
            None => *Local::now().offset(),
        };

        let cache_dir = cli
            .cache_dir
            .clone()
            .or(file.cache_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let show_duty_cycle = !cli.no_duty_cycle && file.show_duty_cycle.unwrap_or(true);
        let auto_refresh = !cli.no_auto_refresh && file.auto_refresh.unwrap_or(true);

        Ok(Self {
            cook_id,
            target_temp,
            refresh_interval: Duration::from_secs(refresh_secs),
            cache_dir,
            endpoint_template,
            start_fraction,
            utc_offset,
            show_duty_cycle,
            auto_refresh,
        })
    }

    /// Period of the refresh timer
    ///
    /// One second longer than the freshness threshold so every timed cycle
    /// finds the cache stale.
    pub fn cycle_period(&self) -> Duration {
        self.refresh_interval.saturating_add(Duration::from_secs(1))
    }

    /// Path of the log file used while the terminal UI owns the screen
    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join("pitwatch.log")
    }
}

/// Substitutes the cook id into an endpoint template
pub fn endpoint_url(template: &str, cook_id: u64) -> String {
    template.replace(COOK_ID_PLACEHOLDER, &cook_id.to_string())
}

/// Converts an offset in (possibly fractional) hours to a `FixedOffset`
pub fn offset_from_hours(hours: f64) -> Result<FixedOffset, ConfigError> {
    if !hours.is_finite() {
        return Err(ConfigError::InvalidUtcOffset(hours));
    }
    let seconds = (hours * 3600.0).round() as i32;
    FixedOffset::east_opt(seconds).ok_or(ConfigError::InvalidUtcOffset(hours))
}
