//! Cache-or-fetch loading of cook telemetry
//!
//! The loader reads the cached CSV when it is no older than the refresh
//! interval and otherwise refetches it from the telemetry service, replacing
//! the cache file. Either way the text is parsed into raw records.

use std::fmt;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use log::info;
use thiserror::Error;

use super::{CookClient, RawRecord};
use crate::cache::{is_stale, CacheManager};
use crate::error::ErrorKind;

/// Errors that can occur while loading cook telemetry
#[derive(Debug, Error)]
pub enum LoaderError {
    /// HTTP request failed or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Cache file could not be read or written
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// Telemetry CSV could not be parsed
    #[error("Failed to parse telemetry CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl LoaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoaderError::Request(_) | LoaderError::Status { .. } => ErrorKind::Network,
            LoaderError::Cache(_) => ErrorKind::Cache,
            LoaderError::Csv(_) => ErrorKind::MalformedData,
        }
    }
}

/// Which path the loader took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Fetched from the telemetry service and written to the cache
    Remote,
    /// Read from a cache entry of the given age
    Cache { age: Duration },
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::Remote => f.write_str("fetched"),
            LoadSource::Cache { age } => write!(f, "from cache ({}s old)", age.as_secs()),
        }
    }
}

/// Raw telemetry for one cook plus when it was last updated
#[derive(Debug, Clone)]
pub struct LoadedCook {
    pub records: Vec<RawRecord>,
    /// Fetch completion time, or the cache file's mtime
    pub last_updated: DateTime<Local>,
    pub source: LoadSource,
}

/// Loads cook telemetry from the cache or the telemetry service
#[derive(Debug, Clone)]
pub struct CookLoader {
    client: CookClient,
    cache: CacheManager,
    refresh_interval: Duration,
}

impl CookLoader {
    pub fn new(client: CookClient, cache: CacheManager, refresh_interval: Duration) -> Self {
        Self {
            client,
            cache,
            refresh_interval,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Returns telemetry no older than the refresh interval
    ///
    /// Fetches when there is no cache entry or it is older than the interval.
    /// No retry is attempted; any failure is returned to the caller.
    pub async fn load(&self, cook_id: u64) -> Result<LoadedCook, LoaderError> {
        let age = self.cache.age(cook_id, SystemTime::now())?;

        let fresh_entry = match age {
            Some(age) if !is_stale(Some(age), self.refresh_interval) => {
                self.cache.read(cook_id)?.map(|entry| (age, entry))
            }
            _ => None,
        };

        let (body, last_updated, source) = match fresh_entry {
            Some((age, entry)) => {
                info!(
                    "cache age {}s <= {}s, reading {}",
                    age.as_secs(),
                    self.refresh_interval.as_secs(),
                    self.cache.cache_path(cook_id).display()
                );
                (
                    entry.body,
                    DateTime::<Local>::from(entry.modified),
                    LoadSource::Cache { age },
                )
            }
            None => {
                let url = self.client.raw_url(cook_id);
                let body = self.client.fetch_raw(cook_id).await?;
                info!("retrieved from {}", url);
                let path = self.cache.write(cook_id, &body)?;
                info!("wrote to {}", path.display());
                (body, Local::now(), LoadSource::Remote)
            }
        };

        let records = parse_records(&body)?;

        Ok(LoadedCook {
            records,
            last_updated,
            source,
        })
    }
}

/// Parses the telemetry CSV into raw records
///
/// The first row is a header; columns are matched by name and extra columns
/// are ignored. A header-only body yields an empty series.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let records = reader
        .deserialize::<RawRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}
