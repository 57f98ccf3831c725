//! Cache manager for persisting raw telemetry responses to disk
//!
//! Each cook is cached as `<cache_dir>/<cook_id>.csv`, byte-for-byte the body
//! returned by the telemetry service. The file's modification time is the
//! freshness marker; there is no separate metadata file.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;

/// Mode of a persisted cache entry, matching a plainly created file
#[cfg(unix)]
const CACHE_FILE_MODE: u32 = 0o644;

/// Raw cache contents for one cook plus its last-write time
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The raw response body
    pub body: String,
    /// When the entry was last written
    pub modified: SystemTime,
}

/// Decides whether a cache entry must be refreshed
///
/// A missing entry (`age == None`) is always stale; otherwise the entry is
/// stale only when strictly older than `threshold`.
pub fn is_stale(age: Option<Duration>, threshold: Duration) -> bool {
    match age {
        None => true,
        Some(age) => age > threshold,
    }
}

/// Manages reading and writing raw telemetry files
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager rooted at `cache_dir`
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path of the cache file for a cook
    pub fn cache_path(&self, cook_id: u64) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", cook_id))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Last-write time of a cook's entry, or `None` if there is no entry
    pub fn last_modified(&self, cook_id: u64) -> io::Result<Option<SystemTime>> {
        match fs::metadata(self.cache_path(cook_id)) {
            Ok(metadata) => metadata.modified().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Age of a cook's entry at `now`
    ///
    /// An mtime later than `now` counts as age zero.
    pub fn age(&self, cook_id: u64, now: SystemTime) -> io::Result<Option<Duration>> {
        Ok(self
            .last_modified(cook_id)?
            .map(|modified| now.duration_since(modified).unwrap_or(Duration::ZERO)))
    }

    /// Reads a cook's entry, or `None` if there is no entry
    pub fn read(&self, cook_id: u64) -> io::Result<Option<CachedData>> {
        let path = self.cache_path(cook_id);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let modified = fs::metadata(&path)?.modified()?;
        Ok(Some(CachedData { body, modified }))
    }

    /// Replaces a cook's entry with `body`
    ///
    /// The body is written to a temporary file in the cache directory and then
    /// renamed over the entry, so readers see either the old or the new file.
    pub fn write(&self, cook_id: u64, body: &str) -> io::Result<PathBuf> {
        self.ensure_dir()?;

        let path = self.cache_path(cook_id);
        let mut file = NamedTempFile::new_in(&self.cache_dir)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        // temp files start out owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(CACHE_FILE_MODE))?;
        }
        file.persist(&path).map_err(|e| e.error)?;

        Ok(path)
    }
}
