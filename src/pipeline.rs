//! One fetch → transform → project cycle
//!
//! A loader failure aborts the cycle. A projection failure does not: the
//! snapshot carries the named error so the series can still be drawn.

use chrono::{DateTime, FixedOffset, Local};
use log::{debug, warn};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::config::Config;
use crate::data::{
    project_linear, transform, CookClient, CookLoader, LoadSource, LoaderError, Projection,
    ProjectionError, Reading,
};
use crate::error::{ErrorKind, ErrorReport};

/// Stage of the process state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleStage {
    #[default]
    Idle,
    /// Reading the cache or fetching from the service
    Fetching,
    Transforming,
    Projecting,
    Rendering,
}

impl CycleStage {
    pub fn label(self) -> &'static str {
        match self {
            CycleStage::Idle => "idle",
            CycleStage::Fetching => "fetching",
            CycleStage::Transforming => "transforming",
            CycleStage::Projecting => "projecting",
            CycleStage::Rendering => "rendering",
        }
    }
}

/// Errors that abort a cycle
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(e) => e.kind(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self)
    }
}

/// Everything needed to draw one frame of the chart
#[derive(Debug, Clone)]
pub struct CookSnapshot {
    pub cook_id: u64,
    pub readings: Vec<Reading>,
    pub projection: Result<Projection, ProjectionError>,
    pub target_temp: f64,
    pub last_updated: DateTime<Local>,
    pub source: LoadSource,
}

impl CookSnapshot {
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }
}

/// Runs the fetch → transform → project cycle for one cook
#[derive(Debug, Clone)]
pub struct Pipeline {
    cook_id: u64,
    loader: CookLoader,
    target_temp: f64,
    start_fraction: f64,
    utc_offset: FixedOffset,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        let loader = CookLoader::new(
            CookClient::new(config.endpoint_template.clone()),
            CacheManager::with_dir(config.cache_dir.clone()),
            config.refresh_interval,
        );
        Self::with_loader(config, loader)
    }

    /// Creates a pipeline around an existing loader
    pub fn with_loader(config: &Config, loader: CookLoader) -> Self {
        Self {
            cook_id: config.cook_id,
            loader,
            target_temp: config.target_temp,
            start_fraction: config.start_fraction,
            utc_offset: config.utc_offset,
        }
    }

    pub fn cook_id(&self) -> u64 {
        self.cook_id
    }

    /// Runs one cycle without stage notifications
    pub async fn run(&self) -> Result<CookSnapshot, PipelineError> {
        self.run_with(|_| {}).await
    }

    /// Runs one cycle, calling `on_stage` as each stage begins
    ///
    /// Ends in `Rendering` on success; the caller moves back to `Idle` once the
    /// snapshot is drawn. On failure the last reported stage is `Idle`.
    pub async fn run_with<F>(&self, mut on_stage: F) -> Result<CookSnapshot, PipelineError>
    where
        F: FnMut(CycleStage),
    {
        on_stage(CycleStage::Fetching);
        let loaded = match self.loader.load(self.cook_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                on_stage(CycleStage::Idle);
                return Err(e.into());
            }
        };

        on_stage(CycleStage::Transforming);
        let readings = transform(&loaded.records);

        on_stage(CycleStage::Projecting);
        let projection = project_linear(&readings, self.target_temp, self.start_fraction);
        match &projection {
            Ok(p) => debug!("projection: {}", p.describe(&self.utc_offset)),
            Err(e) => warn!("projection unavailable: {}", e),
        }

        on_stage(CycleStage::Rendering);
        Ok(CookSnapshot {
            cook_id: self.cook_id,
            readings,
            projection,
            target_temp: self.target_temp,
            last_updated: loaded.last_updated,
            source: loaded.source,
        })
    }
}
