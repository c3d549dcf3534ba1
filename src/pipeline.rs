//! Phase selection and phase runners
//!
//! Each phase reads the artifact its predecessor wrote, so any phase can be
//! run on its own once its input exists. A missing input or missing storage
//! configuration aborts before any request is made.

use crate::archiver::{ArchiveReport, Archiver};
use crate::blob::{BlobStore, S3BlobStore};
use crate::checkpoint::CheckpointStore;
use crate::config::{load_storage_config, Config, StorageConfig};
use crate::crawler::{Fetcher, MapOptions, MapReport, Mapper, Timeouts};
use crate::model::LeafResource;
use crate::output::{
    load_gallery, load_patches, load_resolved_urls, write_index, write_resolved_urls,
    GallerySource, IndexSummary,
};
use crate::resolver::{resolve_all, ResolutionReport};
use crate::HarvestError;
use clap::ValueEnum;
use std::time::Duration;

/// Pipeline phase selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Phase {
    /// Discover containers and their photos
    Map,
    /// Resolve asset URLs for every mapped photo
    Resolve,
    /// Download, inspect and store every resolved asset
    Archive,
    /// Rebuild index.json from the mapped gallery
    Index,
    /// Every phase in order
    All,
}

impl Phase {
    fn includes(self, phase: Phase) -> bool {
        self == Phase::All || self == phase
    }

    pub fn needs_storage(self) -> bool {
        self.includes(Phase::Archive)
    }
}

/// Command-line overrides for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Discard the mapping checkpoint before mapping
    pub fresh: bool,
    /// Process at most this many containers in map and archive
    pub limit: Option<usize>,
    /// Overrides `pipeline.checkpoint-every`
    pub checkpoint_every: Option<usize>,
}

/// Reports from the phases that ran
#[derive(Debug, Default)]
pub struct RunSummary {
    pub map: Option<MapReport>,
    pub resolution: Option<ResolutionReport>,
    pub archive: Option<ArchiveReport>,
    pub index: Option<IndexSummary>,
}

fn fetcher(config: &Config, delay_ms: u64) -> Result<Fetcher, HarvestError> {
    Ok(Fetcher::new(
        &config.user_agent,
        Duration::from_millis(delay_ms),
        Timeouts::from_config(&config.fetcher),
    )?)
}

/// Fetcher for the sequential mapper
pub fn mapper_fetcher(config: &Config) -> Result<Fetcher, HarvestError> {
    fetcher(config, config.fetcher.mapper_delay_ms)
}

/// Fetcher cloned into every resolver and archiver worker
pub fn worker_fetcher(config: &Config) -> Result<Fetcher, HarvestError> {
    fetcher(config, config.fetcher.worker_delay_ms)
}

/// Runs the mapping phase
pub async fn run_map(
    config: &Config,
    fetcher: Fetcher,
    options: RunOptions,
) -> Result<MapReport, HarvestError> {
    let progress_path = config.output.progress_path();
    let mut store = if options.fresh {
        CheckpointStore::fresh(&progress_path)?
    } else {
        CheckpointStore::open(&progress_path)?
    };

    let mapper = Mapper::new(config.site.clone(), fetcher)?;
    let map_options = MapOptions {
        checkpoint_every: options
            .checkpoint_every
            .unwrap_or(config.pipeline.checkpoint_every)
            .max(1),
        limit: options.limit,
    };

    mapper.run(&mut store, &config.output, map_options).await
}

/// Runs the resolution phase and writes resolved_urls.json once at the end
pub async fn run_resolve(config: &Config, fetcher: Fetcher) -> Result<ResolutionReport, HarvestError> {
    let (containers, _) = load_gallery(&config.output)?;
    let resources: Vec<LeafResource> = containers
        .into_iter()
        .flat_map(|c| c.resources)
        .collect();

    let report = resolve_all(
        &fetcher,
        &config.site.base_url,
        &resources,
        config.pipeline.workers,
    )
    .await;

    write_resolved_urls(&config.output.resolved_urls_path(), &report.resolved)?;
    Ok(report)
}

/// Runs the archiving phase against `store`
pub async fn run_archive(
    config: &Config,
    fetcher: Fetcher,
    store: &dyn BlobStore,
    storage: &StorageConfig,
    options: RunOptions,
) -> Result<ArchiveReport, HarvestError> {
    let (containers, _) = load_gallery(&config.output)?;
    let resolved = load_resolved_urls(&config.output.resolved_urls_path())?;

    let archiver = Archiver::new(
        fetcher,
        store,
        storage,
        &config.site.category,
        config.pipeline.workers,
    );
    archiver
        .run(
            &containers,
            &resolved,
            &config.output.containers_dir(),
            options.limit,
        )
        .await
}

/// Rebuilds index.json from the mapped gallery and the patch index
pub fn run_index(config: &Config) -> Result<IndexSummary, HarvestError> {
    let (containers, source) = load_gallery(&config.output)?;
    if source == GallerySource::Progress {
        tracing::warn!("Building index from an unfinished mapping run");
    }

    let patches = load_patches(&config.output.patches_index_path())?;
    let index = IndexSummary::build(&containers, patches.len(), source, chrono::Utc::now());
    write_index(&config.output.index_path(), &index)?;
    Ok(index)
}

/// Runs the selected phase, or all of them in order
pub async fn run(config: &Config, phase: Phase, options: RunOptions) -> Result<RunSummary, HarvestError> {
    // Storage settings are checked before any phase starts
    let storage = if phase.needs_storage() {
        Some(load_storage_config()?)
    } else {
        None
    };

    let mut summary = RunSummary::default();

    if phase.includes(Phase::Map) {
        tracing::info!("Phase: map");
        summary.map = Some(run_map(config, mapper_fetcher(config)?, options).await?);
    }

    if phase.includes(Phase::Resolve) {
        tracing::info!("Phase: resolve");
        summary.resolution = Some(run_resolve(config, worker_fetcher(config)?).await?);
    }

    if let Some(storage) = &storage {
        tracing::info!("Phase: archive");
        let store = S3BlobStore::new(storage)?;
        summary.archive = Some(
            run_archive(config, worker_fetcher(config)?, &store, storage, options).await?,
        );
    }

    if phase.includes(Phase::Index) {
        tracing::info!("Phase: index");
        summary.index = Some(run_index(config)?);
    }

    Ok(summary)
}
