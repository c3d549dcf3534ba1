//! Archiver: fetch, inspect and store every resolved asset
//!
//! Resources are processed container by container. Inside a container a
//! bounded pool downloads baseline assets, reads their EXIF block, uploads
//! them under deterministic keys and makes a best-effort pass at the
//! full-size variant. Every per-resource failure degrades that resource's
//! record; only writing the container dataset can fail the phase.

mod keys;
mod metadata;

pub use keys::{content_type_for, date_part, extension_for, public_url, storage_key, Variant};
pub use metadata::extract_metadata;

use crate::blob::{BlobError, BlobStore};
use crate::config::StorageConfig;
use crate::crawler::Fetcher;
use crate::model::{ArchiveStatus, ArchivedAsset, Container, LeafResource, Outcome, ResolvedUrl};
use crate::output::{container_dir, load_container_dataset, write_container_dataset};
use crate::HarvestError;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Counters for one archiving run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub containers: usize,
    pub assets: usize,
    pub archived: usize,
    pub partial: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub upgrades_stored: usize,
    pub with_metadata: usize,
    /// Containers skipped because an earlier slug owns the same directory
    pub dir_collisions: usize,
}

impl ArchiveReport {
    fn record(&mut self, asset: &ArchivedAsset) {
        self.assets += 1;
        match asset.archive_status {
            ArchiveStatus::Archived => self.archived += 1,
            ArchiveStatus::Partial { .. } => self.partial += 1,
            ArchiveStatus::Unresolved => self.unresolved += 1,
            ArchiveStatus::Failed { .. } => self.failed += 1,
        }
        if asset.stored_upgrade_key.is_some() {
            self.upgrades_stored += 1;
        }
        if asset.extracted_metadata.is_some() {
            self.with_metadata += 1;
        }
    }
}

/// Fetch+persist worker pool bound to one blob store
pub struct Archiver<'a> {
    fetcher: Fetcher,
    store: &'a dyn BlobStore,
    bucket: String,
    public_base: String,
    category: String,
    workers: usize,
}

impl<'a> Archiver<'a> {
    pub fn new(
        fetcher: Fetcher,
        store: &'a dyn BlobStore,
        storage: &StorageConfig,
        category: &str,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            bucket: storage.bucket.clone(),
            public_base: storage.public_url.clone(),
            category: category.to_string(),
            workers: workers.max(1),
        }
    }

    /// Uploads one variant and returns its key
    async fn store_variant(
        &self,
        resource: &LeafResource,
        asset_url: &str,
        variant: Variant,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError> {
        let ext = extension_for(asset_url);
        let key = storage_key(
            &self.category,
            resource.dates.date_from_container(),
            &resource.owner,
            &resource.resource_id,
            variant,
            &ext,
        );
        self.store
            .put(&self.bucket, &key, bytes, &content_type_for(&ext))
            .await?;
        Ok(key)
    }

    /// Archives a single resource
    ///
    /// Never fails; the returned record's status says how far it got.
    pub async fn archive_one(
        &self,
        mut resource: LeafResource,
        resolved: Option<&ResolvedUrl>,
    ) -> ArchivedAsset {
        let Some(baseline_url) = resolved.and_then(|r| r.baseline_url.clone()) else {
            return ArchivedAsset::degraded(resource, ArchiveStatus::Unresolved);
        };

        let bytes = match self.fetcher.fetch_asset(&baseline_url).await.into_outcome().ok() {
            Some(bytes) => bytes,
            None => {
                let reason = format!("download failed: {}", baseline_url);
                tracing::warn!("Photo {}: {}", resource.resource_id, reason);
                return ArchivedAsset::degraded(resource, ArchiveStatus::Failed { reason });
            }
        };

        let extracted = extract_metadata(&bytes);
        if let Some(metadata) = &extracted {
            resource
                .dates
                .record_metadata_date(metadata.date_time_original.clone());
        }

        let (stored_baseline_key, archive_status) = match self
            .store_variant(&resource, &baseline_url, Variant::Baseline, bytes)
            .await
        {
            Ok(key) => (Some(key), ArchiveStatus::Archived),
            Err(e) => {
                tracing::warn!("Photo {}: upload failed: {}", resource.resource_id, e);
                (
                    None,
                    ArchiveStatus::Partial {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let upgrade_url = resolved.and_then(|r| r.upgrade_url.as_deref());
        let stored_upgrade_key = match upgrade_url {
            Some(url) => self.store_upgrade(&resource, url).await,
            None => None,
        };

        ArchivedAsset {
            baseline_public_url: stored_baseline_key
                .as_deref()
                .map(|key| public_url(&self.public_base, key)),
            upgrade_public_url: stored_upgrade_key
                .as_deref()
                .map(|key| public_url(&self.public_base, key)),
            stored_baseline_key,
            stored_upgrade_key,
            extracted_metadata: extracted,
            archive_status,
            resource,
        }
    }

    /// Best-effort full-size copy; failures only show up at debug level
    async fn store_upgrade(&self, resource: &LeafResource, url: &str) -> Option<String> {
        let bytes = match self.fetcher.fetch_asset(url).await.into_outcome() {
            Outcome::Ok(bytes) => bytes,
            other => {
                tracing::debug!(
                    "Photo {}: full-size download skipped: {}",
                    resource.resource_id,
                    other.reason().unwrap_or("unknown error")
                );
                return None;
            }
        };

        match self.store_variant(resource, url, Variant::Upgrade, bytes).await {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!("Photo {}: full-size upload skipped: {}", resource.resource_id, e);
                None
            }
        }
    }

    /// Archives every resource of a container, in the container's order
    pub async fn archive_container(
        &self,
        container: &Container,
        resolved: &BTreeMap<String, ResolvedUrl>,
    ) -> Vec<ArchivedAsset> {
        let mut slots: Vec<Option<ArchivedAsset>> = vec![None; container.resources.len()];

        let mut results = stream::iter(container.resources.iter().enumerate())
            .map(|(idx, resource)| async move {
                let asset = self
                    .archive_one(resource.clone(), resolved.get(&resource.resource_id))
                    .await;
                (idx, asset)
            })
            .buffer_unordered(self.workers);

        while let Some((idx, asset)) = results.next().await {
            slots[idx] = Some(asset);
        }

        slots.into_iter().flatten().collect()
    }

    /// Archives containers in order and writes each one's dataset
    ///
    /// A container's `photos.json` and `meta.json` are written only after
    /// all of its resources finished. Curated values already on disk are
    /// kept; an unreadable earlier dataset is replaced. A container whose
    /// directory name was already claimed by another slug in this run is
    /// skipped.
    pub async fn run(
        &self,
        containers: &[Container],
        resolved: &BTreeMap<String, ResolvedUrl>,
        containers_dir: &Path,
        limit: Option<usize>,
    ) -> Result<ArchiveReport, HarvestError> {
        let mut report = ArchiveReport::default();
        let budget = limit.unwrap_or(containers.len()).min(containers.len());

        let mut claimed: HashMap<PathBuf, &str> = HashMap::new();

        for (i, container) in containers.iter().take(budget).enumerate() {
            let dir = container_dir(containers_dir, &container.slug);
            if let Some(owner) = claimed.get(&dir) {
                tracing::warn!(
                    "[{}/{}] {}: skipped, {} already uses {}",
                    i + 1,
                    budget,
                    container.slug,
                    owner,
                    dir.display()
                );
                report.dir_collisions += 1;
                continue;
            }
            claimed.insert(dir, container.slug.as_str());

            let mut assets = self.archive_container(container, resolved).await;

            let stories = match load_container_dataset(containers_dir, &container.slug) {
                Ok(Some((meta, previous))) => {
                    carry_canonical_dates(&previous, &mut assets);
                    meta.stories
                }
                Ok(None) => Vec::new(),
                Err(e) => {
                    tracing::warn!(
                        "{}: earlier dataset unreadable, rewriting without carry-over: {}",
                        container.slug,
                        e
                    );
                    Vec::new()
                }
            };

            write_container_dataset(containers_dir, container, &assets, stories)?;

            let stored = assets
                .iter()
                .filter(|a| a.stored_baseline_key.is_some())
                .count();
            tracing::info!(
                "[{}/{}] {}: {}/{} photos stored",
                i + 1,
                budget,
                container.label(),
                stored,
                assets.len()
            );

            report.containers += 1;
            for asset in &assets {
                report.record(asset);
            }
        }

        tracing::info!(
            "Archiving completed: {} containers, {} photos ({} archived, {} partial, {} unresolved, {} failed)",
            report.containers,
            report.assets,
            report.archived,
            report.partial,
            report.unresolved,
            report.failed
        );
        Ok(report)
    }
}

/// Copies human-curated dates from a previous run onto fresh records
pub fn carry_canonical_dates(previous: &[ArchivedAsset], assets: &mut [ArchivedAsset]) {
    let curated: HashMap<&str, &str> = previous
        .iter()
        .filter_map(|a| {
            a.resource
                .dates
                .date_canonical()
                .map(|date| (a.resource.resource_id.as_str(), date))
        })
        .collect();

    for asset in assets.iter_mut() {
        if asset.resource.dates.date_canonical().is_some() {
            continue;
        }
        if let Some(date) = curated.get(asset.resource.resource_id.as_str()) {
            asset.resource.dates.set_canonical(*date);
        }
    }
}
