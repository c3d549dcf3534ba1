//! Resource tree mapper
//!
//! Walks index → containers → owner directories → listing pages one request
//! at a time, in discovery order. Each container is driven through its
//! lifecycle (`discovered → enumerated → resourced → checkpointed`) within a
//! single iteration before it reaches the checkpoint store. A completed run
//! also maps the patch gallery and writes the mapping summary.

use crate::checkpoint::CheckpointStore;
use crate::config::{OutputConfig, SiteConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{
    extract_containers, extract_listing_resources, extract_owner_dirs, extract_patches,
};
use crate::model::{Container, ContainerSummary, Outcome, Patch};
use crate::output::{write_gallery_index, write_json_pretty, write_patches_index, MapSummary};
use crate::state::ContainerProgress;
use crate::HarvestError;
use url::Url;

/// Knobs for one mapping run
#[derive(Debug, Clone, Copy)]
pub struct MapOptions {
    /// Flush the progress file after this many newly mapped containers
    pub checkpoint_every: usize,
    /// Stop after mapping this many pending containers
    pub limit: Option<usize>,
}

/// Counters reported at the end of a mapping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReport {
    pub discovered: usize,
    pub already_mapped: usize,
    pub mapped: usize,
    pub resources: usize,
    /// Container or owner pages that could not be fetched
    pub failed_pages: usize,
    /// Whether gallery_full.json was written and the progress file removed
    pub finalized: bool,
    /// Patch gallery entries, mapped only by a completed run
    pub patches: usize,
}

/// Listing page inside an owner directory, whether or not its href ended
/// in a slash
fn listing_url(owner_url: &str, listing_page: &str) -> Result<String, url::ParseError> {
    let mut dir = Url::parse(owner_url)?;
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    Ok(dir.join(listing_page)?.to_string())
}

/// Sequential mapper over the gallery hierarchy
pub struct Mapper {
    site: SiteConfig,
    fetcher: Fetcher,
    site_base: Url,
    gallery_base: Url,
    patches_base: Url,
}

impl Mapper {
    pub fn new(site: SiteConfig, fetcher: Fetcher) -> Result<Self, HarvestError> {
        let site_base = Url::parse(&site.base_url)?;
        let gallery_base = Url::parse(&site.gallery_url())?;
        let patches_base = Url::parse(&site.patches_url())?;
        Ok(Self {
            site,
            fetcher,
            site_base,
            gallery_base,
            patches_base,
        })
    }

    /// Fetches the gallery index and lists its containers
    ///
    /// Containers come back sorted by `(year or 0, slug)`. An unreachable
    /// index leaves nothing to map and is fatal for the phase.
    pub async fn discover(&self) -> Result<Vec<ContainerSummary>, HarvestError> {
        let index_url = self.site.index_url();
        tracing::info!("Fetching gallery index {}", index_url);

        let outcome = self
            .fetcher
            .fetch_page(&index_url)
            .await
            .into_outcome()
            .escalate(&format!("gallery index {} unavailable", index_url));
        let Some(html) = outcome.into_result()? else {
            return Ok(Vec::new());
        };

        let mut containers = extract_containers(&html, &self.gallery_base);
        containers.sort_by(|a, b| {
            (a.year.unwrap_or(0), &a.slug).cmp(&(b.year.unwrap_or(0), &b.slug))
        });

        tracing::info!("Discovered {} containers", containers.len());
        Ok(containers)
    }

    /// Enumerates and resources one container
    ///
    /// Fetch failures give the affected node zero resources; the returned
    /// count says how many pages failed.
    pub async fn map_container(
        &self,
        summary: ContainerSummary,
    ) -> Result<(Container, usize), HarvestError> {
        let mut failed_pages = 0;
        let container_url = Url::parse(&summary.url)?;
        let container_date = summary.date_label.clone();
        let mut progress = ContainerProgress::discovered(summary.into());

        let owners = match self.fetcher.fetch_page(container_url.as_str()).await.into_outcome() {
            Outcome::Ok(html) => extract_owner_dirs(&html, &container_url)
                .into_iter()
                .map(|dir| (dir.owner, dir.url))
                .collect(),
            other => {
                tracing::warn!(
                    "Container {} unavailable: {}",
                    container_url,
                    other.reason().unwrap_or("unknown error")
                );
                failed_pages += 1;
                Vec::new()
            }
        };
        progress.enumerated(owners)?;

        let owners = progress.owners().to_vec();
        for (owner, owner_url) in owners {
            let listing_url = match listing_url(&owner_url, &self.site.listing_page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Owner directory {} unusable: {}", owner_url, e);
                    failed_pages += 1;
                    continue;
                }
            };
            let resources = match self.fetcher.fetch_page(&listing_url).await.into_outcome() {
                Outcome::Ok(html) => extract_listing_resources(
                    &html,
                    &self.site_base,
                    &owner,
                    container_date.as_deref(),
                ),
                other => {
                    tracing::warn!(
                        "Listing {} unavailable: {}",
                        listing_url,
                        other.reason().unwrap_or("unknown error")
                    );
                    failed_pages += 1;
                    Vec::new()
                }
            };
            tracing::debug!("{}: {} photos", owner, resources.len());
            progress.add_resources(resources)?;
        }

        progress.resourced()?;
        Ok((progress.checkpoint()?, failed_pages))
    }

    /// Lists the patch gallery; an unreachable page yields no patches
    pub async fn map_patches(&self) -> Vec<Patch> {
        let url = self.patches_base.as_str();
        tracing::info!("Mapping patch gallery {}", url);

        match self.fetcher.fetch_page(url).await.into_outcome() {
            Outcome::Ok(html) => {
                let patches = extract_patches(&html, &self.patches_base);
                tracing::info!("Found {} patches", patches.len());
                patches
            }
            other => {
                tracing::warn!(
                    "Patch gallery {} unavailable: {}",
                    url,
                    other.reason().unwrap_or("unknown error")
                );
                Vec::new()
            }
        }
    }

    /// Runs a full mapping pass against the checkpoint store
    ///
    /// Containers already in the store are skipped without any request. A
    /// run cut short by `limit` flushes and leaves the progress file in place
    /// so the next run resumes; a complete run writes gallery_full.json and
    /// removes the progress file.
    pub async fn run(
        &self,
        store: &mut CheckpointStore,
        output: &OutputConfig,
        options: MapOptions,
    ) -> Result<MapReport, HarvestError> {
        let discovered = self.discover().await?;
        write_gallery_index(&output.gallery_index_path(), &discovered)?;

        let discovery: Vec<String> = discovered.iter().map(|c| c.slug.clone()).collect();
        let mut report = MapReport {
            discovered: discovered.len(),
            ..MapReport::default()
        };

        let pending: Vec<ContainerSummary> = discovered
            .into_iter()
            .filter(|c| !store.contains(&c.slug))
            .collect();
        report.already_mapped = report.discovered - pending.len();

        let budget = options.limit.unwrap_or(pending.len()).min(pending.len());
        let total = pending.len();
        tracing::info!(
            "{} containers to map ({} already done)",
            total,
            report.already_mapped
        );

        let start_time = std::time::Instant::now();
        for (i, summary) in pending.into_iter().take(budget).enumerate() {
            let (container, failed) = self.map_container(summary).await?;

            tracing::info!(
                "[{}/{}] {}: {} photos",
                i + 1,
                total,
                container.label(),
                container.resource_count
            );

            report.mapped += 1;
            report.resources += container.resource_count;
            report.failed_pages += failed;
            store.insert(container);

            if store.unflushed() >= options.checkpoint_every {
                store.flush()?;
            }
        }

        if budget < total {
            store.flush()?;
            tracing::info!(
                "Stopped after {} containers; {} remain for the next run",
                budget,
                total - budget
            );
            return Ok(report);
        }

        let containers = store.finalize(&discovery, &output.gallery_full_path())?;
        report.finalized = true;

        let patches = self.map_patches().await;
        write_patches_index(&output.patches_index_path(), &patches)?;
        report.patches = patches.len();

        let summary = MapSummary::build(&containers, &patches);
        write_json_pretty(&output.summary_path(), &summary)?;

        tracing::info!(
            "Mapping completed: {} containers, {} photos in {:?}",
            report.mapped,
            report.resources,
            start_time.elapsed()
        );
        Ok(report)
    }
}
