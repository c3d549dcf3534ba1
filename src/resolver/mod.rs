//! URL resolver
//!
//! For every leaf resource: fetch its detail page, pull out the embedded
//! baseline asset, and probe the derived full-size candidate. Resources run
//! through a bounded pool; each result lands in the slot reserved for its
//! resource and slots are merged into the id-keyed table once the pool
//! drains.

mod extract;

pub use extract::{derive_upgrade, extract_baseline, SIZE_PREFIX_TOKEN};

use crate::crawler::Fetcher;
use crate::model::{LeafResource, Resolution, ResolvedUrl};
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};

/// Resolution results plus the counters logged at the end of the phase
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    /// Resource id → resolved locations, one entry per attempted resource
    pub resolved: BTreeMap<String, ResolvedUrl>,
    pub attempted: usize,
    pub baseline_found: usize,
    pub upgraded: usize,
}

impl ResolutionReport {
    fn from_results(resolved: BTreeMap<String, ResolvedUrl>) -> Self {
        let mut report = Self {
            attempted: resolved.len(),
            ..Self::default()
        };
        for url in resolved.values() {
            match url.resolution() {
                Resolution::Unresolved => {}
                Resolution::BaselineOnly => report.baseline_found += 1,
                Resolution::Upgraded => {
                    report.baseline_found += 1;
                    report.upgraded += 1;
                }
            }
        }
        report.resolved = resolved;
        report
    }
}

/// Resolves a single resource
///
/// Never fails: every fetch or parse miss degrades to null fields.
pub async fn resolve_one(fetcher: &Fetcher, site_base: &str, resource: &LeafResource) -> ResolvedUrl {
    let body = match fetcher.fetch_page(&resource.detail_url).await.into_outcome().ok() {
        Some(body) => body,
        None => {
            tracing::warn!(
                "Photo {}: detail page {} unavailable",
                resource.resource_id,
                resource.detail_url
            );
            return ResolvedUrl::unresolved();
        }
    };

    let Some(baseline) = extract_baseline(&body, site_base) else {
        tracing::warn!("Photo {}: no image on detail page", resource.resource_id);
        return ResolvedUrl::unresolved();
    };

    let upgrade = match derive_upgrade(&baseline) {
        Some(candidate) => {
            let probe = fetcher.probe(&candidate).await;
            if probe.exists() {
                Some(candidate)
            } else {
                tracing::debug!(
                    "Photo {}: no full-size variant at {} ({:?})",
                    resource.resource_id,
                    candidate,
                    probe
                );
                None
            }
        }
        None => None,
    };

    ResolvedUrl::baseline(baseline).with_upgrade(upgrade)
}

/// Resolves many resources through a pool of `workers` concurrent tasks
///
/// Resource ids are deduplicated first; the first occurrence wins.
pub async fn resolve_all(
    fetcher: &Fetcher,
    site_base: &str,
    resources: &[LeafResource],
    workers: usize,
) -> ResolutionReport {
    let mut seen = HashSet::new();
    let unique: Vec<&LeafResource> = resources
        .iter()
        .filter(|r| seen.insert(r.resource_id.as_str()))
        .collect();

    let total = unique.len();
    tracing::info!("Resolving {} photos with {} workers", total, workers);

    let mut slots: Vec<Option<ResolvedUrl>> = vec![None; total];
    let mut results = stream::iter(unique.iter().enumerate())
        .map(|(idx, resource)| async move {
            (idx, resolve_one(fetcher, site_base, resource).await)
        })
        .buffer_unordered(workers.max(1));

    let mut done = 0;
    while let Some((idx, resolved)) = results.next().await {
        slots[idx] = Some(resolved);
        done += 1;
        if done % 100 == 0 {
            tracing::info!("Progress: {}/{} photos resolved", done, total);
        }
    }

    let resolved = unique
        .iter()
        .zip(slots)
        .filter_map(|(resource, slot)| slot.map(|url| (resource.resource_id.clone(), url)))
        .collect();

    let report = ResolutionReport::from_results(resolved);
    tracing::info!(
        "Resolved {}/{} photos ({} with full-size variant)",
        report.baseline_found,
        report.attempted,
        report.upgraded
    );
    report
}
