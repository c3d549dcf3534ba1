//! Artifact writers and loaders for each phase

use crate::config::OutputConfig;
use crate::model::{ArchivedAsset, Container, ContainerSummary, Patch, ResolvedUrl};
use crate::output::json::{read_json, write_json_pretty};
use crate::url::fs_safe_slug;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes gallery_index.json: discovered containers without resources
pub fn write_gallery_index(path: &Path, containers: &[ContainerSummary]) -> Result<(), HarvestError> {
    write_json_pretty(path, containers)?;
    tracing::info!("Saved {} ({} containers)", path.display(), containers.len());
    Ok(())
}

/// Writes patches_index.json
pub fn write_patches_index(path: &Path, patches: &[Patch]) -> Result<(), HarvestError> {
    write_json_pretty(path, patches)?;
    tracing::info!("Saved {} ({} patches)", path.display(), patches.len());
    Ok(())
}

/// Loads patches_index.json; the patch gallery is optional, so a missing
/// file is an empty list
pub fn load_patches(path: &Path) -> Result<Vec<Patch>, HarvestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_json(path)
}

/// summary.json: counts from a completed mapping run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    #[serde(rename = "rallies")]
    pub container_count: usize,
    #[serde(rename = "total_photos_mapped")]
    pub total_resources: usize,
    pub patches: usize,
}

impl MapSummary {
    pub fn build(containers: &[Container], patches: &[Patch]) -> Self {
        Self {
            container_count: containers.len(),
            total_resources: containers.iter().map(|c| c.resource_count).sum(),
            patches: patches.len(),
        }
    }
}

/// Writes resolved_urls.json in one piece
pub fn write_resolved_urls(
    path: &Path,
    resolved: &BTreeMap<String, ResolvedUrl>,
) -> Result<(), HarvestError> {
    write_json_pretty(path, resolved)?;
    tracing::info!("Saved {} ({} photos)", path.display(), resolved.len());
    Ok(())
}

pub fn load_resolved_urls(path: &Path) -> Result<BTreeMap<String, ResolvedUrl>, HarvestError> {
    read_json(path)
}

/// Where a loaded gallery came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GallerySource {
    Complete,
    /// The mapper has not finished; only checkpointed containers are present
    Progress,
}

/// Loads the mapped gallery, preferring the finished file over the
/// progress checkpoint
pub fn load_gallery(output: &OutputConfig) -> Result<(Vec<Container>, GallerySource), HarvestError> {
    let full = output.gallery_full_path();
    if full.exists() {
        tracing::info!("Loading {}", full.display());
        return Ok((read_json(&full)?, GallerySource::Complete));
    }

    let progress = output.progress_path();
    if progress.exists() {
        tracing::warn!(
            "Loading {} (mapping still in progress)",
            progress.display()
        );
        return Ok((read_json(&progress)?, GallerySource::Progress));
    }

    Err(HarvestError::MissingInput(full))
}

/// Per-container meta.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerMeta {
    #[serde(flatten)]
    pub summary: ContainerSummary,
    pub photo_count: usize,
    /// Curated entries maintained outside the harvester
    #[serde(default)]
    pub stories: Vec<serde_json::Value>,
}

/// Directory holding one container's dataset
pub fn container_dir(containers_dir: &Path, slug: &str) -> PathBuf {
    containers_dir.join(fs_safe_slug(slug))
}

/// Writes a container's photos.json and meta.json as one unit
///
/// Both documents are serialized and staged before either is renamed into
/// place, and `photo_count` is taken from the same asset list.
pub fn write_container_dataset(
    containers_dir: &Path,
    container: &Container,
    assets: &[ArchivedAsset],
    stories: Vec<serde_json::Value>,
) -> Result<PathBuf, HarvestError> {
    let dir = container_dir(containers_dir, &container.slug);
    fs::create_dir_all(&dir)?;

    let meta = ContainerMeta {
        summary: container.summary(),
        photo_count: assets.len(),
        stories,
    };

    let photos_path = dir.join("photos.json");
    let meta_path = dir.join("meta.json");
    let photos = to_pretty_bytes(&photos_path, assets)?;
    let meta = to_pretty_bytes(&meta_path, &meta)?;

    let photos_tmp = dir.join("photos.json.tmp");
    let meta_tmp = dir.join("meta.json.tmp");
    fs::write(&photos_tmp, photos)?;
    fs::write(&meta_tmp, meta)?;
    fs::rename(&photos_tmp, &photos_path)?;
    fs::rename(&meta_tmp, &meta_path)?;

    Ok(dir)
}

fn to_pretty_bytes<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Vec<u8>, HarvestError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Loads a previously written container dataset, if both files exist
pub fn load_container_dataset(
    containers_dir: &Path,
    slug: &str,
) -> Result<Option<(ContainerMeta, Vec<ArchivedAsset>)>, HarvestError> {
    let dir = container_dir(containers_dir, slug);
    let meta_path = dir.join("meta.json");
    let photos_path = dir.join("photos.json");
    if !meta_path.exists() || !photos_path.exists() {
        return Ok(None);
    }

    Ok(Some((read_json(&meta_path)?, read_json(&photos_path)?)))
}

/// One row of the slim container list in index.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub slug: String,
    pub title: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(rename = "date_rally")]
    pub date_label: Option<String>,
    pub photo_count: usize,
    pub url: String,
}

/// index.json: aggregate counts plus the slim container list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    #[serde(rename = "rallies")]
    pub container_count: usize,
    #[serde(rename = "total_photos_mapped")]
    pub total_resources: usize,
    pub patches: usize,
    pub generated_at: DateTime<Utc>,
    /// False while built from the progress checkpoint
    pub mapping_complete: bool,
    #[serde(rename = "rallies_list")]
    pub containers: Vec<IndexEntry>,
}

impl IndexSummary {
    pub fn build(
        containers: &[Container],
        patch_count: usize,
        source: GallerySource,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let entries: Vec<IndexEntry> = containers
            .iter()
            .map(|c| IndexEntry {
                slug: c.slug.clone(),
                title: c.title.clone(),
                year: c.year,
                month: c.month,
                date_label: c.date_label.clone(),
                photo_count: c.resource_count,
                url: c.url.clone(),
            })
            .collect();

        Self {
            container_count: entries.len(),
            total_resources: entries.iter().map(|e| e.photo_count).sum(),
            patches: patch_count,
            generated_at,
            mapping_complete: source == GallerySource::Complete,
            containers: entries,
        }
    }
}

pub fn write_index(path: &Path, index: &IndexSummary) -> Result<(), HarvestError> {
    write_json_pretty(path, index)?;
    tracing::info!(
        "Saved {} ({} containers, {} photos)",
        path.display(),
        index.container_count,
        index.total_resources
    );
    Ok(())
}
