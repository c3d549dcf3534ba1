//! Checkpoint store for resumable mapping
//!
//! This module keeps fully mapped containers keyed by slug and persists them
//! to a progress file, so an interrupted mapping run resumes without
//! re-fetching finished containers:
//! - `open` loads an existing progress file
//! - `insert` merges one completed container
//! - `flush` writes the progress file
//! - `finalize` writes the complete output and removes the progress file
//!
//! The store is owned by the single-threaded mapper; it needs no locking.

use crate::model::Container;
use crate::output::{read_json, write_json_pretty};
use crate::HarvestError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Durable map from slug to completed container
#[derive(Debug)]
pub struct CheckpointStore {
    progress_path: PathBuf,
    entries: HashMap<String, Container>,
    order: Vec<String>,
    unflushed: usize,
}

impl CheckpointStore {
    /// Opens the store, loading the progress file if one exists
    pub fn open(progress_path: &Path) -> Result<Self, HarvestError> {
        let mut store = Self::empty(progress_path);

        if progress_path.exists() {
            let containers: Vec<Container> = read_json(progress_path)?;
            for container in containers {
                store.merge(container);
            }
            store.unflushed = 0;
            tracing::info!(
                "Resuming: {} containers already mapped in {}",
                store.len(),
                progress_path.display()
            );
        }

        Ok(store)
    }

    /// Opens an empty store, discarding any previous progress file
    pub fn fresh(progress_path: &Path) -> Result<Self, HarvestError> {
        match std::fs::remove_file(progress_path) {
            Ok(()) => tracing::info!("Discarded previous progress {}", progress_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Self::empty(progress_path))
    }

    fn empty(progress_path: &Path) -> Self {
        Self {
            progress_path: progress_path.to_path_buf(),
            entries: HashMap::new(),
            order: Vec::new(),
            unflushed: 0,
        }
    }

    fn merge(&mut self, container: Container) {
        let slug = container.slug.clone();
        if self.entries.insert(slug.clone(), container).is_none() {
            self.order.push(slug);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    pub fn get(&self, slug: &str) -> Option<&Container> {
        self.entries.get(slug)
    }

    /// Containers merged since the last flush
    pub fn unflushed(&self) -> usize {
        self.unflushed
    }

    /// Merges a fully mapped container
    ///
    /// Re-inserting a slug replaces the earlier entry in place.
    pub fn insert(&mut self, container: Container) {
        self.merge(container);
        self.unflushed += 1;
    }

    /// Writes every stored container to the progress file
    pub fn flush(&mut self) -> Result<(), HarvestError> {
        let containers: Vec<&Container> = self
            .order
            .iter()
            .filter_map(|slug| self.entries.get(slug))
            .collect();
        write_json_pretty(&self.progress_path, &containers)?;
        self.unflushed = 0;
        tracing::info!(
            "Checkpoint saved: {} containers -> {}",
            containers.len(),
            self.progress_path.display()
        );
        Ok(())
    }

    /// Containers in discovery order, followed by any stored slug that the
    /// current discovery pass no longer lists
    pub fn ordered(&self, discovery: &[String]) -> Vec<Container> {
        let mut emitted = HashSet::new();
        let mut result = Vec::with_capacity(self.entries.len());

        for slug in discovery.iter().chain(self.order.iter()) {
            if let Some(container) = self.entries.get(slug) {
                if emitted.insert(slug.as_str()) {
                    result.push(container.clone());
                }
            }
        }

        result
    }

    /// Writes the complete output and removes the progress file
    ///
    /// A resumed-then-completed run produces the same file as a one-pass run.
    pub fn finalize(&self, discovery: &[String], full_path: &Path) -> Result<Vec<Container>, HarvestError> {
        let containers = self.ordered(discovery);
        write_json_pretty(full_path, &containers)?;

        match std::fs::remove_file(&self.progress_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Saved {} ({} containers)",
            full_path.display(),
            containers.len()
        );
        Ok(containers)
    }
}
