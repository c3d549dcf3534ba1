//! Output module for the harvester's JSON artifacts
//!
//! This module handles:
//! - Atomic, indented JSON writes and typed reads
//! - Per-phase artifacts (gallery and patch indexes, mapping summary,
//!   resolved URLs, container datasets)
//! - The index.json summary and console statistics

mod json;
pub mod stats;
mod writer;

pub use json::{read_json, write_json_pretty};
pub use stats::{
    gallery_statistics, print_archive_report, print_gallery_statistics, print_map_report,
    print_resolution_report, GalleryStatistics,
};
pub use writer::{
    container_dir, load_container_dataset, load_gallery, load_patches, load_resolved_urls,
    write_container_dataset, write_gallery_index, write_index, write_patches_index,
    write_resolved_urls, ContainerMeta, GallerySource, IndexEntry, IndexSummary, MapSummary,
};
