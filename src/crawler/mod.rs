//! Crawler module for walking the gallery hierarchy
//!
//! This module contains the mapping side of the harvester:
//! - Rate-limited fetching with per-call timeouts
//! - HTML parsing of index, container, listing and patch pages
//! - Date inference from container slugs
//! - The sequential, checkpointed mapper

mod fetcher;
mod mapper;
mod parser;
mod slug;

pub use fetcher::{build_http_client, FetchResult, Fetcher, ProbeResult, Timeouts};
pub use mapper::{MapOptions, MapReport, Mapper};
pub use parser::{
    extract_containers, extract_listing_resources, extract_owner_dirs, extract_patches, OwnerDir,
};
pub use slug::{infer_dates, SlugDates};
