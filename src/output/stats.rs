//! Gallery statistics and end-of-phase reports
//!
//! This module summarizes the mapped gallery and prints the counters each
//! phase collects.

use crate::archiver::ArchiveReport;
use crate::crawler::MapReport;
use crate::model::Container;
use crate::resolver::ResolutionReport;
use std::collections::BTreeMap;

/// Summary of a mapped gallery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryStatistics {
    /// Total number of containers
    pub containers: usize,

    /// Total number of photos across all containers
    pub resources: usize,

    /// Containers that ended up with no photos
    pub empty_containers: usize,

    /// Distinct photographers
    pub owners: usize,

    /// Containers per inferred year; None collects undated ones
    pub containers_by_year: BTreeMap<Option<i32>, usize>,
}

/// Computes statistics for a mapped gallery
pub fn gallery_statistics(containers: &[Container]) -> GalleryStatistics {
    let mut stats = GalleryStatistics {
        containers: containers.len(),
        ..GalleryStatistics::default()
    };
    let mut owners = std::collections::HashSet::new();

    for container in containers {
        stats.resources += container.resource_count;
        if container.resource_count == 0 {
            stats.empty_containers += 1;
        }
        *stats.containers_by_year.entry(container.year).or_insert(0) += 1;
        owners.extend(container.resources.iter().map(|r| r.owner.as_str()));
    }

    stats.owners = owners.len();
    stats
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints gallery statistics to stdout in a formatted manner
pub fn print_gallery_statistics(stats: &GalleryStatistics) {
    println!("=== Gallery Statistics ===\n");

    println!("Overview:");
    println!("  Containers: {}", stats.containers);
    println!("  Photos: {}", stats.resources);
    println!("  Photographers: {}", stats.owners);
    println!(
        "  Empty containers: {} ({:.1}%)",
        stats.empty_containers,
        percentage(stats.empty_containers, stats.containers)
    );
    println!();

    println!("Containers by Year:");
    for (year, count) in &stats.containers_by_year {
        match year {
            Some(year) => println!("  {}: {}", year, count),
            None => println!("  undated: {}", count),
        }
    }
}

pub fn print_map_report(report: &MapReport) {
    println!("=== Mapping ===\n");
    println!("  Discovered: {}", report.discovered);
    println!("  Already mapped: {}", report.already_mapped);
    println!("  Mapped this run: {}", report.mapped);
    println!("  Photos found this run: {}", report.resources);
    println!("  Unreachable pages: {}", report.failed_pages);
    if report.finalized {
        println!("  Patches: {}", report.patches);
        println!("  Status: complete");
    } else {
        println!("  Status: partial (re-run to resume)");
    }
    println!();
}

pub fn print_resolution_report(report: &ResolutionReport) {
    println!("=== Resolution ===\n");
    println!("  Attempted: {}", report.attempted);
    println!(
        "  Resolved: {} ({:.1}%)",
        report.baseline_found,
        percentage(report.baseline_found, report.attempted)
    );
    println!(
        "  Full-size variant: {} ({:.1}%)",
        report.upgraded,
        percentage(report.upgraded, report.attempted)
    );
    println!();
}

pub fn print_archive_report(report: &ArchiveReport) {
    println!("=== Archiving ===\n");
    println!("  Containers written: {}", report.containers);
    println!("  Photos processed: {}", report.assets);
    println!(
        "  Archived: {} ({:.1}%)",
        report.archived,
        percentage(report.archived, report.assets)
    );
    println!("  Upload failed: {}", report.partial);
    println!("  Unresolved: {}", report.unresolved);
    println!("  Download failed: {}", report.failed);
    println!("  Full-size stored: {}", report.upgrades_stored);
    println!("  With EXIF metadata: {}", report.with_metadata);
    if report.dir_collisions > 0 {
        println!("  Skipped (directory clash): {}", report.dir_collisions);
    }
    println!();
}
