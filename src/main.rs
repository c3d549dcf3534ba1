//! Gallery-Harvest main entry point
//!
//! This is the command-line interface for the gallery harvester.

use anyhow::Context;
use clap::Parser;
use gallery_harvest::config::{load_config_with_hash, load_storage_config, Config};
use gallery_harvest::output::{
    gallery_statistics, load_gallery, print_archive_report, print_gallery_statistics,
    print_map_report, print_resolution_report,
};
use gallery_harvest::pipeline::{run, Phase, RunOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gallery-Harvest: a polite, resumable archiver for defunct galleries
///
/// Maps the gallery hierarchy, resolves each photo's asset URLs, stores the
/// assets in an S3-compatible bucket and writes the JSON dataset a static
/// site reads. Every phase can be re-run on its own.
#[derive(Parser, Debug)]
#[command(name = "gallery-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite, resumable gallery archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Phase to run
    #[arg(long, value_enum, default_value = "all")]
    phase: Phase,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard the mapping checkpoint and map from scratch
    #[arg(long)]
    fresh: bool,

    /// Process at most N containers (map and archive phases)
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Flush the mapping checkpoint every N containers
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    checkpoint_every: Option<u64>,

    /// Validate config and show what would run without making requests
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the mapped gallery and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let options = RunOptions {
        fresh: cli.fresh,
        limit: cli.limit,
        checkpoint_every: cli.checkpoint_every.map(|n| n as usize),
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.phase, options)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(&config, cli.phase, options).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gallery_harvest=info,warn"),
            1 => EnvFilter::new("gallery_harvest=debug,info"),
            2 => EnvFilter::new("gallery_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: validates everything the selected phase needs
fn handle_dry_run(config: &Config, phase: Phase, options: RunOptions) -> anyhow::Result<()> {
    println!("=== Gallery-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Index: {}", config.site.index_url());
    println!("  Listing page: {}", config.site.listing_page);
    println!("  Patches: {}", config.site.patches_url());
    println!("  Key category: {}", config.site.category);

    println!("\nFetcher:");
    println!("  Mapper delay: {}ms", config.fetcher.mapper_delay_ms);
    println!("  Worker delay: {}ms", config.fetcher.worker_delay_ms);
    println!(
        "  Timeouts: page {}s, probe {}s, asset {}s",
        config.fetcher.page_timeout_secs,
        config.fetcher.probe_timeout_secs,
        config.fetcher.asset_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nPipeline:");
    println!("  Phase: {:?}", phase);
    println!("  Workers: {}", config.pipeline.workers);
    println!(
        "  Checkpoint every: {} containers",
        options
            .checkpoint_every
            .unwrap_or(config.pipeline.checkpoint_every)
    );
    if let Some(limit) = options.limit {
        println!("  Limit: {} containers", limit);
    }
    if options.fresh {
        println!("  Fresh: previous progress will be discarded");
    }

    println!("\nOutput:");
    println!("  Scraper dir: {}", config.output.scraper_dir.display());
    println!("  Data dir: {}", config.output.data_dir.display());
    let progress = config.output.progress_path();
    if progress.exists() && !options.fresh {
        println!("  Resuming from: {}", progress.display());
    }

    if phase.needs_storage() {
        let storage = load_storage_config()?;
        println!("\nStorage:");
        println!("  Endpoint: {}", storage.endpoint);
        println!("  Bucket: {}", storage.bucket);
        println!("  Public URL: {}", storage.public_url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles --stats: summarizes the mapped gallery
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let (containers, _) = load_gallery(&config.output)?;
    print_gallery_statistics(&gallery_statistics(&containers));
    Ok(())
}

/// Runs the selected phases and prints their reports
async fn handle_run(config: &Config, phase: Phase, options: RunOptions) -> anyhow::Result<()> {
    if options.fresh {
        tracing::info!("Starting fresh (ignoring previous mapping progress)");
    }

    let summary = match run(config, phase, options).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(report) = &summary.map {
        print_map_report(report);
    }
    if let Some(report) = &summary.resolution {
        print_resolution_report(report);
    }
    if let Some(report) = &summary.archive {
        print_archive_report(report);
    }
    if let Some(index) = &summary.index {
        println!(
            "Index: {} containers, {} photos, {} patches",
            index.container_count, index.total_resources, index.patches
        );
    }

    tracing::info!("Run completed successfully");
    Ok(())
}
