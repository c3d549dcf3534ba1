//! Configuration module for Gallery-Harvest
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, plus the blob-store settings that come from the environment.
//!
//! # Example
//!
//! ```no_run
//! use gallery_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Index lives at {}", config.site.index_url());
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, OutputConfig, PipelineConfig, SiteConfig, StorageConfig,
    UserAgentConfig,
};

// Re-export loader functions
pub use env::{load_storage_config, storage_config_from_lookup};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
