//! Gallery-Harvest: a polite, resumable archiver for defunct community galleries
//!
//! This crate maps a gallery site's container hierarchy, resolves each photo's
//! asset URL, downloads and stores the assets in a blob store, and writes the
//! structured JSON dataset a static site consumes.

pub mod archiver;
pub mod blob;
pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Gallery-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Required input artifact missing: {0}")]
    MissingInput(PathBuf),

    #[error("Blob store error: {0}")]
    Blob(#[from] blob::BlobError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ContainerState,
        to: state::ContainerState,
    },

    #[error("Fatal: {0}")]
    Fatal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use config::Config;
pub use model::{ArchivedAsset, Container, LeafResource, Outcome, ResolvedUrl};
pub use state::ContainerState;
