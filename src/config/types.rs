use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Gallery-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// Layout of the site being archived
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin of the site, e.g. "http://scoot.net"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the gallery index relative to the origin
    #[serde(rename = "gallery-path", default = "default_gallery_path")]
    pub gallery_path: String,

    /// Query string that makes the index list every year
    #[serde(rename = "index-query", default = "default_index_query")]
    pub index_query: String,

    /// Compact per-owner listing page name
    #[serde(rename = "listing-page", default = "default_listing_page")]
    pub listing_page: String,

    /// First segment of every blob-store key
    #[serde(default = "default_category")]
    pub category: String,

    /// Path of the patch gallery relative to the origin
    #[serde(rename = "patches-path", default = "default_patches_path")]
    pub patches_path: String,
}

/// Politeness and timeout settings for the rate-limited fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Delay before every request made by the sequential mapper (milliseconds)
    #[serde(rename = "mapper-delay-ms")]
    pub mapper_delay_ms: u64,

    /// Delay before every request made by a pool worker (milliseconds)
    #[serde(rename = "worker-delay-ms")]
    pub worker_delay_ms: u64,

    /// Timeout for HTML page fetches (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for existence probes (seconds)
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Timeout for asset downloads (seconds)
    #[serde(rename = "asset-timeout-secs")]
    pub asset_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Worker pool and checkpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Width of the resolver and archiver worker pools
    pub workers: usize,

    /// Flush the mapping checkpoint every N containers
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for mapping and resolution artifacts
    #[serde(rename = "scraper-dir")]
    pub scraper_dir: PathBuf,

    /// Directory for the per-container dataset and index.json
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,
}

/// Blob-store settings taken from the environment
#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// Public base URL objects are served from, without trailing slash
    pub public_url: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("public_url", &self.public_url)
            .finish()
    }
}

fn default_gallery_path() -> String {
    "/gallery/".to_string()
}

fn default_index_query() -> String {
    "year=all".to_string()
}

fn default_listing_page() -> String {
    "tinyindex.html".to_string()
}

fn default_category() -> String {
    "gallery".to_string()
}

fn default_patches_path() -> String {
    "/patches/".to_string()
}

fn default_checkpoint_every() -> usize {
    25
}

impl SiteConfig {
    /// Absolute URL of the gallery root, always ending in '/'
    pub fn gallery_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.gallery_path)
    }

    /// Absolute URL of the patch gallery
    pub fn patches_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.patches_path)
    }

    /// Absolute URL of the all-years gallery index
    pub fn index_url(&self) -> String {
        if self.index_query.is_empty() {
            self.gallery_url()
        } else {
            format!("{}?{}", self.gallery_url(), self.index_query)
        }
    }
}

impl OutputConfig {
    pub fn gallery_index_path(&self) -> PathBuf {
        self.scraper_dir.join("gallery_index.json")
    }

    pub fn gallery_full_path(&self) -> PathBuf {
        self.scraper_dir.join("gallery_full.json")
    }

    pub fn progress_path(&self) -> PathBuf {
        self.scraper_dir.join("gallery_full_progress.json")
    }

    pub fn patches_index_path(&self) -> PathBuf {
        self.scraper_dir.join("patches_index.json")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.scraper_dir.join("summary.json")
    }

    pub fn resolved_urls_path(&self) -> PathBuf {
        self.scraper_dir.join("resolved_urls.json")
    }

    pub fn containers_dir(&self) -> PathBuf {
        self.data_dir.join("rallies")
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index.json")
    }
}
