//! Rate-limited HTTP fetcher
//!
//! This is the only component that talks to the remote site. Every call
//! waits a fixed politeness delay first and runs under a bounded timeout.
//! Nothing is retried here; callers decide what a failure means.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::model::Outcome;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<B> {
    /// Server answered 2xx
    Success {
        /// Response body
        body: B,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection failure, timeout, or body read error
    NetworkError {
        /// Error description
        error: String,
    },
}

impl<B> FetchResult<B> {
    /// Every failure is per-item: it degrades, it never aborts
    pub fn into_outcome(self) -> Outcome<B> {
        match self {
            Self::Success { body, .. } => Outcome::Ok(body),
            Self::HttpError { status_code } => Outcome::degraded(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Outcome::Degraded(error),
        }
    }
}

/// Result of an existence probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Server answered with this status; redirects are not followed
    Status(u16),
    /// No usable answer
    NetworkError { error: String },
}

impl ProbeResult {
    /// Only an exact 200 counts as "exists"
    pub fn exists(&self) -> bool {
        matches!(self, Self::Status(200))
    }
}

/// Per-request timeouts
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub page: Duration,
    pub probe: Duration,
    pub asset: Duration,
}

impl Timeouts {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            page: Duration::from_secs(config.page_timeout_secs),
            probe: Duration::from_secs(config.probe_timeout_secs),
            asset: Duration::from_secs(config.asset_timeout_secs),
        }
    }
}

/// Builds the HTTP client used for pages and assets
///
/// # Example
///
/// ```no_run
/// use gallery_harvest::config::UserAgentConfig;
/// use gallery_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Gallery-Harvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.org/about".to_string(),
///     contact_email: "archive@example.org".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the client used for existence probes
///
/// A redirect is reported as its own 3xx status so that a soft-404 page
/// behind it cannot pass for the probed asset.
fn build_probe_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .build()
}

/// Wraps the HTTP client with a fixed per-call delay and timeouts
///
/// Cloning is cheap; pool workers each hold a clone and sleep independently,
/// so the aggregate request rate is roughly pool width / delay.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    probe_client: Client,
    delay: Duration,
    timeouts: Timeouts,
}

impl Fetcher {
    pub fn new(
        user_agent: &UserAgentConfig,
        delay: Duration,
        timeouts: Timeouts,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            probe_client: build_probe_client(user_agent)?,
            delay,
            timeouts,
        })
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Fetches an HTML page and decodes it as text
    pub async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        self.pause().await;
        tracing::trace!("GET {}", url);

        let response = match self.client.get(url).timeout(self.timeouts.page).send().await {
            Ok(r) => r,
            Err(e) => return network_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => FetchResult::Success { body },
            Err(e) => network_error(e),
        }
    }

    /// Fetches a binary asset
    pub async fn fetch_asset(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.pause().await;
        tracing::trace!("GET {} (asset)", url);

        let response = match self.client.get(url).timeout(self.timeouts.asset).send().await {
            Ok(r) => r,
            Err(e) => return network_error(e),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        match response.bytes().await {
            Ok(bytes) => FetchResult::Success {
                body: bytes.to_vec(),
            },
            Err(e) => network_error(e),
        }
    }

    /// Sends a HEAD request and reports the status
    pub async fn probe(&self, url: &str) -> ProbeResult {
        self.pause().await;
        tracing::trace!("HEAD {}", url);

        match self
            .probe_client
            .head(url)
            .timeout(self.timeouts.probe)
            .send()
            .await
        {
            Ok(response) => ProbeResult::Status(response.status().as_u16()),
            Err(e) => ProbeResult::NetworkError { error: describe(&e) },
        }
    }
}

fn network_error<B>(e: reqwest::Error) -> FetchResult<B> {
    FetchResult::NetworkError { error: describe(&e) }
}

/// Classifies a client error into a short description
fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
