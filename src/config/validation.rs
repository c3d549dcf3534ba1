use crate::config::types::{
    Config, FetcherConfig, OutputConfig, PipelineConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.gallery_path.starts_with('/') || !config.gallery_path.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "gallery_path must start and end with '/', got '{}'",
            config.gallery_path
        )));
    }

    if !config.patches_path.starts_with('/') || !config.patches_path.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "patches_path must start and end with '/', got '{}'",
            config.patches_path
        )));
    }

    if config.listing_page.is_empty() || config.listing_page.contains('/') {
        return Err(ConfigError::Validation(format!(
            "listing_page must be a bare file name, got '{}'",
            config.listing_page
        )));
    }

    if config.category.is_empty()
        || !config
            .category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "category must be non-empty and contain only [A-Za-z0-9_-], got '{}'",
            config.category
        )));
    }

    Ok(())
}

/// Validates politeness delays and timeouts
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    for (name, delay) in [
        ("mapper_delay_ms", config.mapper_delay_ms),
        ("worker_delay_ms", config.worker_delay_ms),
    ] {
        if !(100..=60_000).contains(&delay) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 100 and 60000 ms, got {}ms",
                name, delay
            )));
        }
    }

    for (name, timeout) in [
        ("page_timeout_secs", config.page_timeout_secs),
        ("probe_timeout_secs", config.probe_timeout_secs),
        ("asset_timeout_secs", config.asset_timeout_secs),
    ] {
        if timeout < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1s, got {}s",
                name, timeout
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates worker pool sizing
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_every must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.scraper_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "scraper_dir cannot be empty".to_string(),
        ));
    }

    if config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
