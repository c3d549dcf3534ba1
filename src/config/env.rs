//! Blob-store settings from the process environment
//!
//! Credentials never live in the TOML file. They are read from the
//! environment (optionally seeded from a `.env` file) and checked up front so
//! the archiver fails before doing any network work.

use crate::config::types::StorageConfig;
use crate::ConfigError;

const ACCESS_KEY_VAR: &str = "R2_ACCESS_KEY_ID";
const SECRET_KEY_VAR: &str = "R2_SECRET_ACCESS_KEY";
const BUCKET_VAR: &str = "R2_BUCKET";
const PUBLIC_URL_VAR: &str = "R2_PUBLIC_URL";
const ENDPOINT_VAR: &str = "R2_ENDPOINT";
const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
const REGION_VAR: &str = "R2_REGION";

/// Reads the blob-store configuration from the environment
///
/// A `.env` file in the working directory is loaded first if present.
pub fn load_storage_config() -> Result<StorageConfig, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    storage_config_from_lookup(|key| std::env::var(key).ok())
}

/// Builds the blob-store configuration from an arbitrary variable lookup
///
/// Every missing required variable is reported in a single error.
pub fn storage_config_from_lookup<F>(lookup: F) -> Result<StorageConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let mut missing = Vec::new();

    let mut require = |key: &str| {
        let value = get(key);
        if value.is_none() {
            missing.push(key.to_string());
        }
        value.unwrap_or_default()
    };

    let access_key_id = require(ACCESS_KEY_VAR);
    let secret_access_key = require(SECRET_KEY_VAR);
    let bucket = require(BUCKET_VAR);
    let public_url = require(PUBLIC_URL_VAR);

    let endpoint = match (get(ENDPOINT_VAR), get(ACCOUNT_ID_VAR)) {
        (Some(endpoint), _) => endpoint,
        (None, Some(account_id)) => format!("https://{}.r2.cloudflarestorage.com", account_id),
        (None, None) => {
            missing.push(format!("{} or {}", ENDPOINT_VAR, ACCOUNT_ID_VAR));
            String::new()
        }
    };

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing));
    }

    let public_url = public_url.trim_end_matches('/').to_string();
    url::Url::parse(&public_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", PUBLIC_URL_VAR, e)))?;
    url::Url::parse(&endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid blob endpoint: {}", e)))?;

    Ok(StorageConfig {
        endpoint,
        region: get(REGION_VAR).unwrap_or_else(|| "auto".to_string()),
        access_key_id,
        secret_access_key,
        bucket,
        public_url,
    })
}
