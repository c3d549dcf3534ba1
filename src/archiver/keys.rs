//! Deterministic storage keys
//!
//! A key depends only on the container date label, the owner, the resource
//! id and the variant, so re-archiving a resource overwrites its objects
//! instead of duplicating them.

use url::Url;

/// Which copy of an asset is being stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Baseline,
    Upgrade,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "thumb",
            Self::Upgrade => "full",
        }
    }
}

/// Date segment of a key: `2002-??` becomes `200200`, no label becomes
/// `unknown`
pub fn date_part(date_label: Option<&str>) -> String {
    match date_label {
        Some(label) if !label.trim().is_empty() => label.replace('-', "").replace("??", "00"),
        _ => "unknown".to_string(),
    }
}

/// Builds `{category}/{date}-{owner}/{id}/{variant}.{ext}`
///
/// # Example
///
/// ```
/// use gallery_harvest::archiver::{storage_key, Variant};
///
/// let key = storage_key("gallery", Some("2007-08"), "bob", "0007", Variant::Baseline, "jpg");
/// assert_eq!(key, "gallery/200708-bob/0007/thumb.jpg");
/// ```
pub fn storage_key(
    category: &str,
    date_label: Option<&str>,
    owner: &str,
    resource_id: &str,
    variant: Variant,
    ext: &str,
) -> String {
    let owner = if owner.trim().is_empty() {
        "unknown"
    } else {
        owner.trim()
    };
    format!(
        "{}/{}-{}/{}/{}.{}",
        category,
        date_part(date_label),
        owner,
        resource_id,
        variant.as_str(),
        ext
    )
}

/// File extension of an asset URL, lowercased; `jpg` when there is none
pub fn extension_for(asset_url: &str) -> String {
    Url::parse(asset_url)
        .ok()
        .and_then(|url| {
            let name = url.path_segments()?.last()?.to_string();
            let (stem, ext) = name.rsplit_once('.')?;
            if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            Some(ext.to_ascii_lowercase())
        })
        .unwrap_or_else(|| "jpg".to_string())
}

/// MIME type for an extension
pub fn content_type_for(ext: &str) -> String {
    mime_guess::from_ext(ext).first_or_octet_stream().to_string()
}

/// Externally resolvable URL of a stored object
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
