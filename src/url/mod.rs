//! URL handling module for Gallery-Harvest
//!
//! This module provides container URL normalization, href resolution,
//! link exclusion rules, and filesystem-safe slugs.

mod matcher;
mod normalize;

pub use matcher::{ExclusionRules, INDEX_EXCLUSIONS, OWNER_EXCLUSIONS};
pub use normalize::{normalize_container_url, resolve_href};

/// Turns a container slug into a single directory name
///
/// Path separators become '-', and anything outside `[A-Za-z0-9._-]` becomes
/// '_', so `2007/08/campscoot` maps to `2007-08-campscoot`.
///
/// # Examples
///
/// ```
/// use gallery_harvest::url::fs_safe_slug;
///
/// assert_eq!(fs_safe_slug("2007/08/campscoot"), "2007-08-campscoot");
/// assert_eq!(fs_safe_slug("chainoffools2002"), "chainoffools2002");
/// ```
pub fn fs_safe_slug(slug: &str) -> String {
    let mapped: String = slug
        .trim_matches('/')
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' => c,
            _ => '_',
        })
        .collect();

    // "." and ".." would escape the output directory
    if mapped.is_empty() || mapped.chars().all(|c| c == '.') {
        format!("_{}", mapped)
    } else {
        mapped
    }
}
