//! Asset reference extraction from detail pages

use regex::Regex;
use std::sync::OnceLock;

/// Path segment that marks the reduced-size variant of an asset
pub const SIZE_PREFIX_TOKEN: &str = "/small_";

fn asset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<IMG SRC="(/gallery/[^"]+)""#).expect("asset pattern is valid")
    })
}

/// Finds the first embedded gallery image and resolves it against the site
/// origin
///
/// # Example
///
/// ```
/// use gallery_harvest::resolver::extract_baseline;
///
/// let body = r#"<img src="/gallery/rally/bob/small_0007.jpg" width=400>"#;
/// assert_eq!(
///     extract_baseline(body, "http://scoot.net").as_deref(),
///     Some("http://scoot.net/gallery/rally/bob/small_0007.jpg")
/// );
/// ```
pub fn extract_baseline(body: &str, site_base: &str) -> Option<String> {
    asset_pattern()
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| format!("{}{}", site_base.trim_end_matches('/'), m.as_str()))
}

/// Derives the full-size candidate by dropping the size prefix
///
/// Returns None when the baseline carries no size prefix; there is nothing
/// to probe in that case.
pub fn derive_upgrade(baseline: &str) -> Option<String> {
    let candidate = baseline.replace(SIZE_PREFIX_TOKEN, "/");
    if candidate == baseline {
        None
    } else {
        Some(candidate)
    }
}
