use crate::UrlError;
use url::Url;

/// Normalizes a container link into the absolute URL used for deduplication
///
/// # Normalization Steps
///
/// 1. Resolve `href` against `base`; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Drop the fragment and query string
/// 4. Ensure the path ends with exactly one `/`
///
/// # Examples
///
/// ```
/// use gallery_harvest::url::normalize_container_url;
/// use url::Url;
///
/// let base = Url::parse("http://scoot.net/gallery/").unwrap();
/// let url = normalize_container_url(&base, "2007/08/campscoot").unwrap();
/// assert_eq!(url.as_str(), "http://scoot.net/gallery/2007/08/campscoot/");
/// ```
pub fn normalize_container_url(base: &Url, href: &str) -> Result<Url, UrlError> {
    let mut url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    url.set_query(None);

    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);

    Ok(url)
}

/// Resolves an href to an absolute URL string, keeping its query
///
/// Returns None for empty hrefs, non-navigational schemes, fragment-only
/// links and anything that does not resolve to HTTP(S).
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
