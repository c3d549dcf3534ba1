//! HTML parser for the gallery hierarchy
//!
//! This module extracts the three link shapes the mapper walks:
//! - container links on the gallery index
//! - owner (photographer) directories on a container page
//! - image-map `<area>` entries on an owner's compact listing page
//! - `patch.html` links on the patch gallery page

use crate::crawler::slug::infer_dates;
use crate::model::{ContainerSummary, LeafResource, Patch};
use crate::url::{normalize_container_url, resolve_href, INDEX_EXCLUSIONS, OWNER_EXCLUSIONS};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// An owner directory found on a container page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerDir {
    /// Directory name, used as the resource owner
    pub owner: String,
    /// Absolute URL of the directory
    pub url: String,
}

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("anchor selector is valid"))
}

fn area_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("area[href]").expect("area selector is valid"))
}

fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img[src]").expect("img selector is valid"))
}

fn resource_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"pic=(\d+)").expect("resource id pattern is valid"))
}

/// Visible text of an element with whitespace collapsed
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts container links from the gallery index
///
/// Links are filtered through the index exclusion rules and deduplicated by
/// normalized absolute URL, keeping document order. The slug is the href
/// with surrounding slashes removed.
///
/// # Example
///
/// ```
/// use gallery_harvest::crawler::extract_containers;
/// use url::Url;
///
/// let html = r#"<a href="chainoffools2002/">Chain of Fools</a><a href="/forum/">Forum</a>"#;
/// let base = Url::parse("http://scoot.net/gallery/").unwrap();
/// let containers = extract_containers(html, &base);
/// assert_eq!(containers.len(), 1);
/// assert_eq!(containers[0].slug, "chainoffools2002");
/// ```
pub fn extract_containers(html: &str, gallery_base: &Url) -> Vec<ContainerSummary> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut containers = Vec::new();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if INDEX_EXCLUSIONS.is_excluded(href) {
            continue;
        }

        let url = match normalize_container_url(gallery_base, href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Skipping unresolvable container link {}: {}", href, e);
                continue;
            }
        };

        if !seen.insert(url.clone()) {
            continue;
        }

        let slug = href.trim().trim_matches('/').to_string();
        if slug.is_empty() {
            continue;
        }

        let dates = infer_dates(&slug);
        containers.push(ContainerSummary {
            slug,
            url,
            title: element_text(&element),
            year: dates.year,
            month: dates.month,
            date_label: dates.date_label,
        });
    }

    containers
}

/// Extracts owner directories from a container page
///
/// Owner directories are plain relative links; absolute, root-relative and
/// dot-relative links are navigation, not owners.
pub fn extract_owner_dirs(html: &str, container_url: &Url) -> Vec<OwnerDir> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut owners = Vec::new();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if OWNER_EXCLUSIONS.is_excluded(href) {
            continue;
        }

        let Some(url) = resolve_href(container_url, href) else {
            continue;
        };

        if seen.insert(url.clone()) {
            owners.push(OwnerDir {
                owner: href.trim().trim_matches('/').to_string(),
                url,
            });
        }
    }

    owners
}

/// Extracts leaf resources from an owner's compact listing page
///
/// Each `<area href>` carrying `pic=<digits>` yields one resource; repeated
/// ids within the listing are dropped. Detail URLs resolve against the site
/// origin.
pub fn extract_listing_resources(
    html: &str,
    site_base: &Url,
    owner: &str,
    container_date: Option<&str>,
) -> Vec<LeafResource> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut resources = Vec::new();

    for element in document.select(area_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(id) = resource_id_pattern()
            .captures(href)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        if !seen.insert(id.clone()) {
            continue;
        }

        let Some(detail_url) = resolve_href(site_base, href) else {
            tracing::debug!("Skipping unresolvable listing link {}", href);
            continue;
        };

        resources.push(LeafResource::new(
            id,
            detail_url,
            owner,
            container_date.map(str::to_string),
        ));
    }

    resources
}

/// Extracts patch entries from the patch gallery page
///
/// Every link to `patch.html` yields one patch, deduplicated by absolute
/// URL. The image is the first `<img>` inside the link, or else the first
/// one inside the link's parent element. Entries come back ordered by
/// numeric id.
pub fn extract_patches(html: &str, patches_base: &Url) -> Vec<Patch> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut patches = Vec::new();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.contains("patch.html") {
            continue;
        }

        let Ok(url) = patches_base.join(href.trim()) else {
            tracing::debug!("Skipping unresolvable patch link {}", href);
            continue;
        };
        if !seen.insert(url.to_string()) {
            continue;
        }

        let id = url
            .query_pairs()
            .find(|(key, _)| key == "p")
            .map(|(_, value)| value.into_owned());

        let img = element.select(img_selector()).next().or_else(|| {
            element
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(|parent| parent.select(img_selector()).next())
        });
        let img_url = img
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| patches_base.join(src.trim()).ok())
            .map(|u| u.to_string());

        patches.push(Patch {
            id,
            url: url.to_string(),
            title: element_text(&element),
            img_url,
        });
    }

    patches.sort_by_key(Patch::sort_key);
    patches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery() -> Url {
        Url::parse("http://scoot.net/gallery/").unwrap()
    }

    #[test]
    fn test_index_filters_navigation() {
        let html = r#"
            <html><body>
                <a href="/">Home</a>
                <a href="http://other.com/">Elsewhere</a>
                <a href="../">Up</a>
                <a href="galleryrequest.html">Request</a>
                <a href="?year=2003">2003</a>
                <a href="slideshow.html">Slides</a>
                <a href="chainoffools2002/">Chain of Fools 2002</a>
                <a href="2007/08/campscoot/">Camp Scoot</a>
            </body></html>
        "#;
        let containers = extract_containers(html, &gallery());

        let slugs: Vec<_> = containers.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["chainoffools2002", "2007/08/campscoot"]);
    }

    #[test]
    fn test_index_deduplicates_by_normalized_url() {
        let html = r#"
            <a href="chainoffools2002/">Chain of Fools</a>
            <a href="chainoffools2002">Chain of Fools (again)</a>
        "#;
        let containers = extract_containers(html, &gallery());
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].title, "Chain of Fools");
        assert_eq!(
            containers[0].url,
            "http://scoot.net/gallery/chainoffools2002/"
        );
    }

    #[test]
    fn test_index_infers_dates() {
        let html = r#"<a href="2007/08/campscoot/">Camp
            Scoot</a><a href="amerivespa/">Amerivespa</a>"#;
        let containers = extract_containers(html, &gallery());

        assert_eq!(containers[0].title, "Camp Scoot");
        assert_eq!(containers[0].year, Some(2007));
        assert_eq!(containers[0].month, Some(8));
        assert_eq!(containers[1].year, None);
        assert_eq!(containers[1].date_label, None);
    }

    #[test]
    fn test_owner_dirs() {
        let base = Url::parse("http://scoot.net/gallery/chainoffools2002/").unwrap();
        let html = r#"
            <a href="bob/">bob</a>
            <a href="alice/">alice</a>
            <a href="bob/">bob again</a>
            <a href="/gallery/">Back</a>
            <a href="SlideShow.html">Slides</a>
            <a href="tinyindex.html">All</a>
            <a href="alltinyindex.html">All</a>
        "#;
        let owners = extract_owner_dirs(html, &base);

        assert_eq!(
            owners,
            vec![
                OwnerDir {
                    owner: "bob".to_string(),
                    url: "http://scoot.net/gallery/chainoffools2002/bob/".to_string(),
                },
                OwnerDir {
                    owner: "alice".to_string(),
                    url: "http://scoot.net/gallery/chainoffools2002/alice/".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_listing_resources() {
        let site = Url::parse("http://scoot.net").unwrap();
        let html = r#"
            <map name="m">
                <area href="/gallery/pic.html?pic=0007" shape="rect">
                <area href="/gallery/pic.html?pic=0008" shape="rect">
                <area href="/gallery/pic.html?pic=0007" shape="rect">
                <area href="/gallery/other.html" shape="rect">
            </map>
        "#;
        let resources = extract_listing_resources(html, &site, "bob", Some("2002-??"));

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].resource_id, "0007");
        assert_eq!(
            resources[0].detail_url,
            "http://scoot.net/gallery/pic.html?pic=0007"
        );
        assert_eq!(resources[0].owner, "bob");
        assert_eq!(resources[0].dates.date_from_container(), Some("2002-??"));
        assert_eq!(resources[1].resource_id, "0008");
    }

    #[test]
    fn test_patches() {
        let base = Url::parse("http://scoot.net/patches/").unwrap();
        let html = r#"
            <table>
                <tr><td><a href="patch.html?p=12"><img src="img/12.jpg">Rally 2002</a></td></tr>
                <tr><td><img src="img/3.jpg"><a href="patch.html?p=3">Camp Scoot</a></td></tr>
                <tr><td><a href="patch.html?p=12">again</a></td></tr>
                <tr><td><a href="/patches/patch.html">No id</a></td></tr>
                <tr><td><a href="/gallery/">Gallery</a></td></tr>
            </table>
        "#;
        let patches = extract_patches(html, &base);

        let ids: Vec<_> = patches.iter().map(|p| p.id.as_deref()).collect();
        assert_eq!(ids, vec![None, Some("3"), Some("12")]);

        assert_eq!(patches[1].url, "http://scoot.net/patches/patch.html?p=3");
        assert_eq!(patches[1].title, "Camp Scoot");
        assert_eq!(
            patches[1].img_url.as_deref(),
            Some("http://scoot.net/patches/img/3.jpg")
        );
        assert_eq!(
            patches[2].img_url.as_deref(),
            Some("http://scoot.net/patches/img/12.jpg")
        );
        assert_eq!(patches[0].img_url, None);
    }

    #[test]
    fn test_listing_without_areas() {
        let site = Url::parse("http://scoot.net").unwrap();
        let resources = extract_listing_resources("<html></html>", &site, "bob", None);
        assert!(resources.is_empty());
    }
}
