/// Link exclusion rules for relative-link discovery
///
/// A rule set rejects an href when it equals one of `exact`, starts with one
/// of `prefixes`, or contains one of `substrings`. Substring matching can be
/// made case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionRules {
    pub exact: &'static [&'static str],
    pub prefixes: &'static [&'static str],
    pub substrings: &'static [&'static str],
    pub case_insensitive: bool,
}

/// Rules for container links on the gallery index
pub const INDEX_EXCLUSIONS: ExclusionRules = ExclusionRules {
    exact: &[
        "",
        "galleryrequest.html",
        "picture_comments.html",
        "alltinyindex.html",
    ],
    prefixes: &["/", "http", ".", "#", "mailto"],
    substrings: &[
        "?",
        "slideshow",
        "comment",
        "showlink",
        "tinyindex",
        "pic.html",
    ],
    case_insensitive: false,
};

/// Rules for owner directory links on a container page
pub const OWNER_EXCLUSIONS: ExclusionRules = ExclusionRules {
    exact: &["", "alltinyindex.html"],
    prefixes: &["/", "http", "."],
    substrings: &["slideshow", "comment", "showlink", "tinyindex"],
    case_insensitive: true,
};

impl ExclusionRules {
    /// Checks if an href is excluded by these rules
    ///
    /// # Examples
    ///
    /// ```
    /// use gallery_harvest::url::INDEX_EXCLUSIONS;
    ///
    /// assert!(INDEX_EXCLUSIONS.is_excluded("/about.html"));
    /// assert!(INDEX_EXCLUSIONS.is_excluded("rally/slideshow.html"));
    /// assert!(!INDEX_EXCLUSIONS.is_excluded("chainoffools2002/"));
    /// ```
    pub fn is_excluded(&self, href: &str) -> bool {
        if self.exact.contains(&href) {
            return true;
        }

        if self.prefixes.iter().any(|p| href.starts_with(p)) {
            return true;
        }

        if self.case_insensitive {
            let lowered = href.to_lowercase();
            self.substrings.iter().any(|s| lowered.contains(s))
        } else {
            self.substrings.iter().any(|s| href.contains(s))
        }
    }
}
