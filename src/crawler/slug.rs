//! Date inference from container slugs
//!
//! Two slug layouts exist on the site:
//!
//! - bare slug with an embedded year: `chainoffools2002`
//! - year/month/slug: `2007/08/campscoot`
//!
//! Anything else still maps, just without a year. The inferred values are a
//! display hint only; camera clocks and slugs are both unreliable.

use regex::Regex;
use std::sync::OnceLock;

/// Dates inferred from a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugDates {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `YYYY-MM`, `YYYY-??`, or None
    pub date_label: Option<String>,
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(199[7-9]|200[0-9]|201[0-9]|2020)").expect("year pattern is valid")
    })
}

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/(0[1-9]|1[0-2])/").expect("month pattern is valid"))
}

/// Infers year, month, and a date label from a container slug
///
/// # Examples
///
/// ```
/// use gallery_harvest::crawler::infer_dates;
///
/// let dates = infer_dates("2007/08/campscoot");
/// assert_eq!(dates.year, Some(2007));
/// assert_eq!(dates.month, Some(8));
/// assert_eq!(dates.date_label.as_deref(), Some("2007-08"));
/// ```
pub fn infer_dates(slug: &str) -> SlugDates {
    let year = year_pattern()
        .captures(slug)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let month = month_pattern()
        .captures(slug)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    let date_label = match (year, month) {
        (Some(y), Some(m)) => Some(format!("{}-{:02}", y, m)),
        (Some(y), None) => Some(format!("{}-??", y)),
        (None, _) => None,
    };

    SlugDates {
        year,
        month,
        date_label,
    }
}
