use crate::model::LeafResource;
use serde::{Deserialize, Serialize};

/// A browsable collection in the site hierarchy (one event's gallery)
///
/// The slug is the resume key: it is derived only from the container's URL
/// path, so it is identical across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub slug: String,
    pub url: String,
    pub title: String,

    /// Inferred from the slug; informational only
    pub year: Option<i32>,
    pub month: Option<u32>,

    #[serde(rename = "date_rally")]
    pub date_label: Option<String>,

    #[serde(rename = "photo_count", default)]
    pub resource_count: usize,

    #[serde(rename = "photos", default)]
    pub resources: Vec<LeafResource>,
}

impl Container {
    /// Replaces the resource list in one step, keeping the count in sync
    pub fn set_resources(&mut self, resources: Vec<LeafResource>) {
        self.resource_count = resources.len();
        self.resources = resources;
    }

    /// Title for progress lines, falling back to the slug
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.slug
        } else {
            &self.title
        }
    }

    pub fn summary(&self) -> ContainerSummary {
        ContainerSummary {
            slug: self.slug.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            year: self.year,
            month: self.month,
            date_label: self.date_label.clone(),
        }
    }
}

/// Container without its resources, as listed in gallery_index.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(rename = "date_rally")]
    pub date_label: Option<String>,
}

impl From<ContainerSummary> for Container {
    fn from(summary: ContainerSummary) -> Self {
        Self {
            slug: summary.slug,
            url: summary.url,
            title: summary.title,
            year: summary.year,
            month: summary.month,
            date_label: summary.date_label,
            resource_count: 0,
            resources: Vec::new(),
        }
    }
}
