use serde::{Deserialize, Serialize};

/// Asset locations discovered for one leaf resource
///
/// Both fields null is a valid terminal state: the detail page could not be
/// fetched or carried no asset reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUrl {
    pub baseline_url: Option<String>,
    pub upgrade_url: Option<String>,
}

/// Tag describing how much of a `ResolvedUrl` was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    BaselineOnly,
    Upgraded,
}

impl ResolvedUrl {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn baseline(url: impl Into<String>) -> Self {
        Self {
            baseline_url: Some(url.into()),
            upgrade_url: None,
        }
    }

    pub fn with_upgrade(mut self, url: Option<String>) -> Self {
        self.upgrade_url = url;
        self
    }

    pub fn resolution(&self) -> Resolution {
        match (&self.baseline_url, &self.upgrade_url) {
            (None, _) => Resolution::Unresolved,
            (Some(_), None) => Resolution::BaselineOnly,
            (Some(_), Some(_)) => Resolution::Upgraded,
        }
    }
}
