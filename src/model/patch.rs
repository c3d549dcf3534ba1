use serde::{Deserialize, Serialize};

/// One entry of the patch gallery, as listed in patches_index.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Value of the `p` query parameter, when the link carries one
    pub id: Option<String>,
    pub url: String,
    pub title: String,
    pub img_url: Option<String>,
}

impl Patch {
    /// Numeric id used for ordering; non-numeric or missing ids sort first
    pub fn sort_key(&self) -> u64 {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|id| id.parse().ok())
            .unwrap_or(0)
    }
}
