use serde::{Deserialize, Serialize};

/// Caveat attached to every date read out of an asset's embedded metadata
pub const METADATA_DATE_CAVEAT: &str =
    "Camera clock accuracy not guaranteed. Use date_canonical for trusted dates.";

/// Which date field is currently authoritative for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Human-curated override
    Canonical,
    /// Inherited from the container slug
    ContainerSlug,
    /// Nothing trustworthy is known
    Unknown,
}

/// Date provenance triple for a leaf resource
///
/// The embedded-metadata date is audit data only. There is no `DateSource`
/// variant for it, so it can never become authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateProvenance {
    date_from_container: Option<String>,
    #[serde(default)]
    date_from_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_metadata_caveat: Option<String>,
    #[serde(default)]
    date_canonical: Option<String>,
    date_source: DateSource,
}

impl DateProvenance {
    pub fn from_container(date_label: Option<String>) -> Self {
        let date_source = if date_label.is_some() {
            DateSource::ContainerSlug
        } else {
            DateSource::Unknown
        };

        Self {
            date_from_container: date_label,
            date_from_metadata: None,
            date_metadata_caveat: None,
            date_canonical: None,
            date_source,
        }
    }

    /// Records a date read from embedded metadata, always with its caveat
    pub fn record_metadata_date(&mut self, date: Option<String>) {
        self.date_metadata_caveat = date.as_ref().map(|_| METADATA_DATE_CAVEAT.to_string());
        self.date_from_metadata = date;
    }

    /// Sets the human-curated date, which wins over everything else
    pub fn set_canonical(&mut self, date: impl Into<String>) {
        self.date_canonical = Some(date.into());
        self.date_source = DateSource::Canonical;
    }

    /// The date downstream consumers should display
    ///
    /// Canonical first, then the container date; never the metadata date.
    pub fn effective(&self) -> Option<&str> {
        self.date_canonical
            .as_deref()
            .or(self.date_from_container.as_deref())
    }

    pub fn date_from_container(&self) -> Option<&str> {
        self.date_from_container.as_deref()
    }

    pub fn date_from_metadata(&self) -> Option<&str> {
        self.date_from_metadata.as_deref()
    }

    pub fn metadata_caveat(&self) -> Option<&str> {
        self.date_metadata_caveat.as_deref()
    }

    pub fn date_canonical(&self) -> Option<&str> {
        self.date_canonical.as_deref()
    }

    pub fn source(&self) -> DateSource {
        self.date_source
    }
}

/// The smallest archivable unit: one photo in a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafResource {
    /// Numeric id from the site, unique within its container
    pub resource_id: String,

    /// Page that must be fetched to find the real asset
    pub detail_url: String,

    /// Photographer directory name
    pub owner: String,

    #[serde(flatten)]
    pub dates: DateProvenance,
}

impl LeafResource {
    pub fn new(
        resource_id: impl Into<String>,
        detail_url: impl Into<String>,
        owner: impl Into<String>,
        container_date: Option<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            detail_url: detail_url.into(),
            owner: owner.into(),
            dates: DateProvenance::from_container(container_date),
        }
    }
}

/// Fields read from an asset's embedded EXIF block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(rename = "DateTimeOriginal", skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<String>,

    #[serde(rename = "Make", skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(rename = "Model", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(rename = "_warning")]
    pub warning: String,
}

/// How far archiving got for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArchiveStatus {
    /// Baseline asset stored
    Archived,
    /// Asset downloaded but the baseline upload failed
    Partial { reason: String },
    /// No baseline URL was resolved; nothing was fetched
    Unresolved,
    /// Baseline download failed
    Failed { reason: String },
}

/// Final per-resource record, written once per archiving run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedAsset {
    #[serde(flatten)]
    pub resource: LeafResource,

    pub stored_baseline_key: Option<String>,
    pub stored_upgrade_key: Option<String>,
    pub baseline_public_url: Option<String>,
    pub upgrade_public_url: Option<String>,
    pub extracted_metadata: Option<ExtractedMetadata>,
    pub archive_status: ArchiveStatus,
}

impl ArchivedAsset {
    /// A record with every derived field null
    pub fn degraded(resource: LeafResource, status: ArchiveStatus) -> Self {
        Self {
            resource,
            stored_baseline_key: None,
            stored_upgrade_key: None,
            baseline_public_url: None,
            upgrade_public_url: None,
            extracted_metadata: None,
            archive_status: status,
        }
    }

    /// The untrusted date read from the asset itself
    pub fn extracted_date(&self) -> Option<&str> {
        self.resource.dates.date_from_metadata()
    }
}
