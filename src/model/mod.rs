//! Typed records passed between pipeline phases
//!
//! - `Container` / `ContainerSummary`: mapper output
//! - `LeafResource` with its `DateProvenance`
//! - `ResolvedUrl`: resolver output, keyed by resource id
//! - `ArchivedAsset`: archiver output
//! - `Patch`: patch gallery entry
//! - `Outcome`: result of a single network or parse step

mod container;
mod outcome;
mod patch;
mod resolved;
mod resource;

pub use container::{Container, ContainerSummary};
pub use outcome::Outcome;
pub use patch::Patch;
pub use resolved::{Resolution, ResolvedUrl};
pub use resource::{
    ArchiveStatus, ArchivedAsset, DateProvenance, DateSource, ExtractedMetadata, LeafResource,
    METADATA_DATE_CAVEAT,
};
