//! Blob storage seam
//!
//! The archiver only ever needs `put(bucket, key, bytes, content_type)`. The
//! S3-compatible store talks to the real bucket; the in-memory store backs
//! tests and dry runs.

mod memory;
mod s3_store;

pub use memory::{MemoryBlobStore, StoredObject};
pub use s3_store::S3BlobStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Whether a failed upload is worth trying again later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobErrorKind {
    Transient,
    Permanent,
}

impl fmt::Display for BlobErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Upload failure reported by a blob store
#[derive(Debug, Clone, Error)]
#[error("{kind} blob error: {message}")]
pub struct BlobError {
    pub kind: BlobErrorKind,
    pub message: String,
}

impl BlobError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: BlobErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: BlobErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == BlobErrorKind::Transient
    }
}

/// Key/value object storage addressed by bucket and key
///
/// Writing an existing key overwrites it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError>;
}

/// Classifies an HTTP status from the object store
pub fn classify_status(status: u16) -> Option<BlobErrorKind> {
    match status {
        200..=299 => None,
        429 | 500..=599 => Some(BlobErrorKind::Transient),
        _ => Some(BlobErrorKind::Permanent),
    }
}
