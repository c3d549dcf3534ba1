use super::{classify_status, BlobError, BlobStore};
use crate::config::StorageConfig;
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::region::Region;
use s3::Bucket;

/// S3-compatible object store (Cloudflare R2, MinIO, AWS)
pub struct S3BlobStore {
    region: Region,
    credentials: Credentials,
}

impl S3BlobStore {
    /// Builds the client from validated storage settings
    pub fn new(config: &StorageConfig) -> Result<Self, BlobError> {
        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| BlobError::permanent(format!("invalid credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        Ok(Self {
            region,
            credentials,
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, BlobError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(|e| BlobError::permanent(format!("bucket {}: {}", name, e)))?;
        // Custom endpoints (R2, MinIO) only accept path-style addressing
        Ok(bucket.with_path_style())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        let bucket = self.bucket(bucket)?;
        tracing::debug!(key = %key, content_type = %content_type, "Uploading object");

        let response = bucket
            .put_object_with_content_type(key, &bytes, content_type)
            .await
            .map_err(|e| BlobError::transient(e.to_string()))?;

        let status = response.status_code();
        match classify_status(status) {
            None => Ok(()),
            Some(kind) => Err(BlobError {
                kind,
                message: format!("PUT {} returned HTTP {}", key, status),
            }),
        }
    }
}
