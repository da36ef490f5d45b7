use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};

use crate::traits::{validate_key, ObjectInfo, ReportStore, StorageError, StorageResult};
use fieldpost_core::ReportMode;

/// Remote object-store implementation (S3)
///
/// `persist` uploads the object and returns a time-limited presigned GET
/// URL. Listings follow the store's continuation cursor to exhaustion,
/// then order newest-first by last-modified before the fetch ceiling is
/// applied, so the bounded window always covers the most recent objects.
#[derive(Clone)]
pub struct RemoteStore {
    store: AmazonS3,
    bucket: String,
    url_expiry: Duration,
}

impl RemoteStore {
    /// Create a new RemoteStore for `bucket` in `region`.
    ///
    /// Credentials are passed explicitly from configuration; the builder
    /// also picks up ambient AWS environment settings.
    pub fn new(
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        url_expiry: Duration,
    ) -> StorageResult<Self> {
        let store = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone())
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(RemoteStore {
            store,
            bucket,
            url_expiry,
        })
    }
}

#[async_trait]
impl ReportStore for RemoteStore {
    async fn persist(
        &self,
        relative_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        validate_key(relative_key)?;
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(relative_key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %relative_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 report persist failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, self.url_expiry)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        tracing::info!(
            bucket = %self.bucket,
            key = %relative_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 report persist successful"
        );

        Ok(url)
    }

    async fn fetch(&self, relative_key: &str) -> StorageResult<Vec<u8>> {
        validate_key(relative_key)?;
        let start = std::time::Instant::now();
        let location = Path::from(relative_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(relative_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %relative_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 report fetch failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn list(
        &self,
        prefix: &str,
        max_objects: Option<usize>,
    ) -> StorageResult<Vec<ObjectInfo>> {
        if !prefix.is_empty() {
            validate_key(prefix)?;
        }
        let start = std::time::Instant::now();
        let prefix_path = if prefix.is_empty() {
            None
        } else {
            Some(Path::from(prefix.to_string()))
        };

        // The store returns bounded pages behind a continuation cursor in
        // lexicographic key order, which is oldest-first for dated keys.
        // Follow the cursor to exhaustion, then order newest-first before
        // applying the ceiling so the bounded window is the most recent one.
        let mut stream = self.store.list(prefix_path.as_ref());
        let mut entries = Vec::new();

        while let Some(item) = stream.next().await {
            let meta = item.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    "S3 report list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

            entries.push(ObjectInfo {
                key: meta.location.to_string(),
                size: meta.size,
                last_modified: meta.last_modified,
            });
        }

        entries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        if let Some(ceiling) = max_objects {
            if entries.len() > ceiling {
                tracing::debug!(
                    prefix = %prefix,
                    ceiling = ceiling,
                    "S3 report list truncated at fetch ceiling"
                );
                entries.truncate(ceiling);
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 report list successful"
        );

        Ok(entries)
    }

    fn backend(&self) -> ReportMode {
        ReportMode::Remote
    }
}
