//! Storage abstraction trait
//!
//! This module defines the [`ReportStore`] trait that both storage backends
//! implement. The report service works against this trait and never
//! branches on the backend mode beyond the initial dispatch in the factory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use fieldpost_core::{ReportError, ReportMode};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for ReportError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ReportError::NotFound(key),
            StorageError::ConfigError(msg) => ReportError::Config(msg),
            other => ReportError::Storage(other.to_string()),
        }
    }
}

/// One entry returned by a listing: the key, its size, and the
/// store-reported last-modified instant (used to order tag searches
/// newest-first).
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// Both backends (local filesystem, remote object store) implement this.
/// `persist` returns an access locator: a filesystem path for the local
/// backend, a time-limited presigned URL for the remote one.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Write `data` under `relative_key` and return the access locator.
    /// Parent directories / key prefixes are created as needed.
    async fn persist(
        &self,
        relative_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Read the full contents of an object.
    async fn fetch(&self, relative_key: &str) -> StorageResult<Vec<u8>>;

    /// List objects under `prefix` (empty prefix = whole store).
    ///
    /// Entries come back ordered newest-first by last-modified, and
    /// `max_objects` truncates after ordering, so a bounded listing is
    /// always the most recent window. `None` means unbounded ("include
    /// ancient" mode).
    async fn list(&self, prefix: &str, max_objects: Option<usize>)
        -> StorageResult<Vec<ObjectInfo>>;

    /// Which backend this store is.
    fn backend(&self) -> ReportMode;
}

/// Reject keys that could escape the store root. Shared by both backends
/// so the rules cannot drift.
pub(crate) fn validate_key(relative_key: &str) -> StorageResult<()> {
    if relative_key.is_empty() {
        return Err(StorageError::InvalidKey("empty storage key".to_string()));
    }
    if relative_key.contains("..") || relative_key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "storage key contains invalid components: {}",
            relative_key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("bot1/2025-01-02_03-04-05/index.html").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("a/../../etc/passwd").is_err());
    }

    #[test]
    fn storage_error_maps_to_report_error() {
        let err: ReportError = StorageError::NotFound("k".to_string()).into();
        assert_eq!(err.error_type(), "NotFound");

        let err: ReportError = StorageError::UploadFailed("boom".to_string()).into();
        assert_eq!(err.error_type(), "Storage");

        let err: ReportError = StorageError::ConfigError("missing".to_string()).into();
        assert_eq!(err.error_type(), "Config");
    }
}
