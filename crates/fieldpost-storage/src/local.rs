use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::{validate_key, ObjectInfo, ReportStore, StorageError, StorageResult};
use fieldpost_core::ReportMode;

/// Local filesystem storage implementation
///
/// Keys resolve under a configured root directory; locators are absolute
/// filesystem paths. No network, no credentials, no expiry.
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `root`, creating it if needed.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create report directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStore { root })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that
    /// would escape the root.
    fn key_to_path(&self, relative_key: &str) -> StorageResult<PathBuf> {
        validate_key(relative_key)?;
        Ok(self.root.join(relative_key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Relative key for an absolute path under the root.
    fn path_to_key(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl ReportStore for LocalStore {
    async fn persist(
        &self,
        relative_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(relative_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %relative_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local report persist successful"
        );

        Ok(path.display().to_string())
    }

    async fn fetch(&self, relative_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(relative_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(relative_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    async fn list(
        &self,
        prefix: &str,
        max_objects: Option<usize>,
    ) -> StorageResult<Vec<ObjectInfo>> {
        if !prefix.is_empty() {
            validate_key(prefix)?;
        }

        let start_dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        };

        let mut entries = Vec::new();
        if !fs::try_exists(&start_dir).await.unwrap_or(false) {
            return Ok(entries);
        }

        // Iterative walk; the filesystem has no pagination cursor, so the
        // fetch ceiling is applied after ordering newest-first to mirror
        // the remote backend's bounded most-recent window.
        let mut pending = vec![start_dir];
        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::ListFailed(format!("{}: {}", dir.display(), e)))?;
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?
            {
                let path = entry.path();
                let meta = entry
                    .metadata()
                    .await
                    .map_err(|e| StorageError::ListFailed(e.to_string()))?;
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Some(key) = self.path_to_key(&path) else {
                    continue;
                };
                let last_modified: DateTime<Utc> = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                entries.push(ObjectInfo {
                    key,
                    size: meta.len(),
                    last_modified,
                });
            }
        }

        entries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        if let Some(ceiling) = max_objects {
            entries.truncate(ceiling);
        }

        tracing::info!(
            prefix = %prefix,
            count = entries.len(),
            "Local report list successful"
        );

        Ok(entries)
    }

    fn backend(&self) -> ReportMode {
        ReportMode::Local
    }
}
