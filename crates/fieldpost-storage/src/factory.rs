//! Backend selection.
//!
//! The backend is chosen once per service instance from configuration and
//! never per report. Local mode does not validate remote credentials at
//! all; remote mode fails fast at startup when they are missing.

use std::sync::Arc;
use std::time::Duration;

use crate::{LocalStore, RemoteStore, ReportStore, StorageError, StorageResult};
use fieldpost_core::{Config, ReportMode};

/// Create a storage backend based on configuration.
pub async fn create_store(config: &Config) -> StorageResult<Arc<dyn ReportStore>> {
    match config.mode {
        ReportMode::Local => {
            let root = config.report_folder.clone().ok_or_else(|| {
                StorageError::ConfigError("FIELDPOST_REPORT_FOLDER not configured".to_string())
            })?;
            let store = LocalStore::new(root).await?;
            Ok(Arc::new(store))
        }
        ReportMode::Remote => {
            let access_key_id = config.aws_access_key_id.clone().ok_or_else(|| {
                StorageError::ConfigError("REPORT_AWS_ACCESS_KEY_ID not configured".to_string())
            })?;
            let secret_access_key = config.aws_secret_access_key.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "REPORT_AWS_SECRET_ACCESS_KEY not configured".to_string(),
                )
            })?;

            let store = RemoteStore::new(
                config.bucket.clone(),
                config.aws_region.clone(),
                access_key_id,
                secret_access_key,
                Duration::from_secs(config.url_expiration_secs),
            )?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn local_mode_builds_without_credentials() {
        let dir = tempdir().unwrap();
        let config = Config::for_local_folder(dir.path());
        let store = create_store(&config).await.unwrap();
        assert_eq!(store.backend(), ReportMode::Local);
    }

    #[tokio::test]
    async fn remote_mode_fails_fast_without_credentials() {
        let dir = tempdir().unwrap();
        let mut config = Config::for_local_folder(dir.path());
        config.mode = ReportMode::Remote;

        let result = create_store(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
