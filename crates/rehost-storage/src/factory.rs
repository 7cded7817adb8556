#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use rehost_core::Config;
use std::sync::Arc;

/// Pull a required setting out of the config, naming the variable when absent.
fn required(value: Option<&str>, var: &str) -> StorageResult<String> {
    value
        .map(str::to_owned)
        .ok_or_else(|| StorageError::ConfigError(format!("{var} not configured")))
}

/// Build the backend selected by `STORAGE_BACKEND`.
///
/// A backend whose cargo feature is disabled is a configuration error rather
/// than a silent fallback to the other one.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.effective_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                required(config.s3_bucket(), "S3_BUCKET")?,
                required(config.effective_s3_region(), "S3_REGION or AWS_REGION")?,
                config.s3_endpoint().map(str::to_owned),
                config.s3_public_base_url().map(str::to_owned),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?,
                required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?,
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[allow(unreachable_patterns)]
        other => Err(StorageError::ConfigError(format!(
            "{other:?} storage backend was not compiled into this build"
        ))),
    }
}
