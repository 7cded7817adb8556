use crate::traits::{join_public_url, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use rehost_core::{IdGenerator, NanoIdGenerator};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Filesystem-backed storage, served by some static file server at `base_url`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a partially written object. Each write gets its own temp
/// name; concurrent puts to one key race only on the final rename.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Open (and create if needed) the storage root.
    ///
    /// # Arguments
    /// * `root` - Directory objects are written under (e.g., "/var/lib/rehost/files")
    /// * `base_url` - URL that directory is served from (e.g., "http://localhost:3000/files")
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Cannot create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = fs::canonicalize(&root).await.map_err(|e| {
            StorageError::ConfigError(format!("Cannot resolve storage root {}: {}", root.display(), e))
        })?;

        Ok(Self { root, base_url })
    }

    /// Map a storage key onto a path below the root.
    ///
    /// Only plain relative segments are accepted, so the result can never
    /// leave the root.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains('\\') {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        Ok(self.root.join(relative))
    }

    async fn write_atomically(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!(".{}.{}.part", file_name, NanoIdGenerator.new_id()));

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let path = self.resolve(storage_key)?;
        let started = Instant::now();

        self.write_atomically(&path, &data).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %storage_key,
                path = %path.display(),
                "Local storage write failed"
            );
            StorageError::UploadFailed(format!("{}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Stored object on local filesystem"
        );

        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let path = self.resolve(storage_key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_public_url(&self.base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_put_then_download() {
        let (dir, storage) = storage().await;

        let url = storage
            .put(
                "generation/inputs/test.png",
                "image/png",
                Bytes::from_static(b"test data"),
            )
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/files/generation/inputs/test.png");
        assert_eq!(
            storage.download("generation/inputs/test.png").await.unwrap(),
            Bytes::from_static(b"test data")
        );
        assert_eq!(entries(&dir.path().join("generation/inputs")), vec!["test.png"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_to_same_key() {
        let (dir, storage) = storage().await;
        let payloads: Vec<Bytes> = (0..4u8)
            .map(|fill| Bytes::from(vec![fill; 1024 * 1024]))
            .collect();

        let results = futures::future::join_all(payloads.iter().cloned().map(|data| {
            let storage = storage.clone();
            async move { storage.put("media/same.png", "image/png", data).await }
        }))
        .await;

        for result in &results {
            assert_eq!(
                result.as_deref().unwrap(),
                "http://localhost:3000/files/media/same.png"
            );
        }
        let stored = storage.download("media/same.png").await.unwrap();
        assert!(payloads.contains(&stored));
        assert_eq!(entries(&dir.path().join("media")), vec!["same.png"]);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, storage) = storage().await;
        storage
            .put("media/a.txt", "text/plain", Bytes::from_static(b"one"))
            .await
            .unwrap();
        storage
            .put("media/a.txt", "text/plain", Bytes::from_static(b"two"))
            .await
            .unwrap();

        assert_eq!(
            storage.download("media/a.txt").await.unwrap(),
            Bytes::from_static(b"two")
        );
    }

    #[tokio::test]
    async fn test_escaping_keys_rejected() {
        let (_dir, storage) = storage().await;

        for key in ["../../../etc/passwd", "/etc/passwd", "./a", "a\\b", ""] {
            assert!(
                matches!(storage.exists(key).await, Err(StorageError::InvalidKey(_))),
                "{key} should be rejected"
            );
        }
        assert!(matches!(
            storage
                .put("../escape.txt", "text/plain", Bytes::from_static(b"x"))
                .await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_exists_and_missing() {
        let (_dir, storage) = storage().await;
        storage
            .put("media/exists.txt", "text/plain", Bytes::from_static(b"test"))
            .await
            .unwrap();

        assert!(storage.exists("media/exists.txt").await.unwrap());
        assert!(!storage.exists("media/missing.txt").await.unwrap());
        assert!(matches!(
            storage.download("media/missing.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
