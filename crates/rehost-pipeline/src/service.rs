use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rehost_core::models::{BatchUploadError, CandidateInput, ProcessedImages, RehostOptions};
use rehost_core::{AppError, Config, IdGenerator, NanoIdGenerator};
use rehost_db::{MediaRecorder, NoopMediaRecorder, PgMediaRecorder};
use rehost_storage::{create_storage, StorageUploadAdapter, UploadAdapter};

use crate::{BatchUploader, RemoteRehoster};

/// Both ingestion entry points, wired to the same adapter.
#[derive(Clone)]
pub struct MediaIngestService {
    batch: BatchUploader,
    rehoster: RemoteRehoster,
}

impl MediaIngestService {
    pub fn new(batch: BatchUploader, rehoster: RemoteRehoster) -> Self {
        Self { batch, rehoster }
    }

    /// Build storage, adapter, recorder and HTTP client from configuration.
    ///
    /// Without `DATABASE_URL` ingestion records are discarded. With it, the
    /// pool is opened and pending migrations are applied before returning.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let storage = create_storage(config)
            .await
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        tracing::info!(backend = %storage.backend_type(), "Storage initialized");

        let ids: Arc<dyn IdGenerator> = Arc::new(NanoIdGenerator);
        let adapter: Arc<dyn UploadAdapter> = Arc::new(
            StorageUploadAdapter::new(storage)
                .with_id_generator(ids.clone())
                .with_batch_concurrency(config.batch_upload_concurrency),
        );

        let recorder: Arc<dyn MediaRecorder> = match rehost_db::connect(config).await? {
            Some(pool) => {
                rehost_db::run_migrations(&pool).await?;
                Arc::new(PgMediaRecorder::new(pool))
            }
            None => Arc::new(NoopMediaRecorder),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let batch = BatchUploader::new(adapter.clone())
            .with_default_folder(config.batch_upload_folder.clone());
        let rehoster = RemoteRehoster::new(client, adapter, recorder)
            .with_id_generator(ids)
            .with_default_path(config.rehost_upload_path.clone())
            .with_max_fetch_size(config.max_fetch_size_bytes)
            .with_metadata_write_mode(config.metadata_write_mode);

        tracing::info!(
            environment = %config.environment,
            metadata_write_mode = ?config.metadata_write_mode,
            batch_upload_concurrency = config.batch_upload_concurrency,
            "Media ingest service ready"
        );

        Ok(Self::new(batch, rehoster))
    }

    pub async fn process_and_upload_images(
        &self,
        candidates: Option<Vec<CandidateInput>>,
        folder: Option<&str>,
        use_random_names: Option<bool>,
    ) -> Result<ProcessedImages, BatchUploadError> {
        self.batch
            .process_and_upload_images(candidates, folder, use_random_names)
            .await
    }

    pub async fn convert_media(
        &self,
        url: &str,
        custom_headers: Option<&HashMap<String, String>>,
        options: Option<RehostOptions>,
    ) -> Result<String, AppError> {
        self.rehoster
            .convert_media(url, custom_headers, options)
            .await
    }

    pub fn batch_uploader(&self) -> &BatchUploader {
        &self.batch
    }

    pub fn rehoster(&self) -> &RemoteRehoster {
        &self.rehoster
    }
}
