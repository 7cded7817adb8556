//! Upload adapter
//!
//! The pipeline never talks to a [`Storage`] backend directly: it hands a
//! [`BinaryPayload`] to an [`UploadAdapter`], which applies the naming policy,
//! the skip-existing check and the key layout, and reports a canonical URL.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use rehost_core::models::{
    BatchUploadSummary, BinaryPayload, UploadFailure, UploadOutcome, UploadedFile,
};
use rehost_core::{resolve_extension, IdGenerator, NanoIdGenerator};

use crate::keys::{generate_storage_key, normalize_folder, sanitize_filename};
use crate::{Storage, StorageResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Persists payloads to object storage.
#[async_trait]
pub trait UploadAdapter: Send + Sync {
    /// Upload one file into `folder`.
    ///
    /// Naming: `filename` wins when given; otherwise a random
    /// `<id>.<ext>` when `use_random_name` is set; otherwise the sanitized
    /// payload name. With `skip_existing`, an object already present under
    /// the final key is reported as uploaded without being rewritten.
    async fn upload(
        &self,
        file: BinaryPayload,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<UploadedFile>;

    /// Maximum number of uploads `upload_many` keeps in flight.
    fn batch_concurrency(&self) -> usize {
        DEFAULT_BATCH_CONCURRENCY
    }

    /// Upload several files into the same folder.
    ///
    /// Per-file failures are collected into the summary. Outcomes keep the
    /// input order even though uploads run concurrently. An `Err` means the
    /// batch as a whole could not be attempted.
    async fn upload_many(
        &self,
        files: Vec<BinaryPayload>,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<BatchUploadSummary> {
        Ok(upload_in_order(self, files, folder, filename, skip_existing, use_random_name).await)
    }
}

/// Upload `files` with at most `adapter.batch_concurrency()` in flight,
/// collecting one outcome per file in input order.
async fn upload_in_order<A: UploadAdapter + ?Sized>(
    adapter: &A,
    files: Vec<BinaryPayload>,
    folder: &str,
    filename: Option<&str>,
    skip_existing: bool,
    use_random_name: bool,
) -> BatchUploadSummary {
    let concurrency = adapter.batch_concurrency().max(1);

    let outcomes: Vec<UploadOutcome> = stream::iter(files.into_iter().enumerate())
        .map(|(index, file)| {
            let name = file.name.clone();
            async move {
                match adapter
                    .upload(file, folder, filename, skip_existing, use_random_name)
                    .await
                {
                    Ok(uploaded) => UploadOutcome::Success(uploaded),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            index = index,
                            filename = %name,
                            "File upload failed"
                        );
                        UploadOutcome::Failure(UploadFailure {
                            index,
                            filename: name,
                            error: e.to_string(),
                        })
                    }
                }
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    BatchUploadSummary::from_outcomes(outcomes)
}

/// [`UploadAdapter`] over any [`Storage`] backend.
#[derive(Clone)]
pub struct StorageUploadAdapter {
    storage: Arc<dyn Storage>,
    ids: Arc<dyn IdGenerator>,
    batch_concurrency: usize,
}

impl StorageUploadAdapter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            ids: Arc::new(NanoIdGenerator),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Use a specific ID generator for random names
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency.max(1);
        self
    }

    fn resolve_filename(
        &self,
        file: &BinaryPayload,
        filename: Option<&str>,
        use_random_name: bool,
    ) -> String {
        if let Some(name) = filename {
            return sanitize_filename(name);
        }

        if use_random_name {
            let ext = resolve_extension(&file.name, &file.content_type);
            return format!("{}.{}", self.ids.new_id(), ext);
        }

        sanitize_filename(&file.name)
    }
}

#[async_trait]
impl UploadAdapter for StorageUploadAdapter {
    async fn upload(
        &self,
        file: BinaryPayload,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<UploadedFile> {
        let final_name = self.resolve_filename(&file, filename, use_random_name);
        let storage_key = generate_storage_key(folder, &final_name)?;
        let size = file.size();
        let content_type = if file.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            file.content_type.clone()
        };

        if skip_existing && self.storage.exists(&storage_key).await? {
            tracing::info!(
                key = %storage_key,
                "Object already exists, skipping upload"
            );
            return Ok(UploadedFile {
                filename: final_name,
                url: self.storage.public_url(&storage_key),
                size,
                content_type,
            });
        }

        let url = self
            .storage
            .put(&storage_key, &content_type, file.data)
            .await?;

        Ok(UploadedFile {
            filename: final_name,
            url,
            size,
            content_type,
        })
    }

    fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    async fn upload_many(
        &self,
        files: Vec<BinaryPayload>,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<BatchUploadSummary> {
        // A bad folder fails every file the same way; reject it once.
        normalize_folder(folder)?;

        Ok(upload_in_order(self, files, folder, filename, skip_existing, use_random_name).await)
    }
}
