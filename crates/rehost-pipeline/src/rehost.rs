//! Rehosting of remote assets onto our own storage.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rehost_core::constants::DEFAULT_REHOST_PATH;
use rehost_core::models::{BinaryPayload, MediaKind, MediaRecord, RehostOptions, UploadSource};
use rehost_core::{
    resolve_extension, AppError, ErrorMetadata, IdGenerator, LogLevel, MetadataWriteMode,
    NanoIdGenerator,
};
use rehost_db::MediaRecorder;
use rehost_storage::UploadAdapter;
use reqwest::header::CONTENT_TYPE;

const DEFAULT_MAX_FETCH_SIZE_BYTES: usize = 100 * 1024 * 1024;

/// Downloads a remote asset, stores it under a random name and records where
/// it came from.
#[derive(Clone)]
pub struct RemoteRehoster {
    client: reqwest::Client,
    adapter: Arc<dyn UploadAdapter>,
    recorder: Arc<dyn MediaRecorder>,
    ids: Arc<dyn IdGenerator>,
    default_path: String,
    max_fetch_size_bytes: usize,
    metadata_write_mode: MetadataWriteMode,
}

impl RemoteRehoster {
    pub fn new(
        client: reqwest::Client,
        adapter: Arc<dyn UploadAdapter>,
        recorder: Arc<dyn MediaRecorder>,
    ) -> Self {
        Self {
            client,
            adapter,
            recorder,
            ids: Arc::new(NanoIdGenerator),
            default_path: DEFAULT_REHOST_PATH.to_string(),
            max_fetch_size_bytes: DEFAULT_MAX_FETCH_SIZE_BYTES,
            metadata_write_mode: MetadataWriteMode::default(),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    pub fn with_max_fetch_size(mut self, bytes: usize) -> Self {
        self.max_fetch_size_bytes = bytes;
        self
    }

    pub fn with_metadata_write_mode(mut self, mode: MetadataWriteMode) -> Self {
        self.metadata_write_mode = mode;
        self
    }

    /// Download `url` and store it on our storage, returning the public URL.
    ///
    /// `custom_headers` are sent with the download request as-is. When
    /// `options` carries an owner, record or task id, a [`MediaRecord`] is
    /// written afterwards; failing to write it is logged and does not affect
    /// the result.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn convert_media(
        &self,
        url: &str,
        custom_headers: Option<&HashMap<String, String>>,
        options: Option<RehostOptions>,
    ) -> Result<String, AppError> {
        let result = self
            .rehost(url, custom_headers, options.unwrap_or_default())
            .await;
        if let Err(ref err) = result {
            log_failure(url, err);
        }
        result
    }

    async fn rehost(
        &self,
        url: &str,
        custom_headers: Option<&HashMap<String, String>>,
        options: RehostOptions,
    ) -> Result<String, AppError> {
        let start = Instant::now();

        let (data, content_type) = self.fetch(url, custom_headers).await?;
        let size = data.len();

        let extension = resolve_extension(url, &content_type);
        let filename = format!("{}.{}", self.ids.new_id(), extension);
        let folder = options
            .path
            .clone()
            .unwrap_or_else(|| self.default_path.clone());
        let skip_existing = options.skip_existing.unwrap_or(false);

        tracing::info!(
            filename = %filename,
            folder = %folder,
            content_type = %content_type,
            size_bytes = size,
            "Uploading remote media"
        );

        let file = BinaryPayload::new(filename.clone(), content_type.clone(), data);
        let uploaded = self
            .adapter
            .upload(file, &folder, None, skip_existing, false)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if options.has_classification() {
            let record = MediaRecord {
                owner_id: options.owner_id,
                record_id: options.record_id,
                task_id: options.task_id,
                url: uploaded.url.clone(),
                media_kind: MediaKind::from_content_type(&content_type),
                content_type,
                upload_source: UploadSource::User,
                origin_url: url.to_string(),
                filename,
                size_bytes: uploaded.size,
                upload_path: folder,
                created_at: Utc::now(),
            };
            self.record_media(record).await;
        }

        tracing::info!(
            outcome = "success",
            public_url = %uploaded.url,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote media rehosted"
        );

        Ok(uploaded.url)
    }

    async fn fetch(
        &self,
        url: &str,
        custom_headers: Option<&HashMap<String, String>>,
    ) -> Result<(bytes::Bytes, String), AppError> {
        let mut request = self.client.get(url);
        if let Some(headers) = custom_headers {
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| AppError::RemoteFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.canonical_reason() {
                Some(phrase) => format!("{} {}", status.as_u16(), phrase),
                None => status.as_u16().to_string(),
            };
            return Err(AppError::RemoteFetch(reason));
        }

        // Content-Length is only a hint; the limit is enforced on the bytes read.
        if let Some(length) = response.content_length() {
            if length > self.max_fetch_size_bytes as u64 {
                return Err(self.too_large(length));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(';').next().unwrap_or("").trim().to_string())
            .unwrap_or_default();

        let mut body = bytes::BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::RemoteFetch(e.to_string()))?
        {
            let received = body.len() + chunk.len();
            if received > self.max_fetch_size_bytes {
                return Err(self.too_large(received as u64));
            }
            body.extend_from_slice(&chunk);
        }
        let data = body.freeze();

        Ok((data, content_type))
    }

    fn too_large(&self, size: u64) -> AppError {
        AppError::PayloadTooLarge(format!(
            "{} bytes exceeds the {} byte limit",
            size, self.max_fetch_size_bytes
        ))
    }

    async fn record_media(&self, record: MediaRecord) {
        match self.metadata_write_mode {
            MetadataWriteMode::Inline => {
                if let Err(e) = self.recorder.insert(&record).await {
                    tracing::error!(error = %e, url = %record.url, "Failed to write media record");
                }
            }
            MetadataWriteMode::Detached => {
                let recorder = Arc::clone(&self.recorder);
                tokio::spawn(async move {
                    if let Err(e) = recorder.insert(&record).await {
                        tracing::error!(error = %e, url = %record.url, "Failed to write media record");
                    }
                });
            }
        }
    }
}

/// Log a failed conversion at the level the error asks for.
fn log_failure(url: &str, err: &AppError) {
    let details = err.detailed_message();
    let code = err.error_code();
    let recoverable = err.is_recoverable();

    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            url = %url,
            error_code = code,
            recoverable,
            error = %details,
            "Media conversion failed"
        ),
        LogLevel::Warn => tracing::warn!(
            url = %url,
            error_code = code,
            recoverable,
            error = %details,
            "Media conversion failed"
        ),
        LogLevel::Error => tracing::error!(
            url = %url,
            error_code = code,
            recoverable,
            error = %details,
            "Media conversion failed"
        ),
    }
}
