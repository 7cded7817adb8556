//! Mock upload adapter
//!
//! Records every call and keeps uploaded payloads in memory.

use async_trait::async_trait;
use rehost_core::models::{
    BatchUploadSummary, BinaryPayload, UploadFailure, UploadOutcome, UploadedFile,
};
use rehost_storage::{StorageError, StorageResult, UploadAdapter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub name: String,
    pub folder: String,
    pub filename: Option<String>,
    pub skip_existing: bool,
    pub use_random_name: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
    pub file_count: usize,
    pub folder: String,
    pub filename: Option<String>,
    pub skip_existing: bool,
    pub use_random_name: bool,
}

#[derive(Clone, Default)]
pub struct MockUploadAdapter {
    uploads: Arc<Mutex<Vec<(UploadCall, BinaryPayload)>>>,
    batches: Arc<Mutex<Vec<BatchCall>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    abort: Option<String>,
}

impl MockUploadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads of the payload named `name` with `reason`.
    pub fn fail_on(self, name: &str, reason: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), reason.to_string());
        self
    }

    /// Make every `upload_many` call fail as a whole.
    pub fn abort_batches(mut self, reason: &str) -> Self {
        self.abort = Some(reason.to_string());
        self
    }

    pub fn upload_calls(&self) -> Vec<UploadCall> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// Payloads that reached the adapter, in call order
    pub fn uploaded(&self) -> Vec<BinaryPayload> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(_, file)| file.clone())
            .collect()
    }

    pub fn batch_calls(&self) -> Vec<BatchCall> {
        self.batches.lock().unwrap().clone()
    }

    pub fn upload_many_calls(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn stored_name(file: &BinaryPayload, filename: Option<&str>, use_random_name: bool) -> String {
        match filename {
            Some(name) => name.to_string(),
            None if use_random_name => format!("random-{}", file.name),
            None => file.name.clone(),
        }
    }
}

#[async_trait]
impl UploadAdapter for MockUploadAdapter {
    async fn upload(
        &self,
        file: BinaryPayload,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<UploadedFile> {
        let call = UploadCall {
            name: file.name.clone(),
            folder: folder.to_string(),
            filename: filename.map(String::from),
            skip_existing,
            use_random_name,
        };
        self.uploads.lock().unwrap().push((call, file.clone()));

        if let Some(reason) = self.failures.lock().unwrap().get(&file.name) {
            return Err(StorageError::UploadFailed(reason.clone()));
        }

        let stored = Self::stored_name(&file, filename, use_random_name);
        Ok(UploadedFile {
            url: format!("https://cdn.test/{}/{}", folder, stored),
            filename: stored,
            size: file.size(),
            content_type: file.content_type,
        })
    }

    async fn upload_many(
        &self,
        files: Vec<BinaryPayload>,
        folder: &str,
        filename: Option<&str>,
        skip_existing: bool,
        use_random_name: bool,
    ) -> StorageResult<BatchUploadSummary> {
        self.batches.lock().unwrap().push(BatchCall {
            file_count: files.len(),
            folder: folder.to_string(),
            filename: filename.map(String::from),
            skip_existing,
            use_random_name,
        });

        if let Some(reason) = &self.abort {
            return Err(StorageError::BackendError(reason.clone()));
        }

        let mut outcomes = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let name = file.name.clone();
            let reason = self.failures.lock().unwrap().get(&name).cloned();
            match reason {
                Some(error) => outcomes.push(UploadOutcome::Failure(UploadFailure {
                    index,
                    filename: name,
                    error,
                })),
                None => {
                    let uploaded = self
                        .upload(file, folder, filename, skip_existing, use_random_name)
                        .await?;
                    outcomes.push(UploadOutcome::Success(uploaded));
                }
            }
        }

        Ok(BatchUploadSummary::from_outcomes(outcomes))
    }
}
