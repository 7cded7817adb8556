use async_trait::async_trait;
use rehost_core::models::MediaRecord;
use rehost_core::AppError;
use rehost_db::MediaRecorder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Keeps every inserted record in memory
#[derive(Clone, Default)]
pub struct RecordingRecorder {
    records: Arc<Mutex<Vec<MediaRecord>>>,
}

impl RecordingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<MediaRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaRecorder for RecordingRecorder {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Rejects every insert and counts the attempts
#[derive(Clone, Default)]
pub struct FailingRecorder {
    attempts: Arc<AtomicUsize>,
}

impl FailingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaRecorder for FailingRecorder {
    async fn insert(&self, _record: &MediaRecord) -> Result<(), AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Internal("connection refused".to_string()))
    }
}
