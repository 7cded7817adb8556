//! Test helpers for pipeline unit tests
//!
//! In-memory stand-ins for the upload adapter, the metadata recorder and the
//! ID generator, so the pipeline can be exercised without object storage or
//! a database.

pub mod mock_adapter;
pub mod mock_recorder;

pub use mock_adapter::{BatchCall, MockUploadAdapter, UploadCall};
pub use mock_recorder::{FailingRecorder, RecordingRecorder};

use bytes::Bytes;
use rehost_core::models::BinaryPayload;
use rehost_core::IdGenerator;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Small payload with fixed content
pub fn payload(name: &str, content_type: &str) -> BinaryPayload {
    BinaryPayload::new(name, content_type, Bytes::from_static(b"\x89PNG fake"))
}

/// Deterministic IDs: `id000000000000000001`, `id000000000000000002`, ...
#[derive(Default)]
pub struct SequenceIdGenerator {
    next: AtomicUsize,
}

impl SequenceIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("id{:019}", n)
    }
}
