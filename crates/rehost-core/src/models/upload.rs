use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// In-memory file ready for upload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryPayload {
    pub name: String,
    #[serde(rename = "type", alias = "contentType", default)]
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Bytes,
}

impl BinaryPayload {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl fmt::Debug for BinaryPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryPayload")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Client-side wrapper around a payload, e.g. an image picker entry that
/// carries a preview URL next to the file itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadWrapper {
    #[serde(default)]
    pub file: Option<BinaryPayload>,
    #[serde(default)]
    pub preview: Option<String>,
}

/// One element of a client-submitted batch.
///
/// Deserialization tries the payload shape first, then the wrapper shape, and
/// keeps anything else as `Unrecognized` so it can be skipped explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CandidateInput {
    Payload(BinaryPayload),
    Wrapped(PayloadWrapper),
    Unrecognized(JsonValue),
}

impl CandidateInput {
    /// Reduce the candidate to an uploadable payload, if it carries one.
    pub fn into_binary_payload(self) -> Option<BinaryPayload> {
        match self {
            CandidateInput::Payload(payload) => Some(payload),
            CandidateInput::Wrapped(wrapper) => wrapper.file,
            CandidateInput::Unrecognized(_) => None,
        }
    }
}

impl From<BinaryPayload> for CandidateInput {
    fn from(payload: BinaryPayload) -> Self {
        CandidateInput::Payload(payload)
    }
}

/// A file that reached object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Alias used by the batch API, whose callers only ever send images.
pub type UploadedImage = UploadedFile;

/// A file the adapter attempted but could not store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailure {
    /// Position among the attempted files (0-based)
    pub index: usize,
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(UploadedFile),
    Failure(UploadFailure),
}

/// Aggregate over the outcomes of one batch, in input order.
///
/// `success_count + errors.len() == total_files` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadSummary {
    pub total_files: usize,
    pub success_count: usize,
    pub results: Vec<UploadedFile>,
    pub errors: Vec<UploadFailure>,
}

impl BatchUploadSummary {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = UploadOutcome>) -> Self {
        let mut summary = BatchUploadSummary::default();
        for outcome in outcomes {
            summary.total_files += 1;
            match outcome {
                UploadOutcome::Success(file) => {
                    summary.success_count += 1;
                    summary.results.push(file);
                }
                UploadOutcome::Failure(failure) => summary.errors.push(failure),
            }
        }
        summary
    }

    pub fn failure_count(&self) -> usize {
        self.errors.len()
    }
}

/// Successful result of `process_and_upload_images`.
///
/// `failures` lists files that were attempted but not stored when the batch
/// succeeded only partially; the verdict depends solely on at least one
/// file reaching storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedImages {
    pub uploaded_images: Vec<UploadedImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UploadFailure>,
}

/// Failure result of `process_and_upload_images`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchUploadError {
    #[error("No valid image files found")]
    NoValidFiles,

    #[error("Image upload failed: {}", join_errors(.errors))]
    AllFailed { errors: Vec<UploadFailure> },

    #[error("Error during image upload: {0}")]
    Aborted(String),
}

fn join_errors(errors: &[UploadFailure]) -> String {
    errors
        .iter()
        .map(|e| e.error.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Options accepted by `convert_media`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehostOptions {
    /// Destination folder; defaults to `media`
    pub path: Option<String>,
    pub skip_existing: Option<bool>,
    #[serde(alias = "sid")]
    pub owner_id: Option<String>,
    pub record_id: Option<String>,
    pub task_id: Option<String>,
}

impl RehostOptions {
    /// Whether any classification identifier is present. Without one no
    /// metadata record is written.
    pub fn has_classification(&self) -> bool {
        self.owner_id.is_some() || self.record_id.is_some() || self.task_id.is_some()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
