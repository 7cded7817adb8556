//! Media rehosting pipeline
//!
//! Two entry points move media onto our own object storage:
//!
//! - [`BatchUploader::process_and_upload_images`] takes client-submitted
//!   in-memory files, drops the ones that are not usable and uploads the rest
//!   in one batch.
//! - [`RemoteRehoster::convert_media`] downloads a remote asset, stores it under
//!   a random name and optionally writes an ingestion record.
//!
//! [`MediaIngestService`] wires both from a [`Config`](rehost_core::Config).

pub mod batch;
pub mod rehost;
pub mod service;
pub mod telemetry;

#[cfg(test)]
pub mod test_helpers;

pub use batch::BatchUploader;
pub use rehost::RemoteRehoster;
pub use service::MediaIngestService;
pub use telemetry::init_tracing;

pub use rehost_core::models::{
    BatchUploadError, BinaryPayload, CandidateInput, ProcessedImages, RehostOptions,
    UploadedImage,
};
pub use rehost_core::{AppError, Config, MetadataWriteMode};
