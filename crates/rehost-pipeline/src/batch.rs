//! Batch upload of client-submitted files.

use std::sync::Arc;

use rehost_core::constants::DEFAULT_BATCH_FOLDER;
use rehost_core::models::{BatchUploadError, CandidateInput, ProcessedImages};
use rehost_storage::UploadAdapter;

/// Validates a list of candidate files and pushes the usable ones through
/// the upload adapter as one batch.
#[derive(Clone)]
pub struct BatchUploader {
    adapter: Arc<dyn UploadAdapter>,
    default_folder: String,
}

impl BatchUploader {
    pub fn new(adapter: Arc<dyn UploadAdapter>) -> Self {
        Self {
            adapter,
            default_folder: DEFAULT_BATCH_FOLDER.to_string(),
        }
    }

    /// Folder used when a call does not name one.
    pub fn with_default_folder(mut self, folder: impl Into<String>) -> Self {
        self.default_folder = folder.into();
        self
    }

    /// Upload every usable candidate into `folder` (default
    /// `generation/inputs`), with random names unless `use_random_names` is
    /// `Some(false)`.
    ///
    /// Candidates without a binary payload are logged and skipped; they are
    /// not counted as attempted. The call succeeds when at least one file
    /// reached storage. Files that failed alongside successful ones are
    /// reported in [`ProcessedImages::failures`].
    #[tracing::instrument(
        skip(self, candidates),
        fields(candidate_count = candidates.as_ref().map_or(0, Vec::len))
    )]
    pub async fn process_and_upload_images(
        &self,
        candidates: Option<Vec<CandidateInput>>,
        folder: Option<&str>,
        use_random_names: Option<bool>,
    ) -> Result<ProcessedImages, BatchUploadError> {
        let candidates = candidates.unwrap_or_default();
        if candidates.is_empty() {
            tracing::info!("No images to upload");
            return Ok(ProcessedImages::default());
        }

        let folder = folder.unwrap_or(&self.default_folder);
        let use_random_names = use_random_names.unwrap_or(true);

        let mut files = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.into_iter().enumerate() {
            match candidate.into_binary_payload() {
                Some(file) => files.push(file),
                None => {
                    tracing::error!(
                        position = index + 1,
                        "Invalid file at position {}, skipping",
                        index + 1
                    );
                }
            }
        }

        if files.is_empty() {
            tracing::error!("No valid image files found");
            return Err(BatchUploadError::NoValidFiles);
        }

        tracing::info!(
            file_count = files.len(),
            folder = %folder,
            use_random_names = use_random_names,
            "Uploading images"
        );

        let summary = match self
            .adapter
            .upload_many(files, folder, None, false, use_random_names)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, folder = %folder, "Error during image upload");
                return Err(BatchUploadError::Aborted(e.to_string()));
            }
        };

        if summary.success_count == 0 {
            let err = BatchUploadError::AllFailed {
                errors: summary.errors,
            };
            tracing::error!(error = %err, total_files = summary.total_files, "Image upload failed");
            return Err(err);
        }

        for failure in &summary.errors {
            tracing::error!(
                index = failure.index,
                filename = %failure.filename,
                error = %failure.error,
                "Image upload partially failed"
            );
        }

        tracing::info!(
            outcome = "success",
            total_files = summary.total_files,
            success_count = summary.success_count,
            failure_count = summary.failure_count(),
            "Images uploaded"
        );

        Ok(ProcessedImages {
            uploaded_images: summary.results,
            failures: summary.errors,
        })
    }
}
