//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{filename}`, with the folder normalized so that
//! `"/media/"`, `"media"` and `"media/"` all land in the same place.

use crate::{StorageError, StorageResult};

/// Normalize a destination folder: trim surrounding slashes and whitespace,
/// reject traversal and empty inner segments. An empty folder is allowed and
/// means the bucket root.
pub fn normalize_folder(folder: &str) -> StorageResult<String> {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StorageError::InvalidKey(format!(
                "Invalid folder: {}",
                folder
            )));
        }
    }

    Ok(trimmed.to_string())
}

/// Generate a storage key for the given folder and filename.
pub fn generate_storage_key(folder: &str, filename: &str) -> StorageResult<String> {
    if filename.is_empty() || filename.contains('/') || filename.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Invalid filename: {}",
            filename
        )));
    }

    let folder = normalize_folder(folder)?;
    if folder.is_empty() {
        Ok(filename.to_string())
    } else {
        Ok(format!("{}/{}", folder, filename))
    }
}

/// Reduce a client-supplied file name to a safe single key segment.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.replace("..", "_");
    if sanitized.trim_matches('.').is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    sanitized
}
