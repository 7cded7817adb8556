use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Coarse classification of rehosted media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `video/*` is a video; everything else, including audio and unknown
    /// types, is filed as an image.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Who caused the media to enter the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "upload_source", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    User,
}

/// Ingestion record written once after a successful rehost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub owner_id: Option<String>,
    pub record_id: Option<String>,
    pub task_id: Option<String>,
    /// Public URL on our storage
    pub url: String,
    /// Content type as reported by the origin
    pub content_type: String,
    pub media_kind: MediaKind,
    pub upload_source: UploadSource,
    pub origin_url: String,
    pub filename: String,
    pub size_bytes: u64,
    pub upload_path: String,
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Source context stored next to the record (`meta` column).
    pub fn meta(&self) -> JsonValue {
        json!({
            "originalUrl": self.origin_url,
            "filename": self.filename,
            "size": self.size_bytes,
            "uploadPath": self.upload_path,
        })
    }
}
