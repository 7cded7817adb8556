use async_trait::async_trait;
use rehost_core::models::MediaRecord;
use rehost_core::AppError;
use sqlx::PgPool;

/// Sink for ingestion records.
///
/// Callers treat a failed insert as non-fatal: the asset is already stored.
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgMediaRecorder {
    pool: PgPool,
}

impl PgMediaRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRecorder for PgMediaRecorder {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "medias",
        db.operation = "insert",
        url = %record.url
    ))]
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO medias (
                sid, record_id, task_id, url, type, media_type, upload_source, meta, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.owner_id)
        .bind(&record.record_id)
        .bind(&record.task_id)
        .bind(&record.url)
        .bind(&record.content_type)
        .bind(record.media_kind)
        .bind(record.upload_source)
        .bind(record.meta())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = ?e,
                url = %record.url,
                "Failed to insert media record"
            );
            AppError::Database(e)
        })?;

        Ok(())
    }
}

/// Recorder used when no database is configured. Every insert succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMediaRecorder;

#[async_trait]
impl MediaRecorder for NoopMediaRecorder {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        tracing::debug!(url = %record.url, "Media record discarded (no database configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rehost_core::models::{MediaKind, UploadSource};

    #[tokio::test]
    async fn test_noop_recorder_accepts_records() {
        let record = MediaRecord {
            owner_id: Some("owner".to_string()),
            record_id: None,
            task_id: None,
            url: "https://cdn.test/media/a.png".to_string(),
            content_type: "image/png".to_string(),
            media_kind: MediaKind::Image,
            upload_source: UploadSource::User,
            origin_url: "https://origin.test/a.png".to_string(),
            filename: "a.png".to_string(),
            size_bytes: 3,
            upload_path: "media".to_string(),
            created_at: Utc::now(),
        };

        assert!(NoopMediaRecorder.insert(&record).await.is_ok());
    }
}
