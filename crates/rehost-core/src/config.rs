//! Configuration module
//!
//! Environment-driven configuration for storage, the metadata database, the
//! remote fetch client and the batch uploader.

use std::env;
use std::str::FromStr;

use crate::constants::{DEFAULT_BATCH_FOLDER, DEFAULT_REHOST_PATH};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const FETCH_TIMEOUT_SECS: u64 = 60;
const MAX_FETCH_SIZE_MB: usize = 100;
const BATCH_UPLOAD_CONCURRENCY: usize = 4;

/// How the rehoster performs its best-effort metadata write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataWriteMode {
    /// Awaited before returning, inside an error boundary.
    #[default]
    Inline,
    /// Spawned onto the runtime; the call returns without waiting for it.
    Detached,
}

impl FromStr for MetadataWriteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(MetadataWriteMode::Inline),
            "detached" => Ok(MetadataWriteMode::Detached),
            _ => Err(anyhow::anyhow!("Invalid metadata write mode: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (R2, MinIO, ...)
    pub s3_public_base_url: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Metadata database; absent disables recording
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Remote fetch
    pub fetch_timeout_secs: u64,
    pub max_fetch_size_bytes: usize,
    // Pipeline behaviour
    pub batch_upload_concurrency: usize,
    pub batch_upload_folder: String,
    pub rehost_upload_path: String,
    pub metadata_write_mode: MetadataWriteMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            s3_public_base_url: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
            max_fetch_size_bytes: MAX_FETCH_SIZE_MB * 1024 * 1024,
            batch_upload_concurrency: BATCH_UPLOAD_CONCURRENCY,
            batch_upload_folder: DEFAULT_BATCH_FOLDER.to_string(),
            rehost_upload_path: DEFAULT_REHOST_PATH.to_string(),
            metadata_write_mode: MetadataWriteMode::Inline,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) if !s.trim().is_empty() => Some(s.parse::<StorageBackend>()?),
            _ => None,
        };

        let metadata_write_mode = match env::var("METADATA_WRITE_MODE") {
            Ok(s) if !s.trim().is_empty() => s.parse::<MetadataWriteMode>()?,
            _ => MetadataWriteMode::default(),
        };

        let max_fetch_size_mb = env::var("MAX_FETCH_SIZE_MB")
            .unwrap_or_else(|_| MAX_FETCH_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FETCH_SIZE_MB);

        let config = Config {
            environment,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            s3_public_base_url: env::var("S3_PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok().filter(|s| !s.is_empty()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(FETCH_TIMEOUT_SECS),
            max_fetch_size_bytes: max_fetch_size_mb * 1024 * 1024,
            batch_upload_concurrency: env::var("BATCH_UPLOAD_CONCURRENCY")
                .unwrap_or_else(|_| BATCH_UPLOAD_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(BATCH_UPLOAD_CONCURRENCY),
            batch_upload_folder: env::var("BATCH_UPLOAD_FOLDER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BATCH_FOLDER.to_string()),
            rehost_upload_path: env::var("REHOST_UPLOAD_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REHOST_PATH.to_string()),
            metadata_write_mode,
        };

        config.validate()?;
        Ok(config)
    }

    /// Backend in effect; S3 when `STORAGE_BACKEND` is unset.
    pub fn effective_backend(&self) -> StorageBackend {
        self.storage_backend.unwrap_or(StorageBackend::S3)
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn effective_s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.batch_upload_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "BATCH_UPLOAD_CONCURRENCY must be at least 1"
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        match self.effective_backend() {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.effective_s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn s3_public_base_url(&self) -> Option<&str> {
        self.s3_public_base_url.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> Config {
        Config {
            storage_backend: Some(StorageBackend::Local),
            local_storage_path: Some("/tmp/rehost".to_string()),
            local_storage_base_url: Some("http://localhost:3000/files".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_upload_folder, "generation/inputs");
        assert_eq!(config.rehost_upload_path, "media");
        assert_eq!(config.metadata_write_mode, MetadataWriteMode::Inline);
        assert_eq!(config.max_fetch_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.effective_backend(), StorageBackend::S3);
    }

    #[test]
    fn test_validate_local_backend() {
        assert!(local_config().validate().is_ok());

        let missing_url = Config {
            local_storage_base_url: None,
            ..local_config()
        };
        assert!(missing_url.validate().is_err());
    }

    #[test]
    fn test_validate_s3_requires_bucket_and_region() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));

        let config = Config {
            s3_bucket: Some("media".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            s3_bucket: Some("media".to_string()),
            aws_region: Some("auto".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_region_prefers_explicit_setting() {
        let config = Config {
            aws_region: Some("us-east-1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.effective_s3_region(), Some("us-east-1"));

        let config = Config {
            s3_region: Some("eu-west-3".to_string()),
            ..config
        };
        assert_eq!(config.effective_s3_region(), Some("eu-west-3"));
        assert_eq!(Config::default().effective_s3_region(), None);
    }

    #[test]
    fn test_validate_database_url() {
        let config = Config {
            database_url: Some("mysql://localhost/db".to_string()),
            ..local_config()
        };
        assert!(config.validate().is_err());

        let config = Config {
            database_url: Some("postgres://localhost/db".to_string()),
            ..local_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = Config {
            batch_upload_concurrency: 0,
            ..local_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_write_mode() {
        assert_eq!(
            "Detached".parse::<MetadataWriteMode>().unwrap(),
            MetadataWriteMode::Detached
        );
        assert_eq!(
            "inline".parse::<MetadataWriteMode>().unwrap(),
            MetadataWriteMode::Inline
        );
        assert!("later".parse::<MetadataWriteMode>().is_err());
    }
}
