//! Database access for ingestion records
//!
//! The pipeline writes one [`MediaRecord`](rehost_core::models::MediaRecord)
//! per rehosted asset through the [`MediaRecorder`] trait. PostgreSQL is the
//! production backend; [`NoopMediaRecorder`] is used when no database is
//! configured.

pub mod media;
pub mod pool;

pub use media::{MediaRecorder, NoopMediaRecorder, PgMediaRecorder};
pub use pool::{connect, run_migrations};
