//! Rehost Core Library
//!
//! This crate provides the domain models, error types, configuration, extension
//! inference and ID generation shared by the storage, database and pipeline crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod extension;
pub mod id;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, MetadataWriteMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use extension::resolve_extension;
pub use id::{IdGenerator, NanoIdGenerator};
pub use storage_types::StorageBackend;
