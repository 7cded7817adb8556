//! Rehost Storage Library
//!
//! This crate provides the object storage abstraction, its S3 and local
//! filesystem implementations, and the upload adapter the pipeline pushes
//! files through.
//!
//! # Storage key format
//!
//! Keys are `{folder}/{filename}`, e.g. `generation/inputs/V1StGXR8_Z5jdHi6B-myT.png`.
//! Keys must not contain `..`, empty segments or a leading `/`. Key
//! generation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod adapter;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use adapter::{StorageUploadAdapter, UploadAdapter};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use rehost_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
