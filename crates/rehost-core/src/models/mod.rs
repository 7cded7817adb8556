//! Data models for the ingestion pipeline
//!
//! `upload` holds the transient inputs and per-file outcomes of an upload;
//! `media` holds the durable record written after a successful rehost.

mod media;
mod upload;

pub use media::*;
pub use upload::*;
