//! Fieldpost Storage Library
//!
//! This crate provides the storage abstraction for the report service and
//! its two implementations: the local filesystem and a remote S3-compatible
//! object store with presigned access URLs.
//!
//! # Storage key format
//!
//! All backends use the same key layout, derived from the single timestamp
//! captured at submission:
//!
//! - `{agent}/{date}_{time}/index.html` — the browsable artifact
//! - `{agent}/{date}_{time}/metadata.json` — the durable metadata record
//! - `{agent}/{date}_{time}/{filename}` — original or derived attachments
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
pub use local::LocalStore;
pub use s3::RemoteStore;
pub use traits::{ObjectInfo, ReportStore, StorageError, StorageResult};
