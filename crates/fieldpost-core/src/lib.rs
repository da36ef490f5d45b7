//! Fieldpost Core Library
//!
//! This crate provides the shared building blocks for the fieldpost report
//! service: the data model (reports, attachments, metadata records), the
//! environment-driven configuration, the error taxonomy, and the tag
//! generator.
//!
//! The backend mode (local filesystem vs. remote object store + email) is
//! decided once per process from configuration, never per report. See
//! [`config::Config`].

pub mod config;
pub mod error;
pub mod models;
pub mod tag;

pub use config::Config;
pub use error::{ReportError, ReportResult};
pub use models::{
    AttachmentRecord, FileRole, ReportMetadata, ReportMode, SubmitOutcome, SubmitRequest,
};
pub use tag::{generate_tag, normalize_tag};

/// Resolve a short label for the submitting host, used in metadata records.
///
/// Falls back to `"unknown"` when the hostname cannot be determined; a
/// missing label must never fail a submission.
pub fn host_label() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
