//! Fieldpost Services Layer
//!
//! This crate is the **business service layer**: it hosts the submission
//! orchestrator ([`ReportService`]), the report index/search
//! ([`ReportFinder`]) and the email notifier, and re-exports a unified API
//! from core, storage, processing and render so that callers (the CLI, or
//! an embedding runtime) depend on a single facade.

pub mod notify;
pub mod report;
pub mod search;

pub use notify::{EmailNotifier, EmbeddedFile};
pub use report::ReportService;
pub use search::{ReportFinder, SearchCriteria};

pub use fieldpost_core::{
    Config, ReportError, ReportMetadata, ReportMode, ReportResult, SubmitOutcome, SubmitRequest,
};
pub use fieldpost_storage::{create_store, LocalStore, RemoteStore, ReportStore, StorageError};
