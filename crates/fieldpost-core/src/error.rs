//! Error types module
//!
//! All errors surfaced by the report service are unified under the
//! [`ReportError`] enum. The taxonomy follows the submission pipeline:
//! validation errors carry no side effects, configuration errors are fatal
//! at startup, and storage/render/notify errors are scoped to the phase
//! that produced them. Partial attachment failures and delivery failures
//! are reported as warnings on the submission outcome, not as errors.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Internal(format!("JSON error: {}", err))
    }
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        ReportError::Internal(err.to_string())
    }
}

impl ReportError {
    /// Get the error type name for structured logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "Validation",
            ReportError::Config(_) => "Config",
            ReportError::Storage(_) => "Storage",
            ReportError::NotFound(_) => "NotFound",
            ReportError::Render(_) => "Render",
            ReportError::Notify(_) => "Notify",
            ReportError::Internal(_) => "Internal",
        }
    }

    /// Whether this error is a caller mistake rather than a service fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ReportError::Validation(_) | ReportError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_names() {
        assert_eq!(
            ReportError::Validation("bad".into()).error_type(),
            "Validation"
        );
        assert_eq!(ReportError::NotFound("x".into()).error_type(), "NotFound");
        assert_eq!(ReportError::Storage("s".into()).error_type(), "Storage");
    }

    #[test]
    fn caller_errors() {
        assert!(ReportError::Validation("bad".into()).is_caller_error());
        assert!(ReportError::NotFound("tag".into()).is_caller_error());
        assert!(!ReportError::Storage("down".into()).is_caller_error());
        assert!(!ReportError::Config("missing".into()).is_caller_error());
    }

    #[test]
    fn io_error_conversion() {
        let err: ReportError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.error_type(), "Internal");
        assert!(err.to_string().contains("gone"));
    }
}
