//! Data model for reports, attachments, and the durable metadata record.
//!
//! [`ReportMetadata`] is the queryable record written alongside the rendered
//! artifact. It is created once at submission and never mutated; the
//! metadata records in the backing store *are* the search index — there is
//! no separate database.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Backend mode, decided once per service instance from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Offline filesystem backend; locators are paths, no notifier.
    Local,
    /// Object store + email backend; locators are time-limited URLs.
    Remote,
}

impl FromStr for ReportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ReportMode::Local),
            "remote" => Ok(ReportMode::Remote),
            _ => Err(anyhow::anyhow!("Invalid report mode: {}", s)),
        }
    }
}

impl Display for ReportMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ReportMode::Local => write!(f, "local"),
            ReportMode::Remote => write!(f, "remote"),
        }
    }
}

/// Role of an attachment, determined from its filename alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Image,
    Text,
    Other,
}

/// Per-file result after processing one attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub role: FileRole,
    /// Filesystem path (local mode) or time-limited URL (remote mode).
    pub locator: String,
    /// Whether the file's bytes were inlined into the notification.
    pub embedded: bool,
}

/// The durable, queryable record written alongside the rendered artifact.
///
/// Field set is stable; `date`, `hour` and `minute` are derived from the
/// single submission timestamp so every view of the report agrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tag: String,
    pub agent_name: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    /// YYYY-MM-DD, derived from `timestamp`.
    pub date: String,
    pub hour: u8,
    pub minute: u8,
    pub artifact_locator: String,
    pub host_label: String,
    pub mode: ReportMode,
}

impl ReportMetadata {
    /// Build a metadata record from the submission timestamp. The derived
    /// date/hour/minute fields always agree with `timestamp`.
    pub fn new(
        tag: String,
        agent_name: String,
        title: String,
        timestamp: DateTime<Utc>,
        artifact_locator: String,
        host_label: String,
        mode: ReportMode,
    ) -> Self {
        Self {
            tag,
            agent_name,
            title,
            date: timestamp.format("%Y-%m-%d").to_string(),
            hour: timestamp.hour() as u8,
            minute: timestamp.minute() as u8,
            timestamp,
            artifact_locator,
            host_label,
            mode,
        }
    }
}

/// One submission request, as accepted by the report service.
///
/// Exactly one of `body` / `body_file` must be supplied; both or neither is
/// a validation error. `files` is explicit input only — there is no
/// attachment auto-discovery.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub agent_name: String,
    pub title: String,
    pub body: Option<String>,
    pub body_file: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub urgent: bool,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub tag: String,
    /// Locator of the browsable artifact.
    pub locator: String,
    pub attachment_count: usize,
    pub embedded_count: usize,
    /// Non-fatal problems: skipped attachments, failed notification.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_mode_round_trip() {
        assert_eq!("local".parse::<ReportMode>().unwrap(), ReportMode::Local);
        assert_eq!("Remote".parse::<ReportMode>().unwrap(), ReportMode::Remote);
        assert!("email".parse::<ReportMode>().is_err());
        assert_eq!(ReportMode::Local.to_string(), "local");
        assert_eq!(ReportMode::Remote.to_string(), "remote");
    }

    #[test]
    fn metadata_derived_fields_agree_with_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 7, 14, 42, 9).unwrap();
        let meta = ReportMetadata::new(
            "A1B2".to_string(),
            "bot1".to_string(),
            "Title".to_string(),
            ts,
            "/tmp/report/index.html".to_string(),
            "host-x".to_string(),
            ReportMode::Local,
        );
        assert_eq!(meta.date, "2025-03-07");
        assert_eq!(meta.hour, 14);
        assert_eq!(meta.minute, 42);
        assert_eq!(meta.timestamp, ts);
    }

    #[test]
    fn metadata_serialization_field_set_is_stable() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let meta = ReportMetadata::new(
            "ZZ99".to_string(),
            "agent".to_string(),
            "t".to_string(),
            ts,
            "loc".to_string(),
            "host".to_string(),
            ReportMode::Remote,
        );
        let json = serde_json::to_value(&meta).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "tag",
            "agent_name",
            "title",
            "timestamp",
            "date",
            "hour",
            "minute",
            "artifact_locator",
            "host_label",
            "mode",
        ] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(obj["mode"], "remote");

        let back: ReportMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
