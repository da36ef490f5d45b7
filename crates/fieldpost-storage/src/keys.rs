//! Shared key generation for storage backends.
//!
//! Key format: `{agent}/{date}_{time}/{filename}`, with `date` as
//! `%Y-%m-%d` and `time` as `%H-%M-%S`, both derived from the single
//! timestamp captured at submission so every persisted object of one
//! report lands in the same folder.

use chrono::{DateTime, Utc};

/// Filename of the browsable artifact inside a report folder.
pub const ARTIFACT_FILENAME: &str = "index.html";
/// Filename of the durable metadata record inside a report folder.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Key prefix for one report: `{agent}/{date}_{time}`.
pub fn report_prefix(agent_name: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        sanitize_component(agent_name),
        timestamp.format("%Y-%m-%d"),
        timestamp.format("%H-%M-%S")
    )
}

/// Key for a file inside a report folder.
pub fn object_key(agent_name: &str, timestamp: DateTime<Utc>, filename: &str) -> String {
    format!(
        "{}/{}",
        report_prefix(agent_name, timestamp),
        sanitize_component(filename)
    )
}

/// Key of the metadata record for a report.
pub fn metadata_key(agent_name: &str, timestamp: DateTime<Utc>) -> String {
    object_key(agent_name, timestamp, METADATA_FILENAME)
}

/// Key of the browsable artifact for a report.
pub fn artifact_key(agent_name: &str, timestamp: DateTime<Utc>) -> String {
    object_key(agent_name, timestamp, ARTIFACT_FILENAME)
}

/// Whether a listed key is a metadata record.
pub fn is_metadata_key(key: &str) -> bool {
    key.ends_with(METADATA_FILENAME)
}

/// Listing prefix for all reports of one agent, sanitized the same way
/// keys are sanitized at write time.
pub fn agent_prefix(agent_name: &str) -> String {
    format!("{}/", sanitize_component(agent_name))
}

/// Make a caller-supplied name safe as a single key component.
/// Separators and parent references are replaced, never interpreted.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    cleaned.replace("..", "_")
}
