//! Combined text artifact.
//!
//! When a report carries two or more text attachments, one synthetic
//! combined file is produced concatenating them all, each introduced by a
//! delimiter banner: a line of 80 `=` characters, the file name, the file
//! path, then the content and a trailing newline. A file that cannot be
//! read contributes an error line instead of aborting the combine.

use tokio::fs;

use crate::budget::AttachmentCandidate;
use fieldpost_core::FileRole;

/// Name of the synthetic combined attachment.
pub const COMBINED_FILENAME: &str = "combined-files.txt";

const BANNER: &str =
    "================================================================================";

/// Build the combined artifact from the text-classified candidates, in the
/// order given (budgeted-sort order). Returns `None` when fewer than two
/// text files are present.
pub async fn combine_text_files(candidates: &[AttachmentCandidate]) -> Option<Vec<u8>> {
    let text_files: Vec<&AttachmentCandidate> = candidates
        .iter()
        .filter(|c| c.role == FileRole::Text)
        .collect();

    if text_files.len() < 2 {
        return None;
    }

    let mut combined = String::new();
    for candidate in text_files {
        combined.push_str(BANNER);
        combined.push('\n');
        combined.push_str(&candidate.filename);
        combined.push('\n');
        combined.push_str(&candidate.path.display().to_string());
        combined.push('\n');
        match fs::read_to_string(&candidate.path).await {
            Ok(content) => combined.push_str(&content),
            Err(e) => {
                tracing::warn!(
                    file = %candidate.path.display(),
                    error = %e,
                    "Failed to read text file for combined artifact"
                );
                combined.push_str(&format!("[ERROR] failed to read {}: {}", candidate.filename, e));
            }
        }
        combined.push('\n');
    }

    Some(combined.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn text_candidate(path: PathBuf) -> AttachmentCandidate {
        AttachmentCandidate {
            filename: path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
            size_bytes: 0,
            role: FileRole::Text,
            path,
        }
    }

    #[tokio::test]
    async fn combines_two_text_files_with_banner() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.log");
        std::fs::write(&a, "alpha").unwrap();
        std::fs::write(&b, "beta").unwrap();

        let candidates = vec![text_candidate(a.clone()), text_candidate(b.clone())];
        let combined = combine_text_files(&candidates).await.unwrap();
        let text = String::from_utf8(combined).unwrap();

        assert_eq!(text.matches(&"=".repeat(80)).count(), 2);
        assert!(text.contains("a.txt"));
        assert!(text.contains(&a.display().to_string()));
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
        assert!(text.ends_with('\n'));

        // Order preserved: a before b.
        assert!(text.find("alpha").unwrap() < text.find("beta").unwrap());
    }

    #[tokio::test]
    async fn single_text_file_produces_nothing() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("only.txt");
        std::fs::write(&a, "solo").unwrap();

        let candidates = vec![text_candidate(a)];
        assert!(combine_text_files(&candidates).await.is_none());
    }

    #[tokio::test]
    async fn non_text_candidates_are_ignored() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "x").unwrap();

        let candidates = vec![
            text_candidate(a),
            AttachmentCandidate {
                filename: "img.png".to_string(),
                path: dir.path().join("img.png"),
                size_bytes: 0,
                role: FileRole::Image,
            },
        ];
        // Only one *text* file, so no combined artifact.
        assert!(combine_text_files(&candidates).await.is_none());
    }

    #[tokio::test]
    async fn unreadable_file_degrades_to_error_line() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "present").unwrap();
        let missing = dir.path().join("gone.txt");

        let candidates = vec![text_candidate(a), text_candidate(missing)];
        let combined = combine_text_files(&candidates).await.unwrap();
        let text = String::from_utf8(combined).unwrap();

        assert!(text.contains("present"));
        assert!(text.contains("[ERROR] failed to read gone.txt"));
    }
}
