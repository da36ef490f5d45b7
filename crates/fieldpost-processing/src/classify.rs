//! Content classification by filename.
//!
//! Pure function of the filename string; never opens the file. The image
//! set is the fixed raster list; the text set is the concatenation-eligible
//! list of source/config/log extensions.

use std::path::Path;

use fieldpost_core::FileRole;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const TEXT_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "py", "r", "sh", "txt", "log", "toml", "md",
];

/// Determine the role of a file from its name alone.
pub fn classify(filename: &str) -> FileRole {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => FileRole::Image,
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => FileRole::Text,
        _ => FileRole::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images() {
        assert_eq!(classify("shot.png"), FileRole::Image);
        assert_eq!(classify("photo.JPG"), FileRole::Image);
        assert_eq!(classify("anim.gif"), FileRole::Image);
        assert_eq!(classify("pic.webp"), FileRole::Image);
    }

    #[test]
    fn text() {
        assert_eq!(classify("config.yaml"), FileRole::Text);
        assert_eq!(classify("train.py"), FileRole::Text);
        assert_eq!(classify("analysis.R"), FileRole::Text);
        assert_eq!(classify("run.sh"), FileRole::Text);
        assert_eq!(classify("out.log"), FileRole::Text);
    }

    #[test]
    fn other() {
        assert_eq!(classify("model.bin"), FileRole::Other);
        assert_eq!(classify("archive.tar.gz"), FileRole::Other);
        assert_eq!(classify("noextension"), FileRole::Other);
        // SVG is not in the raster list.
        assert_eq!(classify("diagram.svg"), FileRole::Other);
    }

    #[test]
    fn paths_are_reduced_to_their_extension() {
        assert_eq!(classify("/var/run/agent/shot.png"), FileRole::Image);
        assert_eq!(classify("nested/dir/notes.md"), FileRole::Text);
    }
}
