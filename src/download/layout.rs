//! On-disk layout of one downloaded talk:
//!
//! ```text
//! <output_root>/<event>/<talk_id>/
//!     video.<format>
//!     metadata.txt
//!     attachments/<filename>
//! ```

use std::path::{Path, PathBuf};

use super::filename::sanitize_filename;

/// Name of the metadata file inside a talk directory.
pub const METADATA_FILE: &str = "metadata.txt";

/// Name of the attachment sub-directory inside a talk directory.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Paths for one talk of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkLayout {
    dir: PathBuf,
    format: String,
}

impl TalkLayout {
    /// Computes the layout; event name and talk id are sanitized into single
    /// path components.
    #[must_use]
    pub fn new(output_root: &Path, event_name: &str, talk_id: &str, format: &str) -> Self {
        let dir = output_root
            .join(sanitize_filename(event_name))
            .join(sanitize_filename(talk_id));
        Self {
            dir,
            format: format.to_ascii_lowercase(),
        }
    }

    /// The talk directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `video.<format>`.
    #[must_use]
    pub fn video_path(&self) -> PathBuf {
        self.dir.join(format!("video.{}", self.format))
    }

    /// `metadata.txt`.
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// `attachments/`.
    #[must_use]
    pub fn attachments_dir(&self) -> PathBuf {
        self.dir.join(ATTACHMENTS_DIR)
    }

    /// `attachments/<filename>` with the filename sanitized again.
    #[must_use]
    pub fn attachment_path(&self, filename: &str) -> PathBuf {
        self.attachments_dir().join(sanitize_filename(filename))
    }

    /// True when both the video and the metadata file exist.
    ///
    /// Existence only; sizes and contents are not checked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.video_path().is_file() && self.metadata_path().is_file()
    }
}
