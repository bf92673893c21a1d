//! File layout inside the data folder
//!
//! Every file for one video lives next to the others, keyed by the video id:
//!
//! | File | Name |
//! |------|------|
//! | Chat log | `{id}.chat.json` |
//! | Chat staging (during download) | `{id}.chat.tmp` |
//! | Video | `{id}.mp4` |
//! | Timecodes | `{id}.hic.time.csv` |
//! | Diagnostic plot | `{id}.hic.png` |
//! | Clip | `{id}.{label}.mp4` |
//! | Merged clips | `{id}.{suffix}.merged.mp4` |

use std::path::{Path, PathBuf};

/// Paths for one video id inside a data folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPaths {
    folder: PathBuf,
    id: String,
}

impl MediaPaths {
    pub fn new(folder: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            id: id.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn file(&self, name: String) -> PathBuf {
        self.folder.join(name)
    }

    pub fn chat_log(&self) -> PathBuf {
        self.file(format!("{}.chat.json", self.id))
    }

    pub fn chat_staging(&self) -> PathBuf {
        self.file(format!("{}.chat.tmp", self.id))
    }

    pub fn video(&self) -> PathBuf {
        self.file(format!("{}.mp4", self.id))
    }

    pub fn timecode(&self) -> PathBuf {
        self.file(format!("{}.hic.time.csv", self.id))
    }

    pub fn histogram(&self) -> PathBuf {
        self.file(format!("{}.hic.png", self.id))
    }

    /// Rendered clip for a label such as `hic03`.
    pub fn clip(&self, label: &str) -> PathBuf {
        self.file(format!("{}.{label}.mp4", self.id))
    }

    pub fn merged(&self, suffix: &str) -> PathBuf {
        self.file(format!("{}.{suffix}.merged.mp4", self.id))
    }

    /// Glob matching every clip candidate of a suffix (merged output included).
    pub fn clip_glob(&self, suffix: &str) -> String {
        let folder = glob::Pattern::escape(&self.folder.to_string_lossy());
        let stem = glob::Pattern::escape(&format!("{}.{suffix}", self.id));
        format!("{folder}/{stem}*.mp4")
    }
}
