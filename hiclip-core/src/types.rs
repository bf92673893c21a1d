//! Core domain types for hiclip
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Chat log** | The complete live-chat transcript of one stream, as downloaded |
//! | **Chat event** | A single chat message with its elapsed time into the stream |
//! | **Timestamp** | Elapsed time of a matching chat event, in whole seconds |
//! | **Highlight** | A burst of matching chat events, reduced to one representative time |
//! | **Clip** | A padded `[start, end]` window around a highlight, cut from the video |
//!
//! Every type here is an immutable value record. Nothing outlives a single run
//! except the files written through [`crate::timecode`] and the renderer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Elapsed seconds since the start of the recording.
///
/// Signed because live chat carries messages posted before the stream starts.
pub type Timestamp = i64;

// ============================================
// Chat log
// ============================================

/// A single live-chat message.
///
/// Only `elapsedTime` and `message` are interpreted; every other field of the
/// downloaded item is kept in `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Offset into the recording, `[H:]MM:SS`
    #[serde(rename = "elapsedTime")]
    pub elapsed_time: String,
    /// Message text as posted
    #[serde(default)]
    pub message: String,
    /// Remaining fields of the source record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatEvent {
    /// Create a chat event with no extra fields.
    pub fn new(elapsed_time: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            elapsed_time: elapsed_time.into(),
            message: message.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Chat log for one video, as stored in `{id}.chat.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLog {
    /// Video identifier
    pub id: String,
    /// Messages in log order
    pub chats: Vec<ChatEvent>,
}

impl ChatLog {
    /// Load a chat log from disk.
    ///
    /// A missing file is reported as [`Error::ResourceNotFound`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ResourceNotFound {
                kind: "chat log",
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;
        let log: ChatLog = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            id = %log.id,
            chats = log.chats.len(),
            "Loaded chat log"
        );
        Ok(log)
    }
}

// ============================================
// Highlights and clips
// ============================================

/// One surviving cluster of matching chat events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HighlightEvent {
    /// Second-smallest member of the cluster
    pub representative_time: Timestamp,
    /// Number of chat events in the cluster
    pub member_count: usize,
}

/// Label shared by a timecode line and the clip file it produces.
///
/// `clip_label("hic", 3)` is `"hic03"`.
pub fn clip_label(prefix: &str, index: usize) -> String {
    format!("{prefix}{index:02}")
}

/// A padded window around a highlight, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Position of the source time in the planned list
    pub index: usize,
    /// Window start in seconds; may be negative before clamping
    pub start: f64,
    /// Window end in seconds; may exceed the video before clamping
    pub end: f64,
    /// `<prefix><index:02>`
    pub label: String,
}

impl ClipSpec {
    /// Clamp the window into `[0, duration]`.
    ///
    /// With an unknown duration only the lower bound applies. Returns `None`
    /// when nothing of the window is left inside the video.
    pub fn clamped(&self, duration: Option<f64>) -> Option<ClipSpec> {
        let start = self.start.max(0.0);
        let end = match duration {
            Some(d) => self.end.min(d),
            None => self.end,
        };
        if end <= start {
            return None;
        }
        Some(ClipSpec {
            start,
            end,
            ..self.clone()
        })
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
