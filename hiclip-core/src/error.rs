//! Error types for hiclip-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the hiclip-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern while discovering clips
    #[error("invalid clip pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A required input file does not exist or cannot be opened
    #[error("{kind} not found: {}", path.display())]
    ResourceNotFound { kind: &'static str, path: PathBuf },

    /// Malformed elapsed time or timecode text
    #[error("invalid time {input:?}: {reason}")]
    TimeParse { input: String, reason: String },

    /// The keyword matcher selected nothing from the chat log
    ///
    /// `matcher` is `None` when the empty set was caught past extraction.
    #[error(
        "no chat messages matched{}",
        matcher.as_deref().map(|m| format!(" '{m}'")).unwrap_or_default()
    )]
    NoMatchingEvents { matcher: Option<String> },

    /// Matcher name not present in the registry
    #[error("unknown keyword matcher '{name}' (available: {})", available.join(", "))]
    UnknownMatcher {
        name: String,
        available: Vec<String>,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Video cutting or concatenation failed
    #[error("render error: {0}")]
    Render(String),

    /// Chat or video acquisition failed
    #[error("download error: {0}")]
    Download(String),
}

impl Error {
    /// Shorthand for a [`Error::TimeParse`] error.
    pub(crate) fn time_parse(input: &str, reason: impl Into<String>) -> Self {
        Error::TimeParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for hiclip-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_message() {
        let err = Error::ResourceNotFound {
            kind: "chat log",
            path: PathBuf::from("data/abc.chat.json"),
        };
        assert_eq!(err.to_string(), "chat log not found: data/abc.chat.json");
    }

    #[test]
    fn test_unknown_matcher_lists_available() {
        let err = Error::UnknownMatcher {
            name: "nope".to_string(),
            available: vec!["hic_ame".to_string(), "hic_ubye".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'nope'"));
        assert!(msg.contains("hic_ame, hic_ubye"));
    }

    #[test]
    fn test_no_matching_events_message() {
        let named = Error::NoMatchingEvents {
            matcher: Some("hic_ame".to_string()),
        };
        assert_eq!(named.to_string(), "no chat messages matched 'hic_ame'");

        let unnamed = Error::NoMatchingEvents { matcher: None };
        assert_eq!(unnamed.to_string(), "no chat messages matched");
    }
}
