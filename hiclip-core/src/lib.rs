//! # hiclip-core
//!
//! Core library for hiclip, which cuts highlight clips out of a recorded live
//! stream by finding bursts of a keyword in its chat.
//!
//! This library provides:
//! - Chat log and highlight types
//! - Keyword matchers behind a name registry
//! - Burst clustering and timecode persistence
//! - Clip planning, rendering and merging via ffmpeg
//! - Chat and video download via external tools
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Pipeline
//!
//! chat log → [`extract`] → [`TimeClusterer`] → [`timecode`] file →
//! [`ClipPlanner`] → [`render`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use hiclip_core::{create_registry, extract, ChatLog, ClipPlanner, Config, MediaPaths, TimeClusterer};
//!
//! let config = Config::load().expect("failed to load config");
//! let paths = MediaPaths::new(&config.storage.data_dir, "TgEX7HFqTYc");
//!
//! let registry = create_registry(&config.matchers).expect("invalid matchers");
//! let matcher = registry.get("hic_ubye").expect("unknown matcher");
//!
//! let log = ChatLog::load(&paths.chat_log()).expect("failed to load chat");
//! let hits = extract::extract_matching(&log.chats, matcher).expect("no hits");
//! let highlights = TimeClusterer::default().highlights(&hits).expect("clustering failed");
//!
//! let times: Vec<_> = highlights.iter().map(|h| h.representative_time).collect();
//! for clip in ClipPlanner::default().plan(&times, None) {
//!     println!("{} {:.0}..{:.0}", clip.label, clip.start, clip.end);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use cluster::TimeClusterer;
pub use config::Config;
pub use download::{DownloadContext, DownloadReport, Downloader};
pub use error::{Error, Result};
pub use histogram::Histogram;
pub use matchers::{create_registry, EventPredicate, MatcherRegistry};
pub use paths::MediaPaths;
pub use plan::ClipPlanner;
pub use render::{ClipRenderer, Ffmpeg};
pub use types::*;

// Public modules
pub mod cluster;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod histogram;
pub mod logging;
pub mod matchers;
pub mod paths;
pub mod plan;
pub mod render;
pub mod timecode;
pub mod types;
