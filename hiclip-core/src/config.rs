//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/hiclip/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/hiclip/` (~/.config/hiclip/)
//! - State/Logs: `$XDG_STATE_HOME/hiclip/` (~/.local/state/hiclip/)
//!
//! Every section is optional; a missing file means all defaults.

use crate::cluster::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MIN_REPORTS};
use crate::error::{Error, Result};
use crate::matchers::DEFAULT_MATCHER;
use crate::plan::{DEFAULT_SECONDS_AFTER, DEFAULT_SECONDS_BEFORE, DEFAULT_SUFFIX};
use crate::types::Timestamp;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where chat logs, videos, and clips live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Burst detection settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Clip window and naming
    #[serde(default)]
    pub clip: ClipConfig,

    /// External download tools
    #[serde(default)]
    pub download: DownloadConfig,

    /// External render tools
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Additional keyword matchers
    #[serde(default)]
    pub matchers: Vec<MatcherConfig>,
}

/// Data folder configuration
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Folder holding every file for every video id
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Burst detection configuration
#[derive(Debug, Deserialize)]
pub struct ClusteringConfig {
    /// Largest gap in seconds between neighbouring hits of one burst
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold_secs: Timestamp,

    /// Fewest hits for a burst to become a highlight
    #[serde(default = "default_min_reports")]
    pub min_reports: usize,

    /// Name of the keyword matcher to use
    #[serde(default = "default_matcher")]
    pub matcher: String,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            distance_threshold_secs: default_distance_threshold(),
            min_reports: default_min_reports(),
            matcher: default_matcher(),
        }
    }
}

fn default_distance_threshold() -> Timestamp {
    DEFAULT_DISTANCE_THRESHOLD
}

fn default_min_reports() -> usize {
    DEFAULT_MIN_REPORTS
}

fn default_matcher() -> String {
    DEFAULT_MATCHER.to_string()
}

/// Clip window configuration
#[derive(Debug, Deserialize)]
pub struct ClipConfig {
    /// Padding before the highlight
    #[serde(default = "default_seconds_before")]
    pub seconds_before: f64,

    /// Padding after the highlight
    #[serde(default = "default_seconds_after")]
    pub seconds_after: f64,

    /// Clip label prefix and file suffix
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            seconds_before: default_seconds_before(),
            seconds_after: default_seconds_after(),
            suffix: default_suffix(),
        }
    }
}

fn default_seconds_before() -> f64 {
    DEFAULT_SECONDS_BEFORE
}

fn default_seconds_after() -> f64 {
    DEFAULT_SECONDS_AFTER
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

/// External download tool configuration
///
/// Commands are argv templates; `{id}`, `{url}` and `{output}` are substituted
/// per argument before spawning.
#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    /// Writes the video to `{output}`
    #[serde(default = "default_video_command")]
    pub video_command: Vec<String>,

    /// Writes chat items to `{output}` as a JSON array or one JSON object per line
    #[serde(default = "default_chat_command")]
    pub chat_command: Vec<String>,

    /// Page URL template, `{id}` substituted
    #[serde(default = "default_url_template")]
    pub url_template: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            video_command: default_video_command(),
            chat_command: default_chat_command(),
            url_template: default_url_template(),
        }
    }
}

fn default_video_command() -> Vec<String> {
    ["yt-dlp", "-f", "mp4", "-o", "{output}", "{url}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_chat_command() -> Vec<String> {
    ["chat_downloader", "--quiet", "--output", "{output}", "{url}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_url_template() -> String {
    "https://www.youtube.com/watch?v={id}".to_string()
}

/// External render tool configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe executable
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A keyword matcher declared in config
///
/// ```toml
/// [[matchers]]
/// name = "kusa"
/// contains = ["草", "www"]
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct MatcherConfig {
    /// Registry name, selected with `clustering.matcher` or `--keyword-func`
    pub name: String,

    /// Whole-message keywords
    #[serde(default)]
    pub exact: Vec<String>,

    /// Substring keywords
    #[serde(default)]
    pub contains: Vec<String>,

    /// Compare case-insensitively
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,
}

fn default_ignore_case() -> bool {
    true
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.clustering.min_reports == 0 {
            return Err(Error::Config(
                "clustering.min_reports must be at least 1".to_string(),
            ));
        }
        if self.clustering.distance_threshold_secs < 0 {
            return Err(Error::Config(
                "clustering.distance_threshold_secs must not be negative".to_string(),
            ));
        }
        if !(self.clip.seconds_before >= 0.0 && self.clip.seconds_after >= 0.0) {
            return Err(Error::Config(
                "clip.seconds_before and clip.seconds_after must not be negative".to_string(),
            ));
        }
        if self.clip.suffix.is_empty() {
            return Err(Error::Config("clip.suffix must not be empty".to_string()));
        }
        if self.download.video_command.is_empty() || self.download.chat_command.is_empty() {
            return Err(Error::Config(
                "download commands must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/hiclip/config.toml` (~/.config/hiclip/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("hiclip").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/hiclip/` (~/.local/state/hiclip/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("hiclip")
    }
}
