//! Chat log and video acquisition
//!
//! Both downloads shell out to configurable external tools (see
//! [`DownloadConfig`]). Everything a download needs travels in a
//! [`DownloadContext`] and everything it produced comes back in a
//! [`DownloadReport`]; nothing is shared between runs.
//!
//! The chat tool writes raw items to `{id}.chat.tmp`. Once it exits the items
//! are normalized and wrapped into `{id}.chat.json`.
//!
//! [`Downloader`] owns a private current-thread tokio runtime so callers stay
//! synchronous while chat and video download side by side.

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::paths::MediaPaths;
use crate::types::{ChatEvent, ChatLog};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Per-video inputs for a download.
#[derive(Debug, Clone)]
pub struct DownloadContext {
    paths: MediaPaths,
    url: String,
}

impl DownloadContext {
    pub fn new(paths: MediaPaths, config: &DownloadConfig) -> Self {
        let url = config.url_template.replace("{id}", paths.id());
        Self { paths, url }
    }

    pub fn paths(&self) -> &MediaPaths {
        &self.paths
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fill `{id}`, `{url}` and `{output}` into each argument of a command template.
    pub fn substitute(&self, template: &[String], output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        template
            .iter()
            .map(|arg| {
                arg.replace("{id}", self.paths.id())
                    .replace("{url}", &self.url)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

/// What a download run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Written chat log, if chat was downloaded
    pub chat_log: Option<PathBuf>,
    /// Number of chat messages in the written log
    pub chat_messages: usize,
    /// Downloaded video, if video was downloaded
    pub video: Option<PathBuf>,
}

/// Blocking front end over the async download tasks.
pub struct Downloader {
    config: DownloadConfig,
    runtime: tokio::runtime::Runtime,
}

impl Downloader {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Download(format!("failed to create runtime: {e}")))?;

        Ok(Self {
            config: config.clone(),
            runtime,
        })
    }

    /// Download only the chat log.
    pub fn download_chat(&self, ctx: &DownloadContext) -> Result<DownloadReport> {
        self.runtime.block_on(async {
            let (chat_log, chat_messages) = fetch_chat(&self.config, ctx).await?;
            Ok(DownloadReport {
                chat_log: Some(chat_log),
                chat_messages,
                video: None,
            })
        })
    }

    /// Download only the video.
    pub fn download_video(&self, ctx: &DownloadContext) -> Result<DownloadReport> {
        self.runtime.block_on(async {
            let video = fetch_video(&self.config, ctx).await?;
            Ok(DownloadReport {
                video: Some(video),
                ..Default::default()
            })
        })
    }

    /// Download chat and video concurrently.
    ///
    /// Both tasks run to completion; if either failed, the chat error wins.
    pub fn download_all(&self, ctx: &DownloadContext) -> Result<DownloadReport> {
        self.runtime.block_on(async {
            let (chat, video) =
                tokio::join!(fetch_chat(&self.config, ctx), fetch_video(&self.config, ctx));
            let (chat_log, chat_messages) = chat?;
            Ok(DownloadReport {
                chat_log: Some(chat_log),
                chat_messages,
                video: Some(video?),
            })
        })
    }
}

async fn fetch_chat(config: &DownloadConfig, ctx: &DownloadContext) -> Result<(PathBuf, usize)> {
    let staging = ctx.paths().chat_staging();
    if staging.exists() {
        tokio::fs::remove_file(&staging).await?;
    }

    tracing::info!(id = ctx.paths().id(), url = ctx.url(), "Downloading chat");
    run_tool(ctx.substitute(&config.chat_command, &staging), "chat download").await?;

    let text = tokio::fs::read_to_string(&staging)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::Download(format!(
                "chat tool exited without writing {}",
                staging.display()
            )),
            _ => Error::Io(e),
        })?;

    let log = chat_log_from_staging(ctx.paths().id(), &text)?;
    let chat_log = ctx.paths().chat_log();
    tokio::fs::write(&chat_log, serde_json::to_vec(&log)?).await?;

    tracing::info!(
        path = %chat_log.display(),
        messages = log.chats.len(),
        "Chat log written"
    );
    Ok((chat_log, log.chats.len()))
}

async fn fetch_video(config: &DownloadConfig, ctx: &DownloadContext) -> Result<PathBuf> {
    let video = ctx.paths().video();
    tracing::info!(id = ctx.paths().id(), url = ctx.url(), "Downloading video");
    run_tool(ctx.substitute(&config.video_command, &video), "video download").await?;

    if !video.exists() {
        return Err(Error::Download(format!(
            "video tool exited without writing {}",
            video.display()
        )));
    }
    tracing::info!(path = %video.display(), "Video written");
    Ok(video)
}

async fn run_tool(argv: Vec<String>, what: &str) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(Error::Download(format!("{what} command is empty")));
    };

    tracing::debug!(program = %program, ?args, "Spawning {}", what);
    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::Download(format!("failed to execute {program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Download(format!(
            "{what} failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Build a chat log from the chat tool's output.
///
/// Accepts a JSON array of items or one JSON item per line. Items without
/// `elapsedTime` take it from `time_text`; items with neither are dropped.
pub fn chat_log_from_staging(id: &str, text: &str) -> Result<ChatLog> {
    let items: Vec<Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text)?
    } else {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<Value>)
            .collect::<std::result::Result<_, _>>()?
    };

    let total = items.len();
    let chats: Vec<ChatEvent> = items.into_iter().filter_map(normalize_item).collect();
    if chats.len() < total {
        tracing::warn!(
            dropped = total - chats.len(),
            "Dropped chat items without an elapsed time"
        );
    }

    Ok(ChatLog {
        id: id.to_string(),
        chats,
    })
}

fn normalize_item(item: Value) -> Option<ChatEvent> {
    let Value::Object(mut map) = item else {
        return None;
    };
    if !map.contains_key("elapsedTime") {
        let time_text = map.get("time_text")?.clone();
        map.insert("elapsedTime".to_string(), time_text);
    }
    if !map.get("elapsedTime").is_some_and(Value::is_string) {
        return None;
    }
    serde_json::from_value(Value::Object(map)).ok()
}
