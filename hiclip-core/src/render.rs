//! Video cutting and concatenation
//!
//! The pipeline only talks to a [`ClipRenderer`]; [`Ffmpeg`] is the stock
//! implementation that shells out to `ffmpeg`/`ffprobe`.
//!
//! Clip windows are clamped into the video with [`ClipSpec::clamped`] right
//! before cutting. The planner hands over raw `t - before .. t + after`
//! windows; this stage is the only place bounds are enforced.

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::paths::MediaPaths;
use crate::plan::plan_merge;
use crate::types::ClipSpec;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that can cut and join video files.
pub trait ClipRenderer {
    /// Length of the video in seconds, `None` if it cannot be determined.
    fn probe_duration(&self, source: &Path) -> Result<Option<f64>>;

    /// Write `clip.start..clip.end` of `source` to `output`.
    fn cut(&self, source: &Path, clip: &ClipSpec, output: &Path) -> Result<()>;

    /// Join `inputs` in order into `output`.
    fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// [`ClipRenderer`] backed by the ffmpeg command-line tools.
pub struct Ffmpeg {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl Ffmpeg {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg.clone(),
            ffprobe_path: config.ffprobe.clone(),
        }
    }

    fn run(&self, command: &mut Command, what: &str) -> Result<()> {
        tracing::debug!(command = ?command, "Running {}", what);
        let output = command
            .output()
            .map_err(|e| Error::Render(format!("failed to execute {what}: {e}")))?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "{what} failed ({}): {}",
                output.status,
                last_lines(&String::from_utf8_lossy(&output.stderr), 5)
            )));
        }
        Ok(())
    }
}

impl ClipRenderer for Ffmpeg {
    fn probe_duration(&self, source: &Path) -> Result<Option<f64>> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(source)
            .output()
            .map_err(|e| Error::Render(format!("failed to execute ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "ffprobe failed: {}",
                last_lines(&String::from_utf8_lossy(&output.stderr), 5)
            )));
        }

        Ok(parse_probe_duration(&String::from_utf8_lossy(&output.stdout)))
    }

    fn cut(&self, source: &Path, clip: &ClipSpec, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-ss", &format!("{:.3}", clip.start)])
            .arg("-i")
            .arg(source)
            .args(["-t", &format!("{:.3}", clip.duration())])
            .args(["-c:v", "libx264", "-c:a", "aac", "-movflags", "+faststart"])
            .arg(output);
        self.run(&mut command, "ffmpeg cut")
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let list_path = output.with_extension("txt");
        std::fs::write(&list_path, concat_list(inputs)?)?;

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(output);
        let result = self.run(&mut command, "ffmpeg concat");

        if let Err(e) = std::fs::remove_file(&list_path) {
            tracing::warn!(path = %list_path.display(), error = %e, "Failed to remove concat list");
        }
        result
    }
}

/// ffprobe prints the duration alone on a line, or `N/A`.
fn parse_probe_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .find_map(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Concat demuxer input listing, absolute paths so the list's own location does not matter.
fn concat_list(inputs: &[PathBuf]) -> Result<String> {
    let cwd = std::env::current_dir()?;
    let mut list = String::new();
    for input in inputs {
        let absolute = if input.is_absolute() {
            input.clone()
        } else {
            cwd.join(input)
        };
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        list.push_str(&format!("file '{escaped}'\n"));
    }
    Ok(list)
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join(" | ")
}

/// Cut every planned clip out of the video.
///
/// The video must exist before anything is written. Clips that fall entirely
/// outside the video are skipped with a warning. Returns the written files.
pub fn render_clips(
    renderer: &dyn ClipRenderer,
    paths: &MediaPaths,
    clips: &[ClipSpec],
) -> Result<Vec<PathBuf>> {
    let video = paths.video();
    if !video.exists() {
        return Err(Error::ResourceNotFound {
            kind: "video",
            path: video,
        });
    }

    let duration = match renderer.probe_duration(&video) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "Could not probe video duration, clamping start only");
            None
        }
    };

    let mut written = Vec::with_capacity(clips.len());
    for clip in clips {
        let Some(bounded) = clip.clamped(duration) else {
            tracing::warn!(
                label = %clip.label,
                start = clip.start,
                end = clip.end,
                duration = ?duration,
                "Clip lies outside the video, skipping"
            );
            continue;
        };
        if bounded != *clip {
            tracing::info!(
                label = %clip.label,
                from = ?(clip.start, clip.end),
                to = ?(bounded.start, bounded.end),
                "Clamped clip window"
            );
        }

        let output = paths.clip(&bounded.label);
        renderer.cut(&video, &bounded, &output)?;
        tracing::info!(label = %bounded.label, path = %output.display(), "Rendered clip");
        written.push(output);
    }
    Ok(written)
}

/// Join the rendered clips of `suffix` into the merged file.
///
/// Returns the inputs used and the merged path, or `None` when there was
/// nothing to merge.
pub fn merge_clips(
    renderer: &dyn ClipRenderer,
    paths: &MediaPaths,
    suffix: &str,
) -> Result<Option<(Vec<PathBuf>, PathBuf)>> {
    let inputs = plan_merge(paths, suffix)?;
    if inputs.is_empty() {
        tracing::warn!(suffix, "No clips to merge");
        return Ok(None);
    }

    let output = paths.merged(suffix);
    renderer.concat(&inputs, &output)?;
    tracing::info!(
        inputs = inputs.len(),
        path = %output.display(),
        "Merged clips"
    );
    Ok(Some((inputs, output)))
}
