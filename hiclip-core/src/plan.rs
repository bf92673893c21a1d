//! Clip planning
//!
//! Turns representative times into padded clip windows, and picks which
//! rendered clips go into a merge.

use crate::error::Result;
use crate::paths::MediaPaths;
use crate::types::{clip_label, ClipSpec, Timestamp};
use std::path::{Path, PathBuf};

/// Default padding before a highlight, in seconds.
pub const DEFAULT_SECONDS_BEFORE: f64 = 5.0;

/// Default padding after a highlight, in seconds.
pub const DEFAULT_SECONDS_AFTER: f64 = 10.0;

/// Default label prefix and clip file suffix.
pub const DEFAULT_SUFFIX: &str = "hic";

/// Maps highlight times to clip windows.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlanner {
    pub seconds_before: f64,
    pub seconds_after: f64,
    pub label_prefix: String,
}

impl Default for ClipPlanner {
    fn default() -> Self {
        Self {
            seconds_before: DEFAULT_SECONDS_BEFORE,
            seconds_after: DEFAULT_SECONDS_AFTER,
            label_prefix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl ClipPlanner {
    pub fn new(seconds_before: f64, seconds_after: f64, label_prefix: impl Into<String>) -> Self {
        Self {
            seconds_before,
            seconds_after,
            label_prefix: label_prefix.into(),
        }
    }

    /// One clip per time, or only the one at `selected`.
    ///
    /// Bounds are not clamped here; see [`ClipSpec::clamped`]. A `selected`
    /// index past the end yields no clips.
    pub fn plan(&self, times: &[Timestamp], selected: Option<usize>) -> Vec<ClipSpec> {
        times
            .iter()
            .enumerate()
            .filter(|(index, _)| selected.map_or(true, |s| s == *index))
            .map(|(index, &t)| ClipSpec {
                index,
                start: t as f64 - self.seconds_before,
                end: t as f64 + self.seconds_after,
                label: clip_label(&self.label_prefix, index),
            })
            .collect()
    }
}

/// Pick the clips of one suffix to merge, in ascending index order.
///
/// Only `{id}.{suffix}<digits>.mp4` names qualify, which leaves out the merged
/// output itself and clips of other suffixes that share a prefix.
pub fn select_merge_inputs<P: AsRef<Path>>(candidates: &[P], id: &str, suffix: &str) -> Vec<PathBuf> {
    let stem = format!("{id}.{suffix}");

    let mut indexed: Vec<(u64, PathBuf)> = candidates
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            let name = path.file_name()?.to_str()?;
            let digits = name.strip_prefix(&stem)?.strip_suffix(".mp4")?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: u64 = digits.parse().ok()?;
            Some((index, path.to_path_buf()))
        })
        .collect();

    indexed.sort();
    indexed.into_iter().map(|(_, path)| path).collect()
}

/// Discover rendered clips on disk and select the merge inputs.
pub fn plan_merge(paths: &MediaPaths, suffix: &str) -> Result<Vec<PathBuf>> {
    let pattern = paths.clip_glob(suffix);
    let candidates: Vec<PathBuf> = glob::glob(&pattern)?.flatten().collect();
    let inputs = select_merge_inputs(&candidates, paths.id(), suffix);

    tracing::debug!(
        pattern = %pattern,
        found = candidates.len(),
        selected = inputs.len(),
        "Planned clip merge"
    );
    Ok(inputs)
}
