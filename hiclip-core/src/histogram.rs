//! Diagnostic histogram of keyword hits
//!
//! Buckets timestamps into fixed-width bins (one minute by default) and
//! renders them as a text bar chart with highlights annotated, for checking
//! clustering settings before cutting any video.

use crate::timecode::format_duration;
use crate::types::{HighlightEvent, Timestamp};

/// Default bin width in seconds.
pub const DEFAULT_BIN_SECS: Timestamp = 60;

/// Most bins a histogram will hold; wider spans get wider bins.
pub const MAX_BINS: usize = 10_000;

/// Hit counts per fixed-width time bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Start of the first bin
    pub origin: Timestamp,
    /// Width of every bin in seconds
    pub bin_secs: Timestamp,
    /// Hits per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin timestamps, `bin_secs` wide, starting at the earliest one.
    ///
    /// A zero span (all hits in one second) still gets a single bin, and an
    /// empty input gets none. If the span would need more than [`MAX_BINS`]
    /// bins, the bins are widened until it fits.
    pub fn from_timestamps(timestamps: &[Timestamp], bin_secs: Timestamp) -> Self {
        let requested = bin_secs.max(1).unsigned_abs();
        let (Some(&min), Some(&max)) = (timestamps.iter().min(), timestamps.iter().max()) else {
            return Self {
                origin: 0,
                bin_secs: bin_secs.max(1),
                counts: Vec::new(),
            };
        };

        let span = max.abs_diff(min);
        let width = if span / requested >= MAX_BINS as u64 {
            span / (MAX_BINS as u64 - 1) + 1
        } else {
            requested
        };

        let mut counts = vec![0; (span / width) as usize + 1];
        for &t in timestamps {
            counts[(t.abs_diff(min) / width) as usize] += 1;
        }

        Self {
            origin: min,
            bin_secs: Timestamp::try_from(width).unwrap_or(Timestamp::MAX),
            counts,
        }
    }

    /// Start time of bin `index`.
    pub fn bin_start(&self, index: usize) -> Timestamp {
        let offset = Timestamp::try_from(index)
            .unwrap_or(Timestamp::MAX)
            .saturating_mul(self.bin_secs);
        self.origin.saturating_add(offset)
    }

    /// Bin holding `t`, if it falls inside the histogram.
    pub fn bin_of(&self, t: Timestamp) -> Option<usize> {
        if t < self.origin {
            return None;
        }
        let offset = t.abs_diff(self.origin) / self.bin_secs.unsigned_abs();
        let index = usize::try_from(offset).ok()?;
        (index < self.counts.len()).then_some(index)
    }

    /// Largest bin count, zero when empty.
    pub fn peak(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Render non-empty bins as bars `width` characters at most, marking bins
    /// that contain a highlight.
    pub fn render(&self, highlights: &[HighlightEvent], width: usize) -> String {
        let peak = self.peak().max(1);
        let mut out = String::new();

        for (i, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let bar_len = (count * width + peak - 1) / peak;

            out.push_str(&format!(
                "{:>9} |{:<width$}| {count}",
                format_duration(self.bin_start(i)),
                "#".repeat(bar_len),
            ));
            for h in highlights
                .iter()
                .filter(|h| self.bin_of(h.representative_time) == Some(i))
            {
                out.push_str(&format!(
                    "  <- {}--{}reports",
                    format_duration(h.representative_time),
                    h.member_count
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!("Highlight events: (Total: {})\n", highlights.len()));
        out
    }
}
