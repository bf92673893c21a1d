//! Duration text and the timecode record file
//!
//! Timecode files hold one highlight per line:
//!
//! ```text
//! 0:12:34,hic00
//! 1:02:05,hic01
//! ```
//!
//! Only the first field is read back; the label is informational and matches
//! the name of the clip file rendered for that line.

use crate::error::{Error, Result};
use crate::types::{clip_label, HighlightEvent, Timestamp};
use std::path::Path;

/// Parse `[H:]MM:SS` (or bare `SS`) into seconds.
///
/// Missing high-order fields are taken as zero, so `"2:05"` is `0:02:05`.
/// A leading `-` negates the whole value.
pub fn parse_duration(text: &str) -> Result<Timestamp> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if body.is_empty() {
        return Err(Error::time_parse(text, "empty time"));
    }

    let fields: Vec<&str> = body.split(':').collect();
    if fields.len() > 3 {
        return Err(Error::time_parse(text, "more than 3 fields"));
    }

    let mut total: Timestamp = 0;
    for field in &fields {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::time_parse(
                text,
                format!("field {field:?} is not an integer"),
            ));
        }
        let value: Timestamp = field
            .parse()
            .map_err(|e| Error::time_parse(text, format!("field {field:?}: {e}")))?;
        total = total
            .checked_mul(60)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| Error::time_parse(text, "value out of range"))?;
    }

    Ok(if negative { -total } else { total })
}

/// Render seconds as `H:MM:SS`.
///
/// Hours are not wrapped into days: `90000` is `"25:00:00"`.
pub fn format_duration(seconds: Timestamp) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        abs / 3600,
        (abs % 3600) / 60,
        abs % 60
    )
}

/// Serialize highlights to timecode text, one line per highlight.
pub fn save(events: &[HighlightEvent], prefix: &str) -> String {
    events
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{},{}\n",
                format_duration(e.representative_time),
                clip_label(prefix, i)
            )
        })
        .collect()
}

/// Parse timecode text back into representative times.
///
/// Blank lines are skipped; any other line that does not start with a valid
/// duration aborts the load.
pub fn load(text: &str) -> Result<Vec<Timestamp>> {
    let mut times = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split(',').next().unwrap_or_default();
        let time = parse_duration(field).map_err(|e| match e {
            Error::TimeParse { input, reason } => Error::TimeParse {
                input,
                reason: format!("{reason} (line {})", line_num + 1),
            },
            other => other,
        })?;
        times.push(time);
    }
    Ok(times)
}

/// Write highlights to a timecode file, replacing any previous one.
pub fn write(path: &Path, events: &[HighlightEvent], prefix: &str) -> Result<()> {
    std::fs::write(path, save(events, prefix))?;
    tracing::info!(
        path = %path.display(),
        count = events.len(),
        "Saved timecode file"
    );
    Ok(())
}

/// Read representative times from a timecode file.
pub fn read(path: &Path) -> Result<Vec<Timestamp>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ResourceNotFound {
            kind: "timecode file",
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    let times = load(&content)?;
    tracing::info!(path = %path.display(), count = times.len(), "Loaded timecode file");
    Ok(times)
}
