//! Keyword hit extraction
//!
//! Filters a chat log with an [`EventPredicate`] and converts each matching
//! message's elapsed time into seconds, preserving log order.

use crate::error::{Error, Result};
use crate::matchers::EventPredicate;
use crate::timecode::parse_duration;
use crate::types::{ChatEvent, Timestamp};

/// Timestamps of every chat event the predicate accepts, in log order.
///
/// Any malformed `elapsedTime` on a matching event aborts the extraction;
/// non-matching events are never parsed.
pub fn extract_timestamps(
    chats: &[ChatEvent],
    predicate: &dyn EventPredicate,
) -> Result<Vec<Timestamp>> {
    let timestamps = chats
        .iter()
        .filter(|event| predicate.matches(event))
        .map(|event| parse_duration(&event.elapsed_time))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        matcher = predicate.name(),
        total = chats.len(),
        matched = timestamps.len(),
        "Extracted keyword timestamps"
    );
    Ok(timestamps)
}

/// Like [`extract_timestamps`], but an empty result is [`Error::NoMatchingEvents`].
pub fn extract_matching(
    chats: &[ChatEvent],
    predicate: &dyn EventPredicate,
) -> Result<Vec<Timestamp>> {
    let timestamps = extract_timestamps(chats, predicate)?;
    if timestamps.is_empty() {
        return Err(Error::NoMatchingEvents {
            matcher: Some(predicate.name().to_string()),
        });
    }
    Ok(timestamps)
}
