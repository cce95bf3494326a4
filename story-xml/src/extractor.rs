//! The incremental tag extractor.

use crate::event::{ElementKind, NarrativeEvent, DEFAULT_EMOTION};
use crate::scan;
use std::collections::HashSet;

/// Identifies one match occurrence: its kind, where it starts, and its raw
/// text. A match is stable once its end marker is in the buffer, so the same
/// key comes back on every later scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatchKey {
    kind: ElementKind,
    start: usize,
    raw: String,
}

impl MatchKey {
    fn new(kind: ElementKind, start: usize, raw: &str) -> Self {
        Self {
            kind,
            start,
            raw: raw.to_string(),
        }
    }
}

/// Turns a stream of text fragments into narrative events.
///
/// Fragments may split tags anywhere. Each call to [`feed`](Self::feed)
/// appends to an internal buffer, rescans the whole buffer, and returns
/// the elements it has not returned before: narration first, then speech,
/// each in buffer order.
///
/// Rescanning is linear in the buffer, so a session costs O(n²) in the
/// total bytes fed. One extractor serves one stream; use one per story.
///
/// ```
/// use story_xml::{NarrativeEvent, TagExtractor};
///
/// let mut extractor = TagExtractor::new();
/// assert!(extractor.feed("<Narrator>A ").is_empty());
/// assert_eq!(
///     extractor.feed("quiet town.</Narrator>"),
///     vec![NarrativeEvent::narration("A quiet town.")]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct TagExtractor {
    buffer: String,
    seen: HashSet<MatchKey>,
}

impl TagExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` and return every newly completed element.
    ///
    /// Never fails. Incomplete or malformed markup stays in the buffer and
    /// is retried on the next call.
    pub fn feed(&mut self, fragment: &str) -> Vec<NarrativeEvent> {
        // Nothing new can close without new text.
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);

        let mut events = Vec::new();

        for found in scan::narration_matches(&self.buffer) {
            let key = MatchKey::new(ElementKind::Narration, found.start, found.raw);
            if !self.seen.insert(key) {
                continue;
            }
            tracing::trace!(start = found.start, "narration element completed");
            events.push(NarrativeEvent::Narration {
                text: found.content.trim().to_string(),
            });
        }

        for found in scan::character_matches(&self.buffer) {
            let key = MatchKey::new(ElementKind::Speech, found.start, found.raw);
            if !self.seen.insert(key) {
                continue;
            }

            let text = found.dialogue();
            if text.is_empty() {
                tracing::debug!(
                    start = found.start,
                    speaker = found.name(),
                    "character element has no dialogue, suppressed"
                );
                continue;
            }

            tracing::trace!(
                start = found.start,
                speaker = found.name(),
                "character element completed"
            );
            events.push(NarrativeEvent::Speech {
                speaker: found.name().to_string(),
                emotion: found.expression().unwrap_or(DEFAULT_EMOTION).to_string(),
                text,
            });
        }

        events
    }

    /// Clear the buffer and forget every emitted match.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.seen.clear();
    }

    /// The raw buffer, for diagnostics.
    pub fn peek_buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of matches recorded so far, suppressed ones included.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
