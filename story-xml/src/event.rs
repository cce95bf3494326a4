//! Narrative events emitted by the extractor.

use serde::{Deserialize, Serialize};

/// Emotion used when a character element carries no `expression`.
pub const DEFAULT_EMOTION: &str = "neutral";

/// The two element kinds the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<Narrator>...</Narrator>`
    Narration,
    /// `<character name="...">...</character>`
    Speech,
}

/// A completed piece of the story, ready for rendering.
///
/// Serializes with an internal `type` tag (`"narrator"` or `"character"`)
/// so the shape matches what presentation layers already consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NarrativeEvent {
    /// Narrator text, trimmed.
    #[serde(rename = "narrator")]
    Narration { text: String },

    /// A line of dialogue from a named character.
    #[serde(rename = "character")]
    Speech {
        speaker: String,
        #[serde(default = "default_emotion")]
        emotion: String,
        /// All `<say>` segments of the element, space-joined.
        text: String,
    },
}

fn default_emotion() -> String {
    DEFAULT_EMOTION.to_string()
}

impl NarrativeEvent {
    /// Create a narration event.
    pub fn narration(text: impl Into<String>) -> Self {
        NarrativeEvent::Narration { text: text.into() }
    }

    /// Create a speech event.
    pub fn speech(
        speaker: impl Into<String>,
        emotion: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        NarrativeEvent::Speech {
            speaker: speaker.into(),
            emotion: emotion.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            NarrativeEvent::Narration { .. } => ElementKind::Narration,
            NarrativeEvent::Speech { .. } => ElementKind::Speech,
        }
    }

    /// The text to display, for either variant.
    pub fn text(&self) -> &str {
        match self {
            NarrativeEvent::Narration { text } | NarrativeEvent::Speech { text, .. } => text,
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        match self {
            NarrativeEvent::Speech { speaker, .. } => Some(speaker),
            NarrativeEvent::Narration { .. } => None,
        }
    }

    pub fn emotion(&self) -> Option<&str> {
        match self {
            NarrativeEvent::Speech { emotion, .. } => Some(emotion),
            NarrativeEvent::Narration { .. } => None,
        }
    }

    /// Image path for the speaker's portrait, e.g. `/Mira/Very Happy.png`.
    ///
    /// The speaker is capitalized as one word; the emotion is capitalized
    /// word by word on single spaces. Narration has no portrait.
    pub fn avatar_path(&self) -> Option<String> {
        let NarrativeEvent::Speech {
            speaker, emotion, ..
        } = self
        else {
            return None;
        };

        let emotion = emotion
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");

        Some(format!("/{}/{}.png", capitalize(speaker), emotion))
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut capitalized: String = first.to_uppercase().collect();
            capitalized.push_str(&chars.as_str().to_lowercase());
            capitalized
        }
        None => String::new(),
    }
}
