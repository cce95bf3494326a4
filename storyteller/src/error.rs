//! Error types for story generation.

use thiserror::Error;

/// Errors that can occur while generating a story.
///
/// Markup problems never show up here: the extractor leaves malformed
/// markup unmatched instead of failing.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("No API key configured - set ANTHROPIC_API_KEY environment variable")]
    NoApiKey,

    #[error("Story prompt is empty")]
    EmptyPrompt,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The backend reported an error inside an otherwise healthy stream.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
