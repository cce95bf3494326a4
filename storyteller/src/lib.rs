//! Streams AI-generated stories into typed narrative events.
//!
//! This crate connects a text generator to [`story_xml::TagExtractor`]:
//! - [`StoryBackend`] implementations produce raw text fragments
//! - [`StorySession`] feeds them through the extractor and keeps the events
//! - [`stream_events`] does the same for callers that want a `Stream`
//!
//! # Quick Start
//!
//! ```ignore
//! use storyteller::{ClaudeBackend, StoryConfig, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = ClaudeBackend::from_env()?
//!         .with_config(StoryConfig::new().with_max_tokens(1024));
//!
//!     let mut session = StorySession::new(backend);
//!     for event in session.begin("A lone wanderer finds a hidden library").await? {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
mod error;
mod session;

pub use backend::{ClaudeBackend, FragmentStream, ScriptedBackend, StoryBackend};
pub use config::{StoryConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use error::StoryError;
pub use session::{stream_events, StorySession};

// Re-export the event model so callers need only this crate.
pub use story_xml::{NarrativeEvent, TagExtractor, DEFAULT_EMOTION};
