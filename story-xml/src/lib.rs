//! Incremental extractor for streamed story markup.
//!
//! A generative backend writes the story as lightly structured markup,
//! one token at a time:
//!
//! ```text
//! <Narrator>The lamps flicker.</Narrator>
//! <character name="Mira"><action expression="worried"/><say>Did you hear that?</say></character>
//! ```
//!
//! [`TagExtractor`] accepts that text in fragments of any size and returns
//! a [`NarrativeEvent`] for each element as soon as it is complete.

mod event;
mod extractor;
pub mod scan;

pub use event::{ElementKind, NarrativeEvent, DEFAULT_EMOTION};
pub use extractor::TagExtractor;
