//! Sources of story text.
//!
//! A backend turns a prompt into a stream of raw text fragments. Fragment
//! boundaries are whatever the transport produces; the extractor copes
//! with tags split across them.

mod claude;

pub use claude::ClaudeBackend;

use crate::error::StoryError;
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// Text fragments in stream order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, StoryError>> + Send>>;

/// Something that can write a story for a prompt.
#[async_trait]
pub trait StoryBackend: Send + Sync {
    /// Start generating and return the fragment stream.
    async fn open(&self, prompt: &str) -> Result<FragmentStream, StoryError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// A backend that replays fixed fragments.
///
/// Use this for deterministic tests and demos without API calls.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    fragments: Vec<String>,
    /// Fail with this message after yielding this many fragments.
    failure: Option<(usize, String)>,
}

impl ScriptedBackend {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }

    /// Split `text` into fragments of at most `size` characters.
    pub fn chunked(text: &str, size: usize) -> Self {
        let size = size.max(1);
        let chars: Vec<char> = text.chars().collect();
        Self::new(chars.chunks(size).map(|c| c.iter().collect::<String>()))
    }

    /// End the stream with a network error after `after` fragments.
    pub fn with_failure_after(mut self, after: usize, message: impl Into<String>) -> Self {
        self.failure = Some((after, message.into()));
        self
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

#[async_trait]
impl StoryBackend for ScriptedBackend {
    async fn open(&self, _prompt: &str) -> Result<FragmentStream, StoryError> {
        let mut items: Vec<Result<String, StoryError>> = Vec::new();

        match &self.failure {
            Some((after, message)) => {
                items.extend(self.fragments.iter().take(*after).cloned().map(Ok));
                items.push(Err(StoryError::Network(message.clone())));
            }
            None => items.extend(self.fragments.iter().cloned().map(Ok)),
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_chunked() {
        let backend = ScriptedBackend::chunked("héllo!", 2);
        assert_eq!(backend.fragments(), &["hé", "ll", "o!"]);

        let backend = ScriptedBackend::chunked("abc", 0);
        assert_eq!(backend.fragments(), &["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_replays_fragments() {
        let backend = ScriptedBackend::new(["a", "b"]);
        let items: Vec<_> = backend.open("ignored").await.unwrap().collect().await;
        let texts: Vec<String> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_after() {
        let backend = ScriptedBackend::new(["a", "b", "c"]).with_failure_after(1, "reset by peer");
        let items: Vec<_> = backend.open("ignored").await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "a");
        assert!(matches!(&items[1], Err(StoryError::Network(m)) if m == "reset by peer"));
    }
}
