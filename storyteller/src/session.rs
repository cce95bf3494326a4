//! StorySession - one story from prompt to finished event log.
//!
//! A session owns a backend, the extractor for the current story, and
//! every event emitted so far. Beginning a new story resets both.

use crate::backend::StoryBackend;
use crate::error::StoryError;
use futures::StreamExt;
use story_xml::{NarrativeEvent, TagExtractor};
use tokio_stream::Stream;

/// Drives a backend through the extractor and keeps the story's events.
pub struct StorySession<B> {
    backend: B,
    extractor: TagExtractor,
    segments: Vec<NarrativeEvent>,
}

impl<B: StoryBackend> StorySession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            extractor: TagExtractor::new(),
            segments: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate a new story and return its events in emission order.
    ///
    /// Any previous story is discarded first. If the stream fails partway,
    /// the events received so far stay in [`segments`](Self::segments) and
    /// the error is returned; unfinished markup is not flushed.
    pub async fn begin(&mut self, prompt: &str) -> Result<Vec<NarrativeEvent>, StoryError> {
        if prompt.trim().is_empty() {
            return Err(StoryError::EmptyPrompt);
        }

        self.reset();
        tracing::debug!(backend = self.backend.name(), "starting story");

        let mut fragments = self.backend.open(prompt).await?;
        let mut events = Vec::new();

        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => events.extend(self.ingest(&fragment)),
                Err(e) => {
                    tracing::warn!(error = %e, received = events.len(), "story stream failed");
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            events = events.len(),
            unparsed_bytes = self.extractor.peek_buffer().len(),
            "story stream finished"
        );
        Ok(events)
    }

    /// Feed one fragment from a transport the caller drives itself.
    pub fn ingest(&mut self, fragment: &str) -> Vec<NarrativeEvent> {
        let events = self.extractor.feed(fragment);
        if !events.is_empty() {
            tracing::debug!(count = events.len(), "new segments parsed");
            self.segments.extend(events.iter().cloned());
        }
        events
    }

    /// Every event of the current story, in emission order.
    pub fn segments(&self) -> &[NarrativeEvent] {
        &self.segments
    }

    pub fn extractor(&self) -> &TagExtractor {
        &self.extractor
    }

    /// Forget the current story.
    pub fn reset(&mut self) {
        self.extractor.reset();
        self.segments.clear();
    }
}

/// Turn a fragment stream into an event stream with a fresh extractor.
///
/// Transport errors pass through in place; the caller decides whether to
/// keep polling after one.
pub fn stream_events<S>(fragments: S) -> impl Stream<Item = Result<NarrativeEvent, StoryError>>
where
    S: Stream<Item = Result<String, StoryError>>,
{
    fragments
        .scan(TagExtractor::new(), |extractor, fragment| {
            let batch: Vec<Result<NarrativeEvent, StoryError>> = match fragment {
                Ok(text) => extractor.feed(&text).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::future::ready(Some(batch))
        })
        .flat_map(futures::stream::iter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let mut session = StorySession::new(ScriptedBackend::new(["<Narrator>x</Narrator>"]));
        session.ingest("<Narrator>kept</Narrator>");

        assert!(matches!(
            session.begin("   \n").await,
            Err(StoryError::EmptyPrompt)
        ));
        // Rejected before anything was reset.
        assert_eq!(session.segments().len(), 1);
    }

    #[tokio::test]
    async fn test_begin_resets_previous_story() {
        let mut session = StorySession::new(ScriptedBackend::new([
            "<Narrator>Once</Narrator>",
            "<Narrator>dangling",
        ]));

        let first = session.begin("a story").await.unwrap();
        let second = session.begin("a story").await.unwrap();

        assert_eq!(first, vec![NarrativeEvent::narration("Once")]);
        assert_eq!(first, second);
        assert_eq!(session.segments(), second.as_slice());
        assert_eq!(
            session.extractor().peek_buffer(),
            "<Narrator>Once</Narrator><Narrator>dangling"
        );
    }

    #[test]
    fn test_ingest_appends_segments() {
        let mut session = StorySession::new(ScriptedBackend::default());
        assert!(session.ingest(r#"<character name="Mira"><say>Hi"#).is_empty());
        let events = session.ingest("</say></character>");

        assert_eq!(events, vec![NarrativeEvent::speech("Mira", "neutral", "Hi")]);
        assert_eq!(session.segments(), events.as_slice());

        session.reset();
        assert!(session.segments().is_empty());
        assert_eq!(session.extractor().peek_buffer(), "");
    }

    #[tokio::test]
    async fn test_stream_events_passes_errors_through() {
        let fragments = futures::stream::iter(vec![
            Ok("<Narrator>a</Narr".to_string()),
            Err(StoryError::Network("blip".to_string())),
            Ok("ator>".to_string()),
        ]);

        let items: Vec<_> = stream_events(fragments).collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Err(StoryError::Network(_))));
        assert_eq!(items[1].as_ref().unwrap(), &NarrativeEvent::narration("a"));
    }
}
