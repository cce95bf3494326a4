//! End-to-end story sessions against scripted backends.
//!
//! No network access needed; these run with a plain `cargo test`.

use futures::StreamExt;
use storyteller::{
    stream_events, NarrativeEvent, ScriptedBackend, StoryBackend, StoryError, StorySession,
    TagExtractor,
};

const STORY: &str = r#"<Narrator>A lone wanderer crests the last dune.</Narrator>
<character name="Wanderer"><action expression="awed"/><say>A library...</say><say>out here?</say></character>
<Narrator>Its doors stand open, as if expecting company.</Narrator>
<character name="Keeper" expression="very calm"><say>We have been waiting.</say></character>
<character name="Wanderer"><action expression="startled"/></character>"#;

fn expected() -> Vec<NarrativeEvent> {
    vec![
        NarrativeEvent::narration("A lone wanderer crests the last dune."),
        NarrativeEvent::speech("Wanderer", "awed", "A library... out here?"),
        NarrativeEvent::narration("Its doors stand open, as if expecting company."),
        NarrativeEvent::speech("Keeper", "very calm", "We have been waiting."),
    ]
}

/// The events of one kind, in order.
fn narration(events: &[NarrativeEvent]) -> Vec<&NarrativeEvent> {
    events.iter().filter(|e| e.speaker().is_none()).collect()
}

fn speech(events: &[NarrativeEvent]) -> Vec<&NarrativeEvent> {
    events.iter().filter(|e| e.speaker().is_some()).collect()
}

#[tokio::test]
async fn test_session_matches_single_feed() {
    let single = TagExtractor::new().feed(STORY);

    for size in [1, 2, 5, 13, 40, STORY.len()] {
        let mut session = StorySession::new(ScriptedBackend::chunked(STORY, size));
        let events = session.begin("A desert library").await.unwrap();

        assert_eq!(events.len(), single.len(), "chunk size {size}");
        assert_eq!(narration(&events), narration(&single), "chunk size {size}");
        assert_eq!(speech(&events), speech(&single), "chunk size {size}");
        assert_eq!(session.segments(), events.as_slice());
    }
}

#[tokio::test]
async fn test_session_small_chunks_follow_document_order() {
    // With one element closing per fragment, emission order is buffer order.
    let mut session = StorySession::new(ScriptedBackend::chunked(STORY, 1));
    let events = session.begin("A desert library").await.unwrap();
    assert_eq!(events, expected());
}

#[tokio::test]
async fn test_avatar_paths_for_story() {
    let mut session = StorySession::new(ScriptedBackend::chunked(STORY, 7));
    session.begin("A desert library").await.unwrap();

    let avatars: Vec<_> = session
        .segments()
        .iter()
        .filter_map(NarrativeEvent::avatar_path)
        .collect();
    assert_eq!(avatars, vec!["/Wanderer/Awed.png", "/Keeper/Very Calm.png"]);
}

#[tokio::test]
async fn test_failure_keeps_received_segments() {
    let backend = ScriptedBackend::new([
        "<Narrator>First.</Narrator>",
        r#"<character name="Keeper"><say>Wel"#,
        "come.</say></character>",
    ])
    .with_failure_after(2, "connection reset");

    let mut session = StorySession::new(backend);
    let result = session.begin("A desert library").await;

    assert!(matches!(result, Err(StoryError::Network(_))));
    assert_eq!(session.segments(), &[NarrativeEvent::narration("First.")]);
    assert!(session
        .extractor()
        .peek_buffer()
        .ends_with(r#"<say>Wel"#));
}

#[tokio::test]
async fn test_stream_events_from_backend() {
    let backend = ScriptedBackend::chunked(STORY, 1);
    let fragments = backend.open("A desert library").await.unwrap();

    let events: Vec<NarrativeEvent> = stream_events(fragments)
        .map(|item| item.unwrap())
        .collect()
        .await;
    assert_eq!(events, expected());
}
