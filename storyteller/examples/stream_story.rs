//! Stream a story from Claude and print each event as it completes.
//!
//! Run with: `cargo run -p storyteller --example stream_story -- "A lighthouse keeper finds a message"`
//! Set `RUST_LOG=storyteller=debug,story_xml=trace` to watch the extractor work.

use futures::StreamExt;
use storyteller::{stream_events, ClaudeBackend, NarrativeEvent, StoryBackend, StoryConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: stream_story <prompt>");
        return;
    }

    let backend = match ClaudeBackend::from_env() {
        Ok(backend) => backend.with_config(StoryConfig::new().with_max_tokens(1500)),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Please set ANTHROPIC_API_KEY in .env file");
            return;
        }
    };

    let fragments = match backend.open(&prompt).await {
        Ok(fragments) => fragments,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let mut events = Box::pin(stream_events(fragments));
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => match &event {
                NarrativeEvent::Narration { text } => println!("\n  {text}\n"),
                NarrativeEvent::Speech {
                    speaker,
                    emotion,
                    text,
                } => {
                    let avatar = event.avatar_path().unwrap_or_default();
                    println!("{speaker} ({emotion}) [{avatar}]: {text}");
                }
            },
            Err(e) => {
                eprintln!("\nError: {e}");
                break;
            }
        }
    }
}
