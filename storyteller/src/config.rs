//! Story generation settings.

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Instructions that make the model write in the markup the extractor reads.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are the narrator of an interactive visual novel.
Write the story as a sequence of the following elements and nothing else:

<Narrator>Scene description, action, and inner thoughts.</Narrator>

<character name="NAME">
  <action expression="EMOTION"/>
  <say>One line of dialogue.</say>
</character>

Rules:
- Use the exact tag names shown above; they are case-sensitive.
- Every <character> element needs a name attribute and at least one <say> line.
- expression is optional; use one or two plain words such as "happy", "angry", or "very surprised".
- Never nest a <Narrator> inside another <Narrator>, or a <character> inside another <character>.
- Keep each element short so the reader sees the story unfold as it streams."#;

/// Configuration for a story backend.
#[derive(Debug, Clone)]
pub struct StoryConfig {
    /// Model to generate with.
    pub model: String,

    /// Maximum tokens per story.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Replaces [`DEFAULT_SYSTEM_PROMPT`] when set.
    pub custom_system_prompt: Option<String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            temperature: Some(0.8),
            custom_system_prompt: None,
        }
    }
}

impl StoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Use a custom system prompt. It must still ask for the story markup,
    /// or the extractor will find nothing to emit.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }

    /// The system prompt that will be sent.
    pub fn system_prompt(&self) -> &str {
        self.custom_system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}
