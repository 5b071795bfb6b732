// src/llm/mod.rs
// Language-model gateway boundary and the Gemini implementation

pub mod gemini;

use async_trait::async_trait;

use crate::error::Result;

pub use gemini::GeminiClient;

/// Text-completion capability consumed by the chat orchestrator, the
/// assessment scorer and the mood insight helper.
///
/// One prompt in, generated text out. A single bounded request with no retry
/// and no streaming; transport failures, API errors and empty output all
/// surface as `Error::Generation`. Callers decide whether that error
/// propagates (chat) or degrades to a fallback value (assessments, mood).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
