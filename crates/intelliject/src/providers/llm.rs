//! LLM provider trait for text generation

use async_trait::async_trait;
use crate::error::Result;

/// Trait for prompt-in, text-out generation
///
/// Implementations:
/// - `OpenAiLlm`: OpenAI-compatible chat completions (gpt-3.5-turbo)
/// - `OllamaLlm`: Local Ollama server (phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a single prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
