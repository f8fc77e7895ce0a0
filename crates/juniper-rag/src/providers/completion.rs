//! Completion service trait for answer generation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::types::ChatMessage;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (0-2)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Trait for chat-style text generation
///
/// Implementations:
/// - `GroqClient`: Groq hosted models (OpenAI-compatible API)
/// - `OllamaChat`: Local Ollama server
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate a reply to an ordered, role-tagged message sequence.
    ///
    /// Resolves only once the full text is available.
    async fn generate(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
