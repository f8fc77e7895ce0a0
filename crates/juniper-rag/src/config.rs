//! Configuration for the RAG system
//!
//! Values come from (in increasing priority) built-in defaults, an optional
//! TOML file, and `JUNIPER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Completion backend configuration
    pub llm: LlmConfig,
    /// Embedding configuration (used by the bundled semantic index)
    pub embeddings: EmbeddingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Conversation memory configuration
    pub conversation: ConversationConfig,
    /// Knowledge corpus and index cache locations
    pub knowledge: KnowledgeConfig,
    /// Inbound message validation
    pub validation: ValidationConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str::<RagConfig>(&raw)?
            }
            None => RagConfig::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `JUNIPER_*` overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("JUNIPER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid JUNIPER_PORT: {}", port)))?;
        }

        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_blank("JUNIPER_LLM_API_KEY").or_else(|| non_blank("GROQ_API_KEY")) {
            self.llm.api_key = Some(key);
        }

        if let Some(model) = lookup("JUNIPER_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(origins) = lookup("JUNIPER_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        Ok(())
    }

    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "llm.temperature must be within 0..=2, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(Error::Config("llm.max_tokens must be positive".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }

        let conv = &self.conversation;
        if conv.max_turns < 2 || conv.max_turns % 2 != 0 {
            return Err(Error::Config(format!(
                "conversation.max_turns must be an even number >= 2, got {}",
                conv.max_turns
            )));
        }
        if conv.prompt_window % 2 != 0 || conv.prompt_window > conv.max_turns {
            return Err(Error::Config(format!(
                "conversation.prompt_window must be even and <= max_turns ({}), got {}",
                conv.max_turns, conv.prompt_window
            )));
        }
        if self.validation.max_message_length == 0 {
            return Err(Error::Config(
                "validation.max_message_length must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Allowed origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Completion backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionBackend {
    /// Groq hosted models (OpenAI-compatible chat completions)
    #[default]
    Groq,
    /// Local Ollama server
    Ollama,
}

/// LLM (completion service) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to talk to
    pub backend: CompletionBackend,
    /// API base URL
    pub base_url: String,
    /// API key (Groq only)
    pub api_key: Option<String>,
    /// Generation model name
    pub model: String,
    /// Temperature for generation (0-2)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: CompletionBackend::Groq,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,  // Low for factual medical answers
            max_tokens: 1024,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages requested from the semantic index
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Turns retained per conversation (10 exchanges)
    pub max_turns: usize,
    /// Most recent turns forwarded into the prompt (3 exchanges)
    pub prompt_window: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: 20,
            prompt_window: 6,
        }
    }
}

/// Knowledge corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// JSON file holding the medical knowledge entries
    pub corpus_path: PathBuf,
    /// Cached embeddings for the corpus
    pub index_path: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let index_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("juniper-rag")
            .join("index.json");

        Self {
            corpus_path: PathBuf::from("data/medical_knowledge.json"),
            index_path,
        }
    }
}

/// Inbound message validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum message length in characters
    pub max_message_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.conversation.max_turns, 20);
        assert_eq!(config.conversation.prompt_window, 6);
        assert_eq!(config.validation.max_message_length, 2000);
    }

    #[test]
    fn test_partial_toml() {
        let raw = r#"
            [llm]
            backend = "ollama"
            base_url = "http://localhost:11434"
            model = "llama3.2"

            [retrieval]
            top_k = 3
        "#;
        let config: RagConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.llm.backend, CompletionBackend::Ollama);
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JUNIPER_PORT", "8088"),
            ("GROQ_API_KEY", "gsk_test"),
            ("JUNIPER_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_blank_api_key_falls_back_to_groq_key() {
        let env: HashMap<&str, &str> = [
            ("JUNIPER_LLM_API_KEY", "   "),
            ("GROQ_API_KEY", "gsk_fallback"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_fallback"));
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = RagConfig::default();
        let result = config.apply_env_overrides(|k| {
            (k == "JUNIPER_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_odd_window() {
        let mut config = RagConfig::default();
        config.conversation.prompt_window = 5;
        assert!(config.validate().is_err());

        let mut config = RagConfig::default();
        config.conversation.prompt_window = 22;
        assert!(config.validate().is_err());

        let mut config = RagConfig::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());
    }
}
