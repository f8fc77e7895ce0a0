//! Ollama-based providers for embeddings and chat completion
//!
//! A single `OllamaClient` talks HTTP; `OllamaEmbedder` and `OllamaChat`
//! wrap it to implement the provider traits.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::ChatMessage;

use super::completion::{CompletionService, GenerationParams};
use super::embedding::EmbeddingProvider;
use super::retry::retry_request;

const SERVICE: &str = "ollama";

/// Ollama API client with automatic retry
pub struct OllamaClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: &str, timeout_secs: u64, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding with retry
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let url = url.as_str();

        retry_request(self.max_retries, self.retry_delay, || async move {
            let response = self
                .client
                .post(url)
                .json(&EmbedRequest { model, prompt: text })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(match Error::from_status(SERVICE, status, &body) {
                    Error::Llm(msg) => Error::embedding(msg),
                    other => other,
                });
            }

            let parsed: EmbedResponse = response
                .json()
                .await
                .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

            if parsed.embedding.is_empty() {
                return Err(Error::embedding(format!("Model {} returned an empty embedding", model)));
            }

            Ok(parsed.embedding)
        })
        .await
    }

    /// Run a non-streaming chat completion with retry
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let url = url.as_str();

        retry_request(self.max_retries, self.retry_delay, || async move {
            let request = ChatRequest {
                model,
                messages,
                stream: false,
                options: ChatOptions {
                    temperature: params.temperature,
                    num_predict: params.max_tokens,
                },
            };

            let response = self.client.post(url).json(&request).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::from_status(SERVICE, status, &body));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| Error::llm(format!("Failed to parse chat response: {}", e)))?;

            Ok(parsed.message.content.trim().to_string())
        })
        .await
    }
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(
                &config.base_url,
                config.timeout_secs,
                config.max_retries,
            )?),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama chat provider for answer generation
pub struct OllamaChat {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaChat {
    /// Create a new Ollama chat provider
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(
                &config.base_url,
                config.timeout_secs,
                config.max_retries,
            )?),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionService for OllamaChat {
    async fn generate(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String> {
        tracing::debug!("Generating with {} ({} messages)", self.model, messages.len());
        let text = self.client.chat(&self.model, messages, params).await?;
        tracing::info!("Generated response ({} chars)", text.len());
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
