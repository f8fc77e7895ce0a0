//! Groq completion client (OpenAI-compatible chat completions API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::types::ChatMessage;

use super::completion::{CompletionService, GenerationParams};
use super::retry::retry_request;

const SERVICE: &str = "groq";

/// Groq chat completion client
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    /// Create a new Groq client. Fails if no API key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Groq API key is required (set JUNIPER_LLM_API_KEY or GROQ_API_KEY)".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::info!("Initialized Groq client with model: {}", config.model);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(1),
        })
    }

    fn extract_text(response: CompletionResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::llm("Completion response contained no choices"))
    }
}

#[async_trait]
impl CompletionService for GroqClient {
    async fn generate(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let url = url.as_str();

        let text = retry_request(self.max_retries, self.retry_delay, || async move {
            let request = CompletionRequest {
                model: &self.model,
                messages,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
                top_p: 1.0,
                stream: false,
            };

            let response = self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::from_status(SERVICE, status, &body));
            }

            let parsed: CompletionResponse = response
                .json()
                .await
                .map_err(|e| Error::llm(format!("Failed to parse completion response: {}", e)))?;

            Self::extract_text(parsed)
        })
        .await?;

        tracing::info!("Generated response ({} chars)", text.len());
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        // One tiny completion, as listing models does not exercise the key's chat scope
        let probe = [ChatMessage::user("Say 'Hello' if you're working.")];
        let params = GenerationParams { temperature: 0.0, max_tokens: 50 };

        match self.generate(&probe, &params).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Groq connection test failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
