//! Inbound request types

use serde::{Deserialize, Serialize};

use super::language::Language;
use crate::error::{Error, Result};

/// Chat request from the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub message: String,

    /// Conversation to attach this exchange to (optional)
    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Response language (default: en)
    #[serde(default)]
    pub language: Option<Language>,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            language: None,
        }
    }

    /// Attach a conversation ID
    pub fn with_conversation(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Set the response language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Validate and normalize the request.
    ///
    /// Returns the trimmed message. Blank conversation IDs are dropped.
    pub fn validate(&mut self, max_message_length: usize) -> Result<String> {
        let message = self.message.trim();

        if message.is_empty() {
            return Err(Error::invalid_input("Message cannot be empty"));
        }

        if message.chars().count() > max_message_length {
            return Err(Error::invalid_input(format!(
                "Message too long. Maximum {} characters",
                max_message_length
            )));
        }

        if self
            .conversation_id
            .as_deref()
            .map(|id| id.trim().is_empty())
            .unwrap_or(false)
        {
            self.conversation_id = None;
        }

        Ok(message.to_string())
    }

    /// Language with the default applied
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }
}

/// Request to forget a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ClearRequest {
    /// Return the conversation ID or an input error
    pub fn conversation_id(&self) -> Result<&str> {
        match self.conversation_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::invalid_input("Missing conversation_id")),
        }
    }
}
