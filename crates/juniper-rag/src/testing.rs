//! Offline collaborators for server tests

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::engine::RagEngine;
use crate::error::Result;
use crate::providers::{CompletionService, GenerationParams, SemanticIndex};
use crate::server::RagServer;
use crate::types::{ChatMessage, RetrievedPassage};

pub const ECHO_PREFIX: &str = "Echo: ";

/// Index returning the same passages for every query
pub struct StaticIndex {
    passages: Vec<RetrievedPassage>,
}

impl StaticIndex {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self { passages: Vec::new() })
    }

    pub fn diabetes() -> Arc<Self> {
        Arc::new(Self {
            passages: vec![
                RetrievedPassage::new("doc_0012", "Title: Type 2 Diabetes\n\nInsulin resistance.", 0.81)
                    .with_title("Type 2 Diabetes")
                    .with_category("endocrine"),
                RetrievedPassage::new("doc_0040", "Title: Obesity\n\nExcess body fat.", 0.77)
                    .with_title("Obesity")
                    .with_category("nutrition"),
            ],
        })
    }
}

#[async_trait]
impl SemanticIndex for StaticIndex {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>> {
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.passages.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Completion service that answers with the last message's first line
pub struct EchoLlm;

#[async_trait]
impl CompletionService for EchoLlm {
    async fn generate(&self, messages: &[ChatMessage], _params: &GenerationParams) -> Result<String> {
        let first_line = messages
            .last()
            .and_then(|m| m.content.lines().next())
            .unwrap_or_default();
        Ok(format!("{}{}", ECHO_PREFIX, first_line))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo"
    }
}

pub fn test_server(index: Arc<dyn SemanticIndex>) -> RagServer {
    let config = RagConfig::default();
    let engine = RagEngine::new(index, Arc::new(EchoLlm), &config);
    RagServer::new(config, engine)
}
