//! Semantic index trait consumed by the RAG engine

use async_trait::async_trait;
use crate::error::Result;
use crate::types::RetrievedPassage;

/// Similarity search over stored knowledge passages
///
/// Implementations:
/// - `InMemoryIndex`: embeddings held in memory, brute-force cosine scan
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Return up to `top_k` passages ordered by descending similarity.
    ///
    /// An empty result is a valid answer, not an error. Must be read-only.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Number of passages stored
    async fn len(&self) -> Result<usize>;

    /// Check if the index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the index (and its embedder) is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
