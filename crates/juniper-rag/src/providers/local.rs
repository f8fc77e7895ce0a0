//! In-memory semantic index
//!
//! Stores one embedding per corpus document and answers queries with a
//! brute-force cosine scan. The corpus is small (hundreds of topics), so a
//! linear scan is cheaper than maintaining an ANN structure.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ingestion::CorpusDocument;
use crate::types::RetrievedPassage;

use super::embedding::EmbeddingProvider;
use super::semantic_index::SemanticIndex;

/// A document with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub id: String,
    pub text: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub embedding: Vec<f32>,
}

/// On-disk form of the index
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    fingerprint: String,
    #[serde(default)]
    embedding_model: String,
    #[serde(default)]
    dimension: usize,
    passages: Vec<IndexedPassage>,
}

/// Semantic index held in memory
pub struct InMemoryIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    passages: RwLock<Vec<IndexedPassage>>,
}

impl InMemoryIndex {
    /// Create an empty index
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            passages: RwLock::new(Vec::new()),
        }
    }

    /// Embed and add documents, preserving their order
    pub async fn add_documents(&self, documents: &[CorpusDocument]) -> Result<usize> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let expected = self
            .dimension()
            .or_else(|| embeddings.first().map(Vec::len))
            .unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected || e.is_empty()) {
            return Err(Error::embedding(format!(
                "Embedding dimension {} does not match index dimension {}",
                bad.len(),
                expected
            )));
        }

        let mut passages = self.passages.write();
        for (doc, embedding) in documents.iter().zip(embeddings) {
            passages.push(IndexedPassage {
                id: doc.id.clone(),
                text: doc.text.clone(),
                title: Some(doc.title.clone()),
                category: Some(doc.category.clone()),
                embedding,
            });
        }

        tracing::info!("Indexed {} documents ({} total)", documents.len(), passages.len());
        Ok(documents.len())
    }

    /// Remove all passages
    pub fn reset(&self) {
        self.passages.write().clear();
    }

    /// Number of passages (sync accessor)
    pub fn passage_count(&self) -> usize {
        self.passages.read().len()
    }

    /// Dimension of the stored vectors, `None` while empty
    pub fn dimension(&self) -> Option<usize> {
        self.passages.read().first().map(|p| p.embedding.len())
    }

    /// Write the index to `path`, tagged with the corpus fingerprint and the
    /// embedding model that produced the vectors
    pub fn save(&self, path: &Path, fingerprint: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let snapshot = IndexSnapshot {
            fingerprint: fingerprint.to_string(),
            embedding_model: self.embedder.model().to_string(),
            dimension: self.dimension().unwrap_or(0),
            passages: self.passages.read().clone(),
        };
        std::fs::write(path, serde_json::to_vec(&snapshot)?)?;

        tracing::info!("Saved index ({} passages) to {}", snapshot.passages.len(), path.display());
        Ok(())
    }

    /// Replace the contents with a snapshot from `path`.
    ///
    /// Returns `Ok(false)` without touching the index if the file is missing,
    /// was built from a different corpus, or holds vectors from another
    /// embedding model or dimension.
    pub fn load(&self, path: &Path, fingerprint: &str) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        let snapshot: IndexSnapshot = serde_json::from_slice(&std::fs::read(path)?)?;
        if snapshot.fingerprint != fingerprint {
            tracing::info!("Index cache {} is stale, rebuilding", path.display());
            return Ok(false);
        }

        if snapshot.embedding_model != self.embedder.model() {
            tracing::info!(
                "Index cache {} was built with embedding model '{}', current is '{}', rebuilding",
                path.display(),
                snapshot.embedding_model,
                self.embedder.model()
            );
            return Ok(false);
        }

        if snapshot
            .passages
            .iter()
            .any(|p| p.embedding.len() != snapshot.dimension)
        {
            tracing::info!("Index cache {} has inconsistent dimensions, rebuilding", path.display());
            return Ok(false);
        }

        let count = snapshot.passages.len();
        *self.passages.write() = snapshot.passages;
        tracing::info!("Loaded {} passages from {}", count, path.display());
        Ok(true)
    }
}

/// Cosine similarity, `None` when dimensions differ or a vector is zero
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

#[async_trait]
impl SemanticIndex for InMemoryIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>> {
        if top_k == 0 || self.passage_count() == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        if let Some(dimension) = self.dimension() {
            if query_embedding.len() != dimension {
                return Err(Error::retrieval(format!(
                    "Query embedding has dimension {}, index holds {}",
                    query_embedding.len(),
                    dimension
                )));
            }
        }

        let mut scored: Vec<RetrievedPassage> = {
            let passages = self.passages.read();
            passages
                .iter()
                .filter_map(|p| {
                    cosine_similarity(&query_embedding, &p.embedding).map(|score| RetrievedPassage {
                        id: p.id.clone(),
                        text: p.text.clone(),
                        title: p.title.clone(),
                        category: p.category.clone(),
                        similarity: score.clamp(0.0, 1.0),
                    })
                })
                .collect()
        };

        // Stable sort keeps corpus order among ties
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        tracing::debug!("Found {} results for query: '{}'", scored.len(), truncate(query, 50));
        Ok(scored)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.passage_count())
    }

    async fn health_check(&self) -> Result<bool> {
        self.embedder.health_check().await
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
