//! Response types for RAG queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::passage::RetrievedPassage;

/// Title used when a passage carries none
pub const DEFAULT_TITLE: &str = "Unknown";
/// Category used when a passage carries none
pub const DEFAULT_CATEGORY: &str = "general";

/// A source shown alongside an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Topic title
    pub title: String,
    /// Topic category
    pub category: String,
    /// Similarity score rounded to 3 decimals
    pub similarity: f64,
}

impl Source {
    /// Create a source from a retrieved passage
    pub fn from_passage(passage: &RetrievedPassage) -> Self {
        Self {
            title: passage
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            category: passage
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            similarity: round3(passage.similarity),
        }
    }
}

/// Round a similarity score to 3 decimal places.
///
/// Goes through the shortest decimal form of the `f32` so that e.g. `0.81f32`
/// yields exactly `0.81` rather than `0.8100000023841858`.
pub fn round3(similarity: f32) -> f64 {
    let value: f64 = similarity.to_string().parse().unwrap_or(similarity as f64);
    (value * 1000.0).round() / 1000.0
}

/// Which collaborator failed, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The semantic index failed
    Retrieval,
    /// The completion service failed
    Generation,
}

/// Result of one pass through the RAG pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated (or canned) answer text
    pub response: String,
    /// Sources in retrieval order
    pub sources: Vec<Source>,
    /// Conversation ID echoed back
    pub conversation_id: Option<String>,
    /// Number of passages retrieved
    pub retrieved_count: usize,
    /// Set when a collaborator failed and `response` is an apology
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
}

impl AnswerResult {
    /// Whether the pipeline hit a contained failure
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Chat response body returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: Option<String>,
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Utc>,
}

impl From<AnswerResult> for ChatResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            response: result.response,
            conversation_id: result.conversation_id,
            sources: result.sources,
            timestamp: Utc::now(),
        }
    }
}

/// Engine statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Passages held by the semantic index
    pub document_count: usize,
    /// Conversations with retained history
    pub active_conversations: usize,
    /// Passages requested per query
    pub top_k: usize,
}
