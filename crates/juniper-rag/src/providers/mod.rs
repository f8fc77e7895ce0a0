//! Provider abstractions for the semantic index, completion service and embeddings
//!
//! The RAG engine depends only on the `SemanticIndex` and `CompletionService`
//! traits; the concrete HTTP and in-memory implementations live here.

pub mod completion;
pub mod embedding;
pub mod groq;
pub mod local;
pub mod ollama;
pub mod retry;
pub mod semantic_index;

pub use completion::{CompletionService, GenerationParams};
pub use embedding::EmbeddingProvider;
pub use groq::GroqClient;
pub use local::InMemoryIndex;
pub use ollama::{OllamaChat, OllamaEmbedder};
pub use semantic_index::SemanticIndex;
