//! juniper-rag: bilingual medical research assistant
//!
//! Answers English and Roman Urdu health questions by retrieving passages
//! from a curated knowledge corpus, composing a grounded prompt with recent
//! conversation history, and asking a chat-completion model for the answer.
//! Retrieval and generation sit behind the `SemanticIndex` and
//! `CompletionService` traits so the pipeline runs against fakes in tests.

pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::RagConfig;
pub use conversation::ConversationStore;
pub use engine::RagEngine;
pub use error::{Error, Result};
pub use types::{AnswerResult, ChatRequest, ChatResponse, Language, RetrievedPassage, Source};
