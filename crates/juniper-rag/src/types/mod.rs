//! Core types for the RAG system

pub mod conversation;
pub mod language;
pub mod passage;
pub mod query;
pub mod response;

pub use conversation::{ChatMessage, ConversationTurn, Role};
pub use language::Language;
pub use passage::RetrievedPassage;
pub use query::{ChatRequest, ClearRequest};
pub use response::{AnswerResult, ChatResponse, EngineStats, FailureKind, Source};
