//! Conversation memory

mod store;

pub use store::ConversationStore;
