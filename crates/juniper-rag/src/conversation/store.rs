//! Per-conversation turn history

use dashmap::DashMap;
use std::collections::VecDeque;

use crate::config::ConversationConfig;
use crate::types::{ChatMessage, ConversationTurn};

/// Bounded conversation histories keyed by caller-supplied conversation ID.
///
/// Each history alternates user/assistant turns and never exceeds
/// `max_turns`; the oldest exchange is evicted first. An append holds the
/// map entry for its whole read-modify-write, so concurrent appends to one
/// conversation are serialized while different conversations proceed
/// independently.
pub struct ConversationStore {
    conversations: DashMap<String, VecDeque<ConversationTurn>>,
    max_turns: usize,
}

impl ConversationStore {
    /// Create a store retaining at most `max_turns` turns per conversation.
    ///
    /// Odd caps are rounded down so exchanges are never split.
    pub fn new(max_turns: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            max_turns: (max_turns.max(2) / 2) * 2,
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.max_turns)
    }

    /// Turn cap per conversation
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Full retained history, oldest first. Empty for unknown or absent IDs.
    pub fn history(&self, conversation_id: Option<&str>) -> Vec<ConversationTurn> {
        conversation_id
            .and_then(|id| self.conversations.get(id))
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record one exchange, creating the conversation if needed
    pub fn append_turn(
        &self,
        conversation_id: &str,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) {
        let mut turns = self
            .conversations
            .entry(conversation_id.to_string())
            .or_default();

        turns.push_back(ChatMessage::user(user_text));
        turns.push_back(ChatMessage::assistant(assistant_text));

        let mut evicted = 0;
        while turns.len() > self.max_turns {
            turns.pop_front();
            turns.pop_front();
            evicted += 2;
        }

        if evicted > 0 {
            tracing::debug!(
                "Evicted {} turns from conversation {} ({} retained)",
                evicted,
                conversation_id,
                turns.len()
            );
        }
    }

    /// Forget a conversation. Returns whether anything was removed.
    pub fn clear(&self, conversation_id: &str) -> bool {
        let removed = self.conversations.remove(conversation_id).is_some();
        if removed {
            tracing::info!("Cleared conversation: {}", conversation_id);
        }
        removed
    }

    /// Number of conversations with retained history
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default())
    }
}
