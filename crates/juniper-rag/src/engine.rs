//! RAG pipeline: retrieve, compose, generate, remember
//!
//! `RagEngine::query` never returns an error. An empty retrieval yields a
//! canned fallback, and a collaborator failure yields a generic apology with
//! the detail kept in the logs.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::conversation::ConversationStore;
use crate::generation::{ContextBuilder, PromptComposer};
use crate::providers::{CompletionService, GenerationParams, SemanticIndex};
use crate::types::{AnswerResult, ConversationTurn, EngineStats, FailureKind, Language, Source};

const EN_FALLBACK: &str = r#"I apologize, but I couldn't find specific information in my medical knowledge base to answer your question.

This could be because:
1. The topic is very specialized or outside my current knowledge scope
2. The question needs to be rephrased for better matching

I recommend:
- Rephrasing your question with more specific medical terms
- Breaking down complex questions into simpler parts
- Consulting with healthcare professionals for specialized medical advice

How can I help you with another medical topic?"#;

const UR_FALLBACK: &str = r#"Maafi chahta hoon, lekin mujhe apne medical knowledge base mein aapke sawal ka koi khaas jawab nahi mila.

Ye is wajah se ho sakta hai:
1. Ye topic bohat specialized hai ya mere current knowledge ke bahar hai
2. Sawal ko doosre tareeqe se poochna behtar hoga

Meri taraf se mashwara:
- Apne sawal ko medical terms ke sath dobara likhein
- Mushkil sawalo ko chhote chhote hisson mein taqseem karein
- Kisi doctor ya healthcare professional se mashwara zaroor lein

Kya main aapki kisi aur medical topic mein madad kar sakta hoon?"#;

const EN_APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";
const UR_APOLOGY: &str = "Maafi, mujhe aapke sawal ka jawab dene mein masla ho raha hai. Mehrbani karke dobara koshish karein.";

/// Guidance returned when nothing relevant was retrieved
pub fn fallback_response(language: Language) -> &'static str {
    match language {
        Language::En => EN_FALLBACK,
        Language::Ur => UR_FALLBACK,
    }
}

/// Generic apology returned when a collaborator fails
pub fn error_response(language: Language) -> &'static str {
    match language {
        Language::En => EN_APOLOGY,
        Language::Ur => UR_APOLOGY,
    }
}

/// Orchestrates one question through retrieval and generation
pub struct RagEngine {
    index: Arc<dyn SemanticIndex>,
    llm: Arc<dyn CompletionService>,
    conversations: ConversationStore,
    composer: PromptComposer,
    params: GenerationParams,
    top_k: usize,
}

impl RagEngine {
    /// Create an engine with a fresh conversation store
    pub fn new(
        index: Arc<dyn SemanticIndex>,
        llm: Arc<dyn CompletionService>,
        config: &RagConfig,
    ) -> Self {
        Self {
            index,
            llm,
            conversations: ConversationStore::from_config(&config.conversation),
            composer: PromptComposer::from_config(&config.conversation),
            params: GenerationParams::from_config(&config.llm),
            top_k: config.retrieval.top_k,
        }
    }

    /// Replace the conversation store
    pub fn with_conversations(mut self, conversations: ConversationStore) -> Self {
        self.conversations = conversations;
        self
    }

    /// Answer a question, optionally continuing a conversation
    pub async fn query(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        language: Language,
    ) -> AnswerResult {
        let start = Instant::now();
        tracing::info!(
            "Processing query ({}): {}",
            language,
            query.chars().take(100).collect::<String>()
        );

        let passages = match self.index.search(query, self.top_k).await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::error!("Retrieval via {} failed: {}", self.index.name(), e);
                return Self::failure(conversation_id, language, FailureKind::Retrieval);
            }
        };

        if passages.is_empty() {
            tracing::warn!("No relevant passages found, returning fallback");
            return AnswerResult {
                response: fallback_response(language).to_string(),
                sources: Vec::new(),
                conversation_id: conversation_id.map(str::to_string),
                retrieved_count: 0,
                error: None,
            };
        }

        let context = ContextBuilder::build(&passages);
        let history = self.conversations.history(conversation_id);
        let messages = self.composer.compose(query, &context, &history, language);

        let response = match self.llm.generate(&messages, &self.params).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Generation via {} failed: {}", self.llm.name(), e);
                return Self::failure(conversation_id, language, FailureKind::Generation);
            }
        };

        if let Some(id) = conversation_id {
            self.conversations.append_turn(id, query, response.as_str());
        }

        let sources: Vec<Source> = passages.iter().map(Source::from_passage).collect();

        tracing::info!(
            "Query completed in {}ms, {} sources",
            start.elapsed().as_millis(),
            sources.len()
        );

        AnswerResult {
            response,
            retrieved_count: passages.len(),
            sources,
            conversation_id: conversation_id.map(str::to_string),
            error: None,
        }
    }

    fn failure(
        conversation_id: Option<&str>,
        language: Language,
        kind: FailureKind,
    ) -> AnswerResult {
        AnswerResult {
            response: error_response(language).to_string(),
            sources: Vec::new(),
            conversation_id: conversation_id.map(str::to_string),
            retrieved_count: 0,
            error: Some(kind),
        }
    }

    /// Forget a conversation. Unknown IDs are ignored.
    pub fn clear_conversation(&self, conversation_id: &str) {
        self.conversations.clear(conversation_id);
    }

    /// Retained turns for a conversation, oldest first
    pub fn history(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        self.conversations.history(Some(conversation_id))
    }

    pub async fn stats(&self) -> EngineStats {
        let document_count = self.index.len().await.unwrap_or_else(|e| {
            tracing::warn!("Could not count indexed documents: {}", e);
            0
        });

        EngineStats {
            document_count,
            active_conversations: self.conversations.len(),
            top_k: self.top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::{ChatMessage, RetrievedPassage, Role};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FakeIndex {
        passages: Vec<RetrievedPassage>,
        fail: bool,
    }

    impl FakeIndex {
        fn returning(passages: Vec<RetrievedPassage>) -> Arc<Self> {
            Arc::new(Self { passages, fail: false })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { passages: Vec::new(), fail: true })
        }
    }

    #[async_trait]
    impl SemanticIndex for FakeIndex {
        async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>> {
            if self.fail {
                return Err(Error::retrieval("index offline at 10.0.0.5"));
            }
            Ok(self.passages.iter().take(top_k).cloned().collect())
        }

        async fn len(&self) -> Result<usize> {
            if self.fail {
                return Err(Error::retrieval("index offline"));
            }
            Ok(self.passages.len())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!self.fail)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Records every prompt it receives
    struct FakeLlm {
        reply: Option<String>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl FakeLlm {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Some(text.to_string()), calls: Mutex::new(Vec::new()) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None, calls: Mutex::new(Vec::new()) })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn last_prompt(&self) -> Vec<ChatMessage> {
            self.calls.lock().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionService for FakeLlm {
        async fn generate(&self, messages: &[ChatMessage], _params: &GenerationParams) -> Result<String> {
            self.calls.lock().push(messages.to_vec());
            self.reply
                .clone()
                .ok_or_else(|| Error::llm("upstream said: invalid api key sk-123"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(self.reply.is_some())
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    fn diabetes_passages() -> Vec<RetrievedPassage> {
        vec![
            RetrievedPassage::new("doc_0012", "Title: Type 2 Diabetes\n\nInsulin resistance.", 0.81)
                .with_title("Type 2 Diabetes")
                .with_category("endocrine"),
            RetrievedPassage::new("doc_0040", "Title: Obesity\n\nExcess body fat.", 0.77)
                .with_title("Obesity")
                .with_category("nutrition"),
        ]
    }

    fn engine(index: Arc<dyn SemanticIndex>, llm: Arc<dyn CompletionService>) -> RagEngine {
        RagEngine::new(index, llm, &RagConfig::default())
    }

    #[tokio::test]
    async fn test_empty_retrieval_returns_fallback() {
        let llm = FakeLlm::replying("unused");
        let engine = engine(FakeIndex::returning(vec![]), llm.clone());

        let result = engine.query("What is xyz?", Some("c1"), Language::En).await;

        assert_eq!(result.response, EN_FALLBACK);
        assert!(result.sources.is_empty());
        assert_eq!(result.retrieved_count, 0);
        assert_eq!(result.conversation_id.as_deref(), Some("c1"));
        assert!(!result.is_error());
        assert_eq!(llm.call_count(), 0);
        assert!(engine.history("c1").is_empty());
    }

    #[tokio::test]
    async fn test_fallback_in_roman_urdu() {
        let engine = engine(FakeIndex::returning(vec![]), FakeLlm::replying("unused"));
        let result = engine.query("xyz kya hai?", None, Language::Ur).await;
        assert_eq!(result.response, UR_FALLBACK);
    }

    #[tokio::test]
    async fn test_sources_follow_retrieval_order() {
        let llm = FakeLlm::replying("Type 2 diabetes is a chronic condition.");
        let engine = engine(FakeIndex::returning(diabetes_passages()), llm.clone());

        let result = engine.query("What is Type 2 diabetes?", Some("c1"), Language::En).await;

        assert_eq!(
            result.sources,
            vec![
                Source {
                    title: "Type 2 Diabetes".into(),
                    category: "endocrine".into(),
                    similarity: 0.81,
                },
                Source {
                    title: "Obesity".into(),
                    category: "nutrition".into(),
                    similarity: 0.77,
                },
            ]
        );
        assert_eq!(result.retrieved_count, 2);
        assert_eq!(result.response, "Type 2 diabetes is a chronic condition.");
        assert_eq!(result.conversation_id.as_deref(), Some("c1"));

        let prompt = llm.last_prompt();
        assert_eq!(prompt.len(), 2);
        assert!(prompt[1].content.contains(
            "Title: Type 2 Diabetes\n\nInsulin resistance.\n\nTitle: Obesity\n\nExcess body fat."
        ));
    }

    #[tokio::test]
    async fn test_missing_metadata_uses_defaults() {
        let passages = vec![RetrievedPassage::new("doc_0001", "Some text", 0.123456)];
        let engine = engine(FakeIndex::returning(passages), FakeLlm::replying("ok"));

        let result = engine.query("q", None, Language::En).await;
        assert_eq!(result.sources[0].title, "Unknown");
        assert_eq!(result.sources[0].category, "general");
        assert_eq!(result.sources[0].similarity, 0.123);
    }

    #[tokio::test]
    async fn test_history_grows_and_feeds_next_prompt() {
        let llm = FakeLlm::replying("answer");
        let engine = engine(FakeIndex::returning(diabetes_passages()), llm.clone());

        engine.query("What is Type 2 diabetes?", Some("c1"), Language::En).await;
        engine.query("What is Type 2 diabetes?", Some("c1"), Language::En).await;
        assert_eq!(engine.history("c1").len(), 4);

        engine.query("What is Type 2 diabetes?", Some("c1"), Language::En).await;
        let prompt = llm.last_prompt();
        // system + 4 prior turns + user
        assert_eq!(prompt.len(), 6);
        assert_eq!(prompt[1].role, Role::User);
        assert_eq!(prompt[1].content, "What is Type 2 diabetes?");
        assert_eq!(prompt[2].role, Role::Assistant);
        assert_eq!(engine.history("c1").len(), 6);
    }

    #[tokio::test]
    async fn test_no_history_without_conversation_id() {
        let engine = engine(FakeIndex::returning(diabetes_passages()), FakeLlm::replying("ok"));
        engine.query("q", None, Language::En).await;
        assert_eq!(engine.stats().await.active_conversations, 0);
    }

    #[tokio::test]
    async fn test_retrieval_failure_contained() {
        let llm = FakeLlm::replying("unused");
        let engine = engine(FakeIndex::failing(), llm.clone());

        let result = engine.query("q", Some("c9"), Language::Ur).await;

        assert_eq!(result.response, UR_APOLOGY);
        assert!(result.sources.is_empty());
        assert_eq!(result.conversation_id.as_deref(), Some("c9"));
        assert_eq!(result.error, Some(FailureKind::Retrieval));
        assert!(!result.response.contains("10.0.0.5"));
        assert_eq!(llm.call_count(), 0);
        assert!(engine.history("c9").is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_contained() {
        let engine = engine(FakeIndex::returning(diabetes_passages()), FakeLlm::failing());

        let result = engine.query("q", Some("c1"), Language::En).await;

        assert_eq!(result.response, EN_APOLOGY);
        assert!(result.sources.is_empty());
        assert_eq!(result.retrieved_count, 0);
        assert_eq!(result.error, Some(FailureKind::Generation));
        assert!(!result.response.contains("sk-123"));
        assert!(engine.history("c1").is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let engine = engine(FakeIndex::returning(diabetes_passages()), FakeLlm::replying("ok"));
        engine.query("q", Some("c1"), Language::En).await;
        engine.query("q", Some("c2"), Language::En).await;

        let stats = engine.stats().await;
        assert_eq!(stats, EngineStats { document_count: 2, active_conversations: 2, top_k: 5 });

        engine.clear_conversation("c1");
        engine.clear_conversation("never-used");
        assert!(engine.history("c1").is_empty());
        assert_eq!(engine.history("c2").len(), 2);
        assert_eq!(engine.stats().await.active_conversations, 1);
    }

    #[tokio::test]
    async fn test_stats_tolerates_index_failure() {
        let engine = engine(FakeIndex::failing(), FakeLlm::replying("ok"));
        assert_eq!(engine.stats().await.document_count, 0);
    }

    #[tokio::test]
    async fn test_injected_store_is_used() {
        let store = ConversationStore::new(2);
        let engine = engine(FakeIndex::returning(diabetes_passages()), FakeLlm::replying("ok"))
            .with_conversations(store);

        engine.query("first", Some("c1"), Language::En).await;
        engine.query("second", Some("c1"), Language::En).await;

        let history = engine.history("c1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "second");
    }
}
