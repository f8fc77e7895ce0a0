//! Prompt templates for grounded medical answers
//!
//! Each language has its own system instruction and user template. The
//! Roman Urdu templates restate the output-language rule at both ends of the
//! prompt because models drift back to English on long contexts.

use crate::config::ConversationConfig;
use crate::types::{ChatMessage, ConversationTurn, Language};

const EN_SYSTEM: &str = r#"You are Juniper, an AI-powered medical research assistant. Your role is to provide accurate, helpful, and clear medical information based on the knowledge provided to you.

IMPORTANT GUIDELINES:
1. Base your answers primarily on the provided CONTEXT
2. Provide clear, concise, and professional responses without excessive formatting
3. Use medical terminology appropriately but explain complex terms
4. If the context doesn't fully answer the question, provide what information is available and acknowledge limitations
5. Always remind users to consult healthcare professionals for medical advice
6. Be empathetic and supportive in your responses

FORMATTING RULES:
- Write in a natural, conversational tone
- Use simple paragraphs separated by blank lines
- DO NOT use markdown headers (##, ===, ---)
- DO NOT use bold (**text**) or italic formatting
- DO NOT reference sources explicitly like [Source 1] or [Source 5] in the response
- DO NOT create artificial sections with headers
- Present information in a flowing, readable manner

Remember: You are a research and educational tool, not a substitute for professional medical advice."#;

const UR_SYSTEM: &str = r#"You are Juniper, a medical research assistant that replies ONLY in Roman Urdu.

LANGUAGE RULE (ROMAN URDU ONLY):
* Never answer in English
* Your WHOLE reply must be Roman Urdu, meaning Urdu written with the English alphabet
* Each sentence, without exception, is Roman Urdu
* Never blend English sentences into the reply

ANSWERING RULES:
1. Rely mainly on the CONTEXT supplied with the question
2. Keep the Roman Urdu simple and easy to follow
3. Where possible explain medical words in Roman Urdu (for example "diabetes" = "sugar ki bimari")
4. When the CONTEXT only partly covers the question, share whatever it does cover
5. Always advise the user to see a doctor (doctor se mashwara zaroor lein)
6. Stay kind and supportive throughout

STYLE RULES:
* Use Latin letters (a-z) only
* Keep a friendly, conversational Roman Urdu tone
* Write short paragraphs with an empty line between them
* No markdown headings of any kind (##, ===, ---)
* No bold or italic text
* Never mention source labels such as [Source 1]

SAMPLE Roman Urdu sentences:
* "Diabetes ya sugar ki bimari aik aisi bemari hai jis mein khoon mein sugar ki miqdar bohat zyada barh jati hai."
* "Ye bemari do qisam ki hoti hai, Type 1 aur Type 2. Type 1 diabetes mein jism insulin nahi bana pata."
* "Is ki wajah se aap ko ye alamat ho sakti hain: zyada pyas lagna, bar bar peshab ana, aur kamzori mehsoos hona."
* "Behtar hoga ke aap kisi doctor se salah karein aur apna check-up zaroor karwayen."

Final reminder: the COMPLETE reply is Roman Urdu. Not a single English sentence."#;

/// Composes the chat message sequence sent to the completion service
#[derive(Debug, Clone)]
pub struct PromptComposer {
    history_window: usize,
}

impl PromptComposer {
    /// `history_window` is the number of prior turns included in each prompt
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.prompt_window)
    }

    /// Fixed system instruction for a language
    pub fn system_instruction(language: Language) -> &'static str {
        match language {
            Language::En => EN_SYSTEM,
            Language::Ur => UR_SYSTEM,
        }
    }

    /// Final user message wrapping the retrieved context and the question
    pub fn user_message(query: &str, context: &str, language: Language) -> String {
        match language {
            Language::En => format!(
                r#"CONTEXT (Retrieved Medical Knowledge):
{context}

USER QUESTION:
{query}

Please provide a clear and professional answer based on the context above. Write in a natural, conversational style without markdown formatting, headers, or source citations."#,
                context = context,
                query = query
            ),
            Language::Ur => format!(
                r#"CONTEXT (Retrieved Medical Knowledge):
{context}

USER QUESTION (in Roman Urdu):
{query}

IMPORTANT: You MUST respond in ROMAN URDU ONLY. Do NOT write in English. Write your complete answer in Roman Urdu (Urdu language using English alphabet). Start your response immediately in Roman Urdu without any English words. Use simple Roman Urdu that is easy to understand."#,
                context = context,
                query = query
            ),
        }
    }

    /// `[system] + last history_window turns + [user]`
    pub fn compose(
        &self,
        query: &str,
        context: &str,
        history: &[ConversationTurn],
        language: Language,
    ) -> Vec<ChatMessage> {
        let start = history.len().saturating_sub(self.history_window);
        let recent = &history[start..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(Self::system_instruction(language)));
        messages.extend(recent.iter().cloned());
        messages.push(ChatMessage::user(Self::user_message(query, context, language)));
        messages
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn exchanges(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .flat_map(|i| {
                [
                    ChatMessage::user(format!("question {}", i)),
                    ChatMessage::assistant(format!("answer {}", i)),
                ]
            })
            .collect()
    }

    #[test]
    fn test_compose_without_history() {
        let composer = PromptComposer::default();
        let messages = composer.compose("What is asthma?", "Title: Asthma", &[], Language::En);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, EN_SYSTEM);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Title: Asthma"));
        assert!(messages[1].content.contains("USER QUESTION:\nWhat is asthma?"));
    }

    #[test]
    fn test_only_last_three_exchanges_included() {
        let composer = PromptComposer::default();
        let history = exchanges(8);
        let messages = composer.compose("q", "ctx", &history, Language::En);

        assert_eq!(messages.len(), 8);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(&messages[1..7], &history[10..16]);
        assert_eq!(messages[1].content, "question 5");
        assert_eq!(messages[6].content, "answer 7");
        assert_eq!(messages[7].role, Role::User);
    }

    #[test]
    fn test_short_history_included_whole() {
        let composer = PromptComposer::new(6);
        let history = exchanges(2);
        let messages = composer.compose("q", "ctx", &history, Language::Ur);
        assert_eq!(messages.len(), 6);
        assert_eq!(&messages[1..5], &history[..]);
    }

    #[test]
    fn test_roman_urdu_templates() {
        let composer = PromptComposer::default();
        let messages = composer.compose("sugar kya hai?", "ctx", &[], Language::Ur);

        assert_eq!(messages[0].content, UR_SYSTEM);
        assert!(messages[0].content.contains("ONLY in Roman Urdu"));
        assert!(messages[1].content.contains("USER QUESTION (in Roman Urdu):\nsugar kya hai?"));
        assert!(messages[1].content.ends_with("Use simple Roman Urdu that is easy to understand."));
    }

    #[test]
    fn test_language_branches_share_no_instructions() {
        for line in EN_SYSTEM.lines().map(str::trim).filter(|l| !l.is_empty()) {
            assert!(!UR_SYSTEM.contains(line), "ur system repeats: {}", line);
        }
        for line in UR_SYSTEM.lines().map(str::trim).filter(|l| !l.is_empty()) {
            assert!(!EN_SYSTEM.contains(line), "en system repeats: {}", line);
        }

        let en_user = PromptComposer::user_message("q", "ctx", Language::En);
        let ur_user = PromptComposer::user_message("q", "ctx", Language::Ur);
        assert!(!ur_user.contains("Please provide a clear and professional answer"));
        assert!(!en_user.contains("ROMAN URDU ONLY"));
    }
}
