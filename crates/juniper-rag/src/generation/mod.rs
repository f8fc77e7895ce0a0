//! Prompt construction for grounded answer generation

mod context;
mod prompt;

pub use context::ContextBuilder;
pub use prompt::PromptComposer;
