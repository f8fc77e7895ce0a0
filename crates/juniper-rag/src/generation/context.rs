//! Context block assembly from retrieved passages

use crate::types::RetrievedPassage;

/// Joins retrieved passages into the context block handed to the model
pub struct ContextBuilder;

impl ContextBuilder {
    /// Passage texts in retrieval order, trimmed, separated by a blank line.
    ///
    /// No source labels or numbering are added; the model is told not to cite.
    pub fn build(passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(|p| p.text.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
