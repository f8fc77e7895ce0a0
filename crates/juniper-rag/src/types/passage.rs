//! Passages returned by the semantic index

use serde::{Deserialize, Serialize};

/// A knowledge passage retrieved for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Stable passage ID (e.g. `doc_0007`)
    pub id: String,
    /// Raw passage text
    pub text: String,
    /// Topic title, if the index stored one
    pub title: Option<String>,
    /// Topic category, if the index stored one
    pub category: Option<String>,
    /// Similarity to the query (0.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

impl RetrievedPassage {
    /// Create a passage without metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            title: None,
            category: None,
            similarity,
        }
    }

    /// Attach a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
