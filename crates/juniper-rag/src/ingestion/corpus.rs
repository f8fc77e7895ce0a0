//! Medical knowledge corpus loading
//!
//! The corpus is a JSON array of `{title, category, content}` entries. Each
//! entry becomes one indexable document whose text leads with its title so
//! the title participates in the embedding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{Error, Result};

/// One topic in the knowledge corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub title: String,
    pub category: String,
    pub content: String,
}

/// A corpus entry prepared for indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    /// Stable ID derived from corpus position (`doc_0000`, `doc_0001`, ...)
    pub id: String,
    /// Text that gets embedded and returned as passage text
    pub text: String,
    pub title: String,
    pub category: String,
}

/// Read corpus entries from a JSON file
pub fn load_corpus(path: &Path) -> Result<Vec<KnowledgeEntry>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read corpus {}: {}", path.display(), e))
    })?;
    let entries: Vec<KnowledgeEntry> = serde_json::from_str(&raw)?;

    if let Some(pos) = entries
        .iter()
        .position(|e| e.title.trim().is_empty() || e.content.trim().is_empty())
    {
        return Err(Error::Config(format!(
            "Corpus entry {} in {} has an empty title or content",
            pos,
            path.display()
        )));
    }

    tracing::info!("Loaded {} knowledge entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Turn entries into indexable documents
pub fn to_documents(entries: &[KnowledgeEntry]) -> Vec<CorpusDocument> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| CorpusDocument {
            id: format!("doc_{:04}", idx),
            text: format!("Title: {}\n\n{}", entry.title, entry.content.trim()),
            title: entry.title.clone(),
            category: entry.category.clone(),
        })
        .collect()
}

/// SHA-256 over the corpus contents, used to detect a stale index cache
pub fn corpus_fingerprint(entries: &[KnowledgeEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        hasher.update(entry.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.category.as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.content.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
