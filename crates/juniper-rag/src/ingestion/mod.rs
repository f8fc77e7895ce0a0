//! Knowledge corpus ingestion

mod corpus;

pub use corpus::{corpus_fingerprint, load_corpus, to_documents, CorpusDocument, KnowledgeEntry};
