//! In-memory keyword (BM25) and embedding-based search over a small document set.
//!
//! Both index types are built in one batch from a slice of [`Document`]s and are
//! read-only afterwards. Rebuilding replaces the previous state wholesale.

pub mod embedding;
pub mod error;
pub mod lexical;
pub mod rank;
pub mod sample;
pub mod semantic;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use embedding::{Embedder, FnEmbedder, HashingEmbedder};
pub use error::{Result, SearchError};
pub use lexical::{Bm25Params, LexicalIndex};
pub use rank::Hit;
pub use semantic::SemanticIndex;
pub use tokenizer::{Analyzer, AnalyzerOptions, Tokenizer};

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
}

impl Document {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// Lifecycle of an index: `Empty` until the first successful `index()` call,
/// `Built` from then on. A rebuild moves `Built -> Built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Empty,
    Built { num_docs: usize },
}

pub(crate) fn ensure_unique_ids(documents: &[Document]) -> Result<()> {
    let mut seen: HashSet<DocId> = HashSet::with_capacity(documents.len());
    for doc in documents {
        if !seen.insert(doc.id) {
            return Err(SearchError::DuplicateDocument(doc.id));
        }
    }
    Ok(())
}
