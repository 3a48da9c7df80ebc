use crate::DocId;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("index has not been built yet")]
    UnindexedState,

    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid result count {0}, must be at least 1")]
    InvalidK(usize),

    #[error("invalid BM25 parameters k1={k1}, b={b}: k1 must be finite and >= 0, b within [0, 1]")]
    InvalidBm25Params { k1: f32, b: f32 },

    #[error("non-finite value in the embedding of {target}")]
    NonFiniteEmbedding { target: String },

    #[error("duplicate document id {0}")]
    DuplicateDocument(DocId),

    #[error(transparent)]
    Embedding(#[from] anyhow::Error),
}
