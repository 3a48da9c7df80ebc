//! Embedding index scored by cosine similarity.

use crate::embedding::Embedder;
use crate::error::{Result, SearchError};
use crate::rank::{top_k, Hit};
use crate::{ensure_unique_ids, DocId, Document, IndexState};
use std::collections::HashMap;
use std::sync::Arc;

struct StoredVector {
    values: Vec<f32>,
    norm: f32,
}

struct Vectors {
    by_id: HashMap<DocId, StoredVector>,
    dim: usize,
}

pub struct SemanticIndex {
    embedder: Arc<dyn Embedder>,
    built: Option<Vectors>,
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot(a, b) / (norm_a * norm_b);
    // overflowing magnitudes give inf / inf
    if sim.is_nan() { 0.0 } else { sim.clamp(-1.0, 1.0) }
}

fn ensure_finite(values: &[f32], target: impl FnOnce() -> String) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SearchError::NonFiniteEmbedding { target: target() })
    }
}

/// Cosine similarity in `[-1, 1]`; 0 when either vector has zero length or
/// the result is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    cosine_with_norms(a, l2_norm(a), b, l2_norm(b))
}

impl SemanticIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, built: None }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn state(&self) -> IndexState {
        match &self.built {
            None => IndexState::Empty,
            Some(v) => IndexState::Built { num_docs: v.by_id.len() },
        }
    }

    /// Embed and store every document. On error the previous state is kept.
    pub fn index(&mut self, documents: &[Document]) -> Result<()> {
        ensure_unique_ids(documents)?;

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != documents.len() {
            return Err(SearchError::Embedding(anyhow::anyhow!(
                "embedder {} returned {} vectors for {} documents",
                self.embedder.name(),
                embeddings.len(),
                documents.len()
            )));
        }

        let dim = self.embedder.dimension();
        let mut by_id = HashMap::with_capacity(documents.len());
        for (doc, values) in documents.iter().zip(embeddings) {
            if values.len() != dim {
                return Err(SearchError::DimensionMismatch { expected: dim, found: values.len() });
            }
            ensure_finite(&values, || format!("document {}", doc.id))?;
            let norm = l2_norm(&values);
            if norm == 0.0 {
                tracing::warn!(doc_id = doc.id, "document embedded to the zero vector");
            }
            by_id.insert(doc.id, StoredVector { values, norm });
        }

        tracing::info!(num_docs = by_id.len(), dim, embedder = self.embedder.name(), "built semantic index");
        self.built = Some(Vectors { by_id, dim });
        Ok(())
    }

    /// Top `k` documents by cosine similarity to the embedded query. Every
    /// document is scored, so this returns `min(k, len())` hits.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        if k < 1 {
            return Err(SearchError::InvalidK(k));
        }
        let built = self.built.as_ref().ok_or(SearchError::UnindexedState)?;

        let query_vec = self.embedder.embed(query)?;
        if query_vec.len() != built.dim {
            return Err(SearchError::DimensionMismatch { expected: built.dim, found: query_vec.len() });
        }
        ensure_finite(&query_vec, || "the query".to_string())?;
        let query_norm = l2_norm(&query_vec);

        let scores = built
            .by_id
            .iter()
            .map(|(&id, v)| (id, cosine_with_norms(&query_vec, query_norm, &v.values, v.norm)));
        let hits = top_k(scores, k);
        tracing::debug!(query, returned = hits.len(), "semantic search");
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.built.as_ref().map_or(0, |v| v.by_id.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector length of the built index.
    pub fn dimension(&self) -> Option<usize> {
        self.built.as_ref().map(|v| v.dim)
    }

    pub fn embedding(&self, doc_id: DocId) -> Option<&[f32]> {
        self.built.as_ref().and_then(|v| v.by_id.get(&doc_id)).map(|s| s.values.as_slice())
    }
}
