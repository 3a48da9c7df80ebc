//! Embedding providers for the semantic index.
//!
//! - [`HashingEmbedder`]: model-free feature hashing, deterministic everywhere
//! - [`FnEmbedder`]: wraps any `Fn(&str) -> Vec<f32>`
//! - `Model2VecEmbedder`: static neural embeddings (feature `model2vec`)
//!
//! Providers are constructed once by the caller and shared, typically as
//! `Arc<dyn Embedder>`.

use crate::tokenizer::{Analyzer, Tokenizer};
use anyhow::{ensure, Result};

pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

pub const DEFAULT_DIM: usize = 256;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Signed feature hashing of word unigrams and padded character trigrams.
///
/// Captures surface overlap only (shared words, shared word fragments such as
/// "canada"/"canadian"), but unlike BM25 it scores every document, so a search
/// always yields up to `k` results.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    analyzer: Analyzer,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        ensure!(dim > 0, "embedding dimension must be at least 1");
        Ok(Self { dim, analyzer: Analyzer::default(), name: format!("hashing-{dim}") })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = blake3::hash(feature.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        let h = u64::from_le_bytes(head);
        let bucket = (h % self.dim as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in self.analyzer.tokenize(text) {
            self.add_feature(&mut vector, &format!("w:{token}"), WORD_WEIGHT);
            let padded: Vec<char> = format!("#{token}#").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &format!("g:{gram}"), TRIGRAM_WEIGHT);
            }
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in vector.iter_mut() {
                *v /= magnitude;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapts a plain function into an [`Embedder`] with a declared dimension.
pub struct FnEmbedder<F> {
    name: String,
    dim: usize,
    f: F,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&str) -> Vec<f32> + Send + Sync,
{
    pub fn new(name: impl Into<String>, dim: usize, f: F) -> Self {
        Self { name: name.into(), dim, f }
    }
}

impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&str) -> Vec<f32> + Send + Sync,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok((self.f)(text))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "model2vec")]
pub use self::model2vec_provider::Model2VecEmbedder;

#[cfg(feature = "model2vec")]
mod model2vec_provider {
    use super::Embedder;
    use anyhow::{Context, Result};
    use model2vec::Model2Vec;
    use std::path::Path;

    /// Static embeddings from a Model2Vec model, loaded once at construction.
    pub struct Model2VecEmbedder {
        model: Model2Vec,
        name: String,
        dim: usize,
    }

    impl Model2VecEmbedder {
        /// Load model from local path
        pub fn from_path(path: &Path) -> Result<Self> {
            let model = Model2Vec::from_pretrained(path.to_string_lossy().as_ref(), None, None)
                .with_context(|| format!("Failed to load Model2Vec from: {}", path.display()))?;
            Self::with_model(model, path.to_string_lossy().to_string())
        }

        /// Load model from HuggingFace Hub
        pub fn from_pretrained(model_id: &str) -> Result<Self> {
            let model = Model2Vec::from_pretrained(model_id, None, None)
                .with_context(|| format!("Failed to load Model2Vec: {}", model_id))?;
            Self::with_model(model, model_id.to_string())
        }

        fn with_model(model: Model2Vec, name: String) -> Result<Self> {
            let probe = model.encode(&["dimension probe"]).context("Failed to probe model dimension")?;
            let dim = probe.ncols();
            tracing::info!(model = %name, dim, "loaded Model2Vec model");
            Ok(Self { model, name, dim })
        }
    }

    impl Embedder for Model2VecEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let texts = [text];
            let embeddings = self.model.encode(&texts).context("Failed to encode text")?;
            Ok(embeddings.row(0).to_vec())
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let embeddings = self.model.encode(texts).context("Failed to encode texts")?;
            Ok(embeddings.rows().into_iter().map(|r| r.to_vec()).collect())
        }

        fn dimension(&self) -> usize {
            self.dim
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}
