//! BM25 keyword index.
//!
//! Postings are kept per term as `doc_id -> term frequency`, alongside the token
//! length of every indexed document. Scoring uses the Okapi BM25 formula with
//! the `log(1 + (N - df + 0.5) / (df + 0.5))` IDF, which never goes negative.

use crate::error::{Result, SearchError};
use crate::rank::{top_k, Hit};
use crate::tokenizer::{Analyzer, Tokenizer};
use crate::{ensure_unique_ids, DocId, Document, IndexState};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    k1: f32,
    b: f32,
}

impl Bm25Params {
    /// `k1` (term frequency saturation) must be finite and non-negative, `b`
    /// (length normalization) within `[0, 1]`; otherwise `tf + norm` can reach
    /// zero and scores turn infinite or NaN.
    pub fn new(k1: f32, b: f32) -> Result<Self> {
        if !(k1.is_finite() && k1 >= 0.0 && (0.0..=1.0).contains(&b)) {
            return Err(SearchError::InvalidBm25Params { k1, b });
        }
        Ok(Self { k1, b })
    }

    pub fn k1(&self) -> f32 {
        self.k1
    }

    pub fn b(&self) -> f32 {
        self.b
    }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

#[derive(Debug, Default)]
struct Postings {
    terms: HashMap<String, HashMap<DocId, u32>>,
    doc_lengths: HashMap<DocId, u32>,
    num_docs: u32,
    avg_doc_len: f32,
}

pub struct LexicalIndex {
    tokenizer: Box<dyn Tokenizer>,
    params: Bm25Params,
    built: Option<Postings>,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self { tokenizer: Box::new(Analyzer::default()), params: Bm25Params::default(), built: None }
    }

    pub fn with_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// Replace the tokenizer and drop any built state, so indexing and
    /// querying always go through the same tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self.built = None;
        self
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn state(&self) -> IndexState {
        match &self.built {
            None => IndexState::Empty,
            Some(p) => IndexState::Built { num_docs: p.num_docs as usize },
        }
    }

    /// Build the index from scratch. On error the previous state is kept.
    pub fn index(&mut self, documents: &[Document]) -> Result<()> {
        ensure_unique_ids(documents)?;

        let mut terms: HashMap<String, HashMap<DocId, u32>> = HashMap::new();
        let mut doc_lengths: HashMap<DocId, u32> = HashMap::with_capacity(documents.len());
        let mut total_len: u64 = 0;

        for doc in documents {
            let tokens = self.tokenizer.tokenize(&doc.text);
            let doc_len = tokens.len() as u32;
            for term in tokens {
                *terms.entry(term).or_default().entry(doc.id).or_insert(0) += 1;
            }
            doc_lengths.insert(doc.id, doc_len);
            total_len += doc_len as u64;
        }

        let num_docs = documents.len() as u32;
        let avg_doc_len = if num_docs == 0 { 0.0 } else { total_len as f32 / num_docs as f32 };
        tracing::info!(num_docs, num_terms = terms.len(), avg_doc_len, "built lexical index");

        self.built = Some(Postings { terms, doc_lengths, num_docs, avg_doc_len });
        Ok(())
    }

    /// Top `k` documents by BM25 score. Documents sharing no term with the
    /// query are never returned, so the result may be empty.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        if k < 1 {
            return Err(SearchError::InvalidK(k));
        }
        let built = self.built.as_ref().ok_or(SearchError::UnindexedState)?;

        let mut seen: HashSet<String> = HashSet::new();
        let query_terms: Vec<String> = self
            .tokenizer
            .tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let n = built.num_docs as f32;
        let Bm25Params { k1, b } = self.params;
        let mut scores: HashMap<DocId, f32> = HashMap::new();

        for term in &query_terms {
            let Some(postings) = built.terms.get(term) else { continue };
            let df = postings.len() as f32;
            let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();

            for (&doc_id, &tf_raw) in postings {
                let tf = tf_raw as f32;
                let dl = built.doc_lengths.get(&doc_id).copied().unwrap_or(0) as f32;
                // avg_doc_len > 0 whenever a posting exists
                let norm = k1 * (1.0 - b + b * dl / built.avg_doc_len);
                *scores.entry(doc_id).or_insert(0.0) += idf * (tf * (k1 + 1.0)) / (tf + norm);
            }
        }

        let total_hits = scores.len();
        let hits = top_k(scores, k);
        tracing::debug!(query, total_hits, returned = hits.len(), "lexical search");
        Ok(hits)
    }

    pub fn num_docs(&self) -> usize {
        self.built.as_ref().map_or(0, |p| p.num_docs as usize)
    }

    pub fn num_terms(&self) -> usize {
        self.built.as_ref().map_or(0, |p| p.terms.len())
    }

    pub fn avg_doc_len(&self) -> f32 {
        self.built.as_ref().map_or(0.0, |p| p.avg_doc_len)
    }

    /// Number of documents containing `term` (already normalized).
    pub fn doc_freq(&self, term: &str) -> usize {
        self.built.as_ref().and_then(|p| p.terms.get(term)).map_or(0, |postings| postings.len())
    }

    pub fn term_freq(&self, term: &str, doc_id: DocId) -> u32 {
        self.built
            .as_ref()
            .and_then(|p| p.terms.get(term))
            .and_then(|postings| postings.get(&doc_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn doc_len(&self, doc_id: DocId) -> Option<u32> {
        self.built.as_ref().and_then(|p| p.doc_lengths.get(&doc_id)).copied()
    }

    /// Ids of every document holding at least one posting.
    pub fn posted_doc_ids(&self) -> HashSet<DocId> {
        self.built
            .as_ref()
            .map(|p| p.terms.values().flat_map(|postings| postings.keys().copied()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(0, "rust programming systems language fast"),
            Document::new(1, "python programming scripting easy"),
            Document::new(2, "java enterprise programming verbose"),
            Document::new(3, "rust memory safety zero cost abstractions"),
        ]
    }

    fn built() -> LexicalIndex {
        let mut idx = LexicalIndex::new();
        idx.index(&corpus()).unwrap();
        idx
    }

    #[test]
    fn search_before_index_fails() {
        let idx = LexicalIndex::new();
        assert_eq!(idx.state(), IndexState::Empty);
        assert!(matches!(idx.search("rust", 1), Err(SearchError::UnindexedState)));
    }

    #[test]
    fn zero_k_is_rejected() {
        let idx = built();
        assert!(matches!(idx.search("rust", 0), Err(SearchError::InvalidK(0))));
    }

    #[test]
    fn empty_query_returns_nothing() {
        let idx = built();
        assert!(idx.search("", 5).unwrap().is_empty());
        assert!(idx.search("the of and", 5).unwrap().is_empty());
    }

    #[test]
    fn corpus_statistics() {
        let idx = built();
        assert_eq!(idx.state(), IndexState::Built { num_docs: 4 });
        assert_eq!(idx.doc_freq("programming"), 3);
        assert_eq!(idx.doc_freq("rust"), 2);
        assert_eq!(idx.doc_len(3), Some(6));
        assert!((idx.avg_doc_len() - 19.0 / 4.0).abs() < 1e-6);
    }

    #[test]
    fn term_frequency_counts_repeats() {
        let mut idx = LexicalIndex::new();
        idx.index(&[Document::new(0, "hello hello hello world")]).unwrap();
        assert_eq!(idx.term_freq("hello", 0), 3);
        assert_eq!(idx.term_freq("world", 0), 1);
        assert_eq!(idx.term_freq("hello", 1), 0);
    }

    #[test]
    fn matches_hand_computed_score() {
        let idx = built();
        let hits = idx.search("python", 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 1);

        // N=4, df=1, tf=1, |D|=4, avgdl=4.75
        let idf = (1.0f32 + (4.0 - 1.0 + 0.5) / (1.0 + 0.5)).ln();
        let norm = 1.2 * (1.0 - 0.75 + 0.75 * 4.0 / 4.75);
        let expected = idf * (1.0 * 2.2) / (1.0 + norm);
        assert!((hits[0].score - expected).abs() < 1e-5);
    }

    #[test]
    fn sums_scores_over_query_terms() {
        let mut idx = LexicalIndex::new();
        idx.index(&[
            Document::new(0, "rust rust programming"),
            Document::new(1, "python programming"),
            Document::new(2, "java enterprise"),
        ])
        .unwrap();
        let hits = idx.search("rust programming", 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![0, 1]);

        // N=3, avgdl=7/3; "rust" df=1, "programming" df=2
        let (n, avgdl, k1, b) = (3.0f32, 7.0f32 / 3.0, 1.2f32, 0.75f32);
        let idf = |df: f32| (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        let term = |tf: f32, dl: f32| (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / avgdl));
        let doc0 = idf(1.0) * term(2.0, 3.0) + idf(2.0) * term(1.0, 3.0);
        let doc1 = idf(2.0) * term(1.0, 2.0);
        assert!((hits[0].score - doc0).abs() < 1e-5, "{} vs {doc0}", hits[0].score);
        assert!((hits[1].score - doc1).abs() < 1e-5, "{} vs {doc1}", hits[1].score);
    }

    #[test]
    fn params_are_validated() {
        assert!(Bm25Params::new(1.2, 0.75).is_ok());
        assert!(Bm25Params::new(0.0, 0.0).is_ok());
        assert!(Bm25Params::new(0.0, 1.0).is_ok());
        assert!(matches!(Bm25Params::new(-1.0, 0.0), Err(SearchError::InvalidBm25Params { .. })));
        assert!(Bm25Params::new(1.2, 1.5).is_err());
        assert!(Bm25Params::new(1.2, -0.1).is_err());
        assert!(Bm25Params::new(f32::NAN, 0.5).is_err());
        assert!(Bm25Params::new(f32::INFINITY, 0.5).is_err());
        assert!(Bm25Params::new(1.2, f32::NAN).is_err());
    }

    #[test]
    fn higher_tf_ranks_first() {
        let mut idx = LexicalIndex::new();
        idx.index(&[Document::new(0, "rust rust rust"), Document::new(1, "rust programming")]).unwrap();
        let hits = idx.search("rust", 10).unwrap();
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn repeated_query_terms_count_once() {
        let idx = built();
        let once = idx.search("python", 1).unwrap();
        let twice = idx.search("python python", 1).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn equal_scores_break_ties_by_id() {
        let mut idx = LexicalIndex::new();
        idx.index(&[Document::new(9, "apple pie"), Document::new(4, "apple tart"), Document::new(6, "apple cake")]).unwrap();
        let ids: Vec<DocId> = idx.search("apple", 3).unwrap().iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn no_shared_terms_is_empty() {
        let idx = built();
        assert!(idx.search("xyzzy", 3).unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_keep_previous_state() {
        let mut idx = built();
        let err = idx.index(&[Document::new(1, "a"), Document::new(1, "b")]).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateDocument(1)));
        assert_eq!(idx.state(), IndexState::Built { num_docs: 4 });
        assert_eq!(idx.search("python", 1).unwrap()[0].doc_id, 1);
    }

    #[test]
    fn rebuild_replaces_state() {
        let mut idx = built();
        idx.index(&[Document::new(10, "completely different words")]).unwrap();
        assert_eq!(idx.state(), IndexState::Built { num_docs: 1 });
        assert!(idx.search("rust", 5).unwrap().is_empty());
        assert_eq!(idx.search("different", 5).unwrap()[0].doc_id, 10);
    }

    #[test]
    fn postings_refer_to_known_documents() {
        let mut docs = corpus();
        docs.push(Document::new(42, "the of and"));
        let mut idx = LexicalIndex::new();
        idx.index(&docs).unwrap();
        for id in idx.posted_doc_ids() {
            assert!(idx.doc_len(id).is_some());
        }
        // token-free documents are counted but hold no postings
        assert_eq!(idx.doc_len(42), Some(0));
        assert!(!idx.posted_doc_ids().contains(&42));
        assert_eq!(idx.num_docs(), 5);
    }

    #[test]
    fn params_change_scores() {
        let docs = corpus();
        let mut default = LexicalIndex::new();
        default.index(&docs).unwrap();
        let mut flat = LexicalIndex::new().with_params(Bm25Params::new(1.2, 0.0).unwrap());
        assert_eq!(flat.params().b(), 0.0);
        flat.index(&docs).unwrap();
        let a = default.search("rust", 1).unwrap()[0].score;
        let b = flat.search("rust", 1).unwrap()[0].score;
        assert!((a - b).abs() > 1e-6);
    }
}
