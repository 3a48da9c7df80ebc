use anyhow::Result;
use clap::Parser;
use search_core::sample::{self, KEYWORD_QUERIES, SEMANTIC_QUERIES};
use search_core::{Analyzer, AnalyzerOptions, Bm25Params, Embedder, HashingEmbedder, LexicalIndex, SemanticIndex};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

mod corpus;
mod report;

use report::QueryPlan;

#[derive(Parser)]
#[command(name = "compare")]
#[command(about = "Compare BM25 keyword search with embedding-based semantic search", long_about = None)]
struct Cli {
    /// Corpus file (JSON array, JSON object, JSONL) or directory; defaults to the bundled headlines
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Run these queries against both indexes instead of the canned lists
    #[arg(long = "query")]
    queries: Vec<String>,
    /// BM25 term frequency saturation
    #[arg(long, default_value_t = 1.2)]
    k1: f32,
    /// BM25 length normalization
    #[arg(long, default_value_t = 0.75)]
    b: f32,
    /// Stem tokens for the keyword index
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Dimension of the built-in hashing embedder
    #[arg(long, default_value_t = search_core::embedding::DEFAULT_DIM)]
    dim: usize,
    /// Model2Vec model id or local path (needs the `model2vec` feature)
    #[arg(long)]
    model: Option<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let documents = match &cli.corpus {
        Some(path) => corpus::load(path)?,
        None => sample::documents(),
    };
    tracing::info!(num_docs = documents.len(), "corpus loaded");

    let analyzer = Analyzer::new(AnalyzerOptions { remove_stopwords: true, stem: cli.stem });
    let mut lexical = LexicalIndex::new()
        .with_tokenizer(Box::new(analyzer))
        .with_params(Bm25Params::new(cli.k1, cli.b)?);
    let mut semantic = SemanticIndex::new(build_embedder(&cli)?);

    let plan = if cli.queries.is_empty() {
        QueryPlan::canned(&KEYWORD_QUERIES, &SEMANTIC_QUERIES)
    } else {
        QueryPlan::custom(cli.queries.clone())
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::run(&mut out, &documents, &mut lexical, &mut semantic, &plan)?;
    out.flush()?;
    Ok(())
}

fn build_embedder(cli: &Cli) -> Result<Arc<dyn Embedder>> {
    match &cli.model {
        Some(model) => load_model(model),
        None => Ok(Arc::new(HashingEmbedder::new(cli.dim)?)),
    }
}

#[cfg(feature = "model2vec")]
fn load_model(model: &str) -> Result<Arc<dyn Embedder>> {
    use search_core::embedding::Model2VecEmbedder;
    let path = std::path::Path::new(model);
    let embedder = if path.exists() {
        Model2VecEmbedder::from_path(path)?
    } else {
        Model2VecEmbedder::from_pretrained(model)?
    };
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "model2vec"))]
fn load_model(model: &str) -> Result<Arc<dyn Embedder>> {
    anyhow::bail!("--model {model} needs a build with the `model2vec` feature enabled")
}
