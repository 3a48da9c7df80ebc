use criterion::{black_box, criterion_group, criterion_main, Criterion};
use search_core::sample::{self, KEYWORD_QUERIES, SEMANTIC_QUERIES};
use search_core::tokenizer::tokenize;
use search_core::{Embedder, HashingEmbedder, LexicalIndex, SemanticIndex};
use std::sync::Arc;

fn bench_tokenize(c: &mut Criterion) {
    let text = sample::HEADLINES.join(" ");
    c.bench_function("tokenize_headlines", |b| b.iter(|| black_box(tokenize(&text))));
}

fn bench_lexical(c: &mut Criterion) {
    let mut idx = LexicalIndex::new();
    idx.index(&sample::documents()).expect("index sample corpus");
    c.bench_function("lexical_search", |b| {
        b.iter(|| {
            for q in KEYWORD_QUERIES {
                black_box(idx.search(q, 1).expect("search succeeds"));
            }
        })
    });
}

fn bench_semantic(c: &mut Criterion) {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(256).expect("valid dimension"));
    let mut idx = SemanticIndex::new(embedder);
    idx.index(&sample::documents()).expect("index sample corpus");
    c.bench_function("semantic_search", |b| {
        b.iter(|| {
            for q in SEMANTIC_QUERIES {
                black_box(idx.search(q, 1).expect("search succeeds"));
            }
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_lexical, bench_semantic);
criterion_main!(benches);
