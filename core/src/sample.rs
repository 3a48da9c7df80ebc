//! Six news headlines plus two query sets that show where keyword and
//! embedding search part ways.

use crate::{DocId, Document};

pub const HEADLINES: [&str; 6] = [
    "US tops 5 million confirmed virus cases",
    "Canada's last fully intact ice shelf has suddenly collapsed, forming a Manhattan-sized iceberg",
    "Beijing mobilises invasion craft along coast as Taiwan tensions escalate",
    "The National Park Service warns against sacrificing slower friends in a bear attack",
    "Maine man wins $1M from $25 lottery ticket",
    "Make huge profits without work, earn up to $100,000 a day",
];

/// Queries that share at least one term with their intended headline.
pub const KEYWORD_QUERIES: [&str; 5] = [
    "lottery winner",
    "canadian iceberg",
    "number of cases",
    "rising tensions",
    "park service",
];

/// Queries related to a headline by meaning only; BM25 finds nothing for them.
pub const SEMANTIC_QUERIES: [&str; 8] = [
    "feel good story",
    "climate change",
    "public health story",
    "war",
    "wildlife",
    "asia",
    "lucky",
    "dishonest junk",
];

/// The headlines as documents with ids `0..6` in listing order.
pub fn documents() -> Vec<Document> {
    HEADLINES
        .iter()
        .enumerate()
        .map(|(i, text)| Document::new(i as DocId, *text))
        .collect()
}
