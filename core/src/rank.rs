use crate::DocId;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f32,
}

fn by_score_then_id(a: &Hit, b: &Hit) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

/// NaN counts as 0 and -0.0 as 0.0, so equal-looking scores tie.
fn canonical(score: f32) -> f32 {
    if score.is_nan() { 0.0 } else { score + 0.0 }
}

/// Highest scores first, equal scores in ascending id order, at most `k` hits.
pub fn top_k<I>(scores: I, k: usize) -> Vec<Hit>
where
    I: IntoIterator<Item = (DocId, f32)>,
{
    let mut hits: Vec<Hit> = scores
        .into_iter()
        .map(|(doc_id, score)| Hit { doc_id, score: canonical(score) })
        .collect();
    hits.sort_unstable_by(by_score_then_id);
    hits.truncate(k);
    hits
}
