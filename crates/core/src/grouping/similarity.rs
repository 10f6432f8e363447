//! Ordering that places similar titles next to each other.

use strsim::normalized_levenshtein;

use crate::store::{Record, Title};

/// Minimum similarity for two texts to count as neighbours.
///
/// Scores come from [`similarity`], a normalized Levenshtein ratio
/// (`1 - edit distance / longer length`). It is not a matching-blocks
/// sequence ratio, so two texts near the cutoff can land on different sides
/// of it than they would under that metric.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Something that carries the text used for similarity ordering.
pub trait SimilarityKey {
    fn similarity_key(&self) -> &str;
}

impl SimilarityKey for Title {
    fn similarity_key(&self) -> &str {
        &self.text
    }
}

impl SimilarityKey for Record {
    fn similarity_key(&self) -> &str {
        &self.name
    }
}

impl SimilarityKey for String {
    fn similarity_key(&self) -> &str {
        self
    }
}

impl SimilarityKey for &str {
    fn similarity_key(&self) -> &str {
        self
    }
}

/// Normalized Levenshtein similarity of two texts in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

/// Reorder items as a greedy nearest-neighbour chain.
///
/// Starts from the first item; each next item is the most similar remaining
/// one at or above [`SIMILARITY_CUTOFF`] (earliest wins ties), or else the
/// first remaining item in input order. The output is a permutation of the
/// input.
pub fn order_by_similarity<T: SimilarityKey>(items: Vec<T>) -> Vec<T> {
    let expected = items.len();
    let mut remaining = items;
    let mut ordered = Vec::with_capacity(expected);
    if remaining.is_empty() {
        return ordered;
    }

    let mut current = remaining.remove(0);
    while !remaining.is_empty() {
        let next = closest(current.similarity_key(), &remaining).unwrap_or(0);
        let chosen = remaining.remove(next);
        ordered.push(std::mem::replace(&mut current, chosen));
    }
    ordered.push(current);

    assert_eq!(ordered.len(), expected, "similarity ordering lost items");
    ordered
}

fn closest<T: SimilarityKey>(key: &str, candidates: &[T]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (ix, candidate) in candidates.iter().enumerate() {
        let score = similarity(key, candidate.similarity_key());
        if score < SIMILARITY_CUTOFF {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((ix, score));
        }
    }
    best.map(|(ix, _)| ix)
}
