//! Similarity scoring for key comparison
//!
//! Every measure is normalized to `[0, 1]` and thresholded at
//! [`MATCH_THRESHOLD`]. Dice and Jaccard score sets of padded 2-grams; the
//! others compare the raw strings.

use std::collections::HashSet;

use strsim::{hamming, jaro, normalized_levenshtein};

use crate::config::SimilarityMeasure;

/// Minimum similarity for two keys to count as a match, for every measure
pub const MATCH_THRESHOLD: f64 = 0.75;

/// Shingle length used by the token-based measures
pub const QGRAM_SIZE: usize = 2;

/// Jaro-Winkler prefix scale
pub const PREFIX_SCALE: f64 = 0.1;

/// Longest common prefix rewarded by Jaro-Winkler
pub const MAX_PREFIX: usize = 4;

const PREFIX_PAD: char = '#';
const SUFFIX_PAD: char = '$';

/// Decides whether two keys are similar enough to share a candidate cluster.
///
/// Implementations must be shareable across threads so window positions can be
/// evaluated in parallel.
pub trait SimilarityEngine: Send + Sync {
    /// Similarity of `a` and `b` under `measure`, in `[0, 1]`
    fn score(&self, a: &str, b: &str, measure: SimilarityMeasure) -> f64;

    /// Match decision for `a` and `b` under `measure`
    fn is_match(&self, a: &str, b: &str, measure: SimilarityMeasure) -> bool {
        self.score(a, b, measure) >= MATCH_THRESHOLD
    }
}

/// Built-in engine backed by `strsim` and a padded q-gram tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSimilarityEngine {
    tokenizer: QgramTokenizer,
}

impl DefaultSimilarityEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimilarityEngine for DefaultSimilarityEngine {
    fn score(&self, a: &str, b: &str, measure: SimilarityMeasure) -> f64 {
        match measure {
            SimilarityMeasure::Dice => {
                dice_similarity(&self.tokenizer.token_set(a), &self.tokenizer.token_set(b))
            }
            SimilarityMeasure::Jaccard => {
                jaccard_similarity(&self.tokenizer.token_set(a), &self.tokenizer.token_set(b))
            }
            SimilarityMeasure::Hamming => hamming_similarity(a, b),
            SimilarityMeasure::JaroWinkler => jaro_winkler_similarity(a, b),
            SimilarityMeasure::Levenshtein => normalized_levenshtein(a, b),
        }
    }
}

/// Splits a string into overlapping character q-grams.
///
/// The input is padded with `q - 1` copies of `#` in front and `$` behind, so
/// the first and last characters each start or end a token of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QgramTokenizer {
    q: usize,
}

impl Default for QgramTokenizer {
    fn default() -> Self {
        Self { q: QGRAM_SIZE }
    }
}

impl QgramTokenizer {
    /// Tokenizer for q-grams of length `q` (at least 1)
    pub fn new(q: usize) -> Self {
        Self { q: q.max(1) }
    }

    /// Tokens in order of occurrence, duplicates kept
    pub fn tokenize(&self, input: &str) -> Vec<String> {
        let pad = self.q - 1;
        let chars: Vec<char> = std::iter::repeat(PREFIX_PAD)
            .take(pad)
            .chain(input.chars())
            .chain(std::iter::repeat(SUFFIX_PAD).take(pad))
            .collect();

        if chars.len() < self.q {
            return Vec::new();
        }
        chars.windows(self.q).map(|w| w.iter().collect()).collect()
    }

    pub fn token_set(&self, input: &str) -> HashSet<String> {
        self.tokenize(input).into_iter().collect()
    }
}

/// Dice coefficient of two token sets; two empty sets are identical
pub fn dice_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    2.0 * intersection as f64 / (a.len() + b.len()) as f64
}

/// Jaccard index of two token sets; two empty sets are identical
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// `1 - differing positions / length`.
///
/// Hamming distance is undefined for strings of different lengths; those pairs
/// score 0.0.
pub fn hamming_similarity(a: &str, b: &str) -> f64 {
    match hamming(a, b) {
        Ok(distance) => {
            let len = a.chars().count();
            if len == 0 {
                1.0
            } else {
                1.0 - distance as f64 / len as f64
            }
        }
        Err(_) => 0.0,
    }
}

/// Jaro similarity boosted by the common prefix, up to [`MAX_PREFIX`] chars.
///
/// The boost applies at every Jaro score, not only above 0.7.
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    let sim = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    sim + prefix as f64 * PREFIX_SCALE * (1.0 - sim)
}
