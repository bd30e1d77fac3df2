//! Window comparison and candidate cluster collection.
//!
//! Each sorted position anchors a window of `window_size` positions centred on
//! itself. The anchor is compared against every neighbour in the window that
//! came from a different source; matching neighbours join the anchor's
//! candidate cluster. Positions are independent of one another, so with the
//! `parallel` feature they are evaluated on the rayon pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::config::BlockingConfig;
use crate::merge::Cluster;
use crate::record::{Record, RecordIdentity};
use crate::similarity::SimilarityEngine;

/// Candidate cluster built around one sorted position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateCluster {
    /// Position of the anchor in the sorted sequence
    pub position: usize,
    pub anchor: RecordIdentity,
    /// Anchor plus every matching neighbour
    pub members: Cluster,
}

/// Work done by the window comparator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    /// Similarity engine invocations
    pub comparisons: usize,
    /// Invocations that reported a match
    pub matches: usize,
}

impl std::ops::Add for WindowStats {
    type Output = WindowStats;

    fn add(self, rhs: WindowStats) -> WindowStats {
        WindowStats {
            comparisons: self.comparisons + rhs.comparisons,
            matches: self.matches + rhs.matches,
        }
    }
}

/// Positions compared against `position` in a sequence of `len` records,
/// before the same-source filter.
pub fn window_bounds(position: usize, len: usize, offset: usize) -> std::ops::RangeInclusive<usize> {
    let lo = position.saturating_sub(offset);
    let hi = position.saturating_add(offset).min(len.saturating_sub(1));
    lo..=hi
}

/// Build the candidate cluster anchored at `position`
pub fn compare_window<E: SimilarityEngine + ?Sized>(
    sorted: &[&Record],
    position: usize,
    config: &BlockingConfig,
    engine: &E,
) -> (CandidateCluster, WindowStats) {
    let anchor = sorted[position];
    let mut members = Cluster::singleton(anchor.identity());
    let mut stats = WindowStats::default();

    for j in window_bounds(position, sorted.len(), config.offset()) {
        let neighbour = sorted[j];
        if j == position || neighbour.same_source(anchor) {
            continue;
        }
        stats.comparisons += 1;
        if engine.is_match(&anchor.key, &neighbour.key, config.similarity_measure) {
            stats.matches += 1;
            members.insert(neighbour.identity());
        }
    }

    let candidate = CandidateCluster {
        position,
        anchor: anchor.identity(),
        members,
    };
    (candidate, stats)
}

/// One candidate cluster per sorted position, in position order
pub fn candidate_clusters<E: SimilarityEngine + ?Sized>(
    sorted: &[&Record],
    config: &BlockingConfig,
    engine: &E,
) -> (Vec<CandidateCluster>, WindowStats) {
    #[cfg(feature = "parallel")]
    let results: Vec<(CandidateCluster, WindowStats)> = (0..sorted.len())
        .into_par_iter()
        .map(|position| compare_window(sorted, position, config, engine))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(CandidateCluster, WindowStats)> = (0..sorted.len())
        .map(|position| compare_window(sorted, position, config, engine))
        .collect();

    let stats = results
        .iter()
        .fold(WindowStats::default(), |acc, (_, s)| acc + *s);
    let candidates = results.into_iter().map(|(c, _)| c).collect();

    tracing::debug!(
        "Built candidate clusters: {} comparisons, {} matches",
        stats.comparisons,
        stats.matches
    );
    (candidates, stats)
}
