//! End-to-end blocking: validate, sort, window, merge.

use serde::Serialize;

use crate::config::{BlockingConfig, BlockingParams};
use crate::error::Result;
use crate::merge::{merge_clusters, Cluster};
use crate::record::Record;
use crate::similarity::{DefaultSimilarityEngine, SimilarityEngine};
use crate::sort::sort_records;
use crate::window::{candidate_clusters, CandidateCluster};

/// Counters for a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockingStats {
    pub records: usize,
    pub comparisons: usize,
    pub matches: usize,
    pub candidate_clusters: usize,
    pub final_clusters: usize,
}

/// Everything a run produced, stage by stage
#[derive(Debug, Clone, Serialize)]
pub struct BlockingOutput<'a> {
    /// Input records in sorted order
    #[serde(skip)]
    pub sorted: Vec<&'a Record>,
    /// One candidate cluster per sorted position
    pub candidates: Vec<CandidateCluster>,
    /// Merged clusters
    pub clusters: Vec<Cluster>,
    pub stats: BlockingStats,
}

/// Runs the blocking pipeline with a validated configuration
#[derive(Debug, Clone)]
pub struct Blocker<E = DefaultSimilarityEngine> {
    config: BlockingConfig,
    engine: E,
}

impl Blocker<DefaultSimilarityEngine> {
    pub fn new(config: BlockingConfig) -> Self {
        Self::with_engine(config, DefaultSimilarityEngine::new())
    }
}

impl<E: SimilarityEngine> Blocker<E> {
    /// Use a caller-supplied similarity engine
    pub fn with_engine(config: BlockingConfig, engine: E) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &BlockingConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Block `records`.
    ///
    /// Fails only if the window does not fit the number of records.
    pub fn run<'a>(&self, records: &'a [Record]) -> Result<BlockingOutput<'a>> {
        self.config.ensure_fits(records.len())?;

        let sorted = sort_records(records, self.config.sorting_order);
        tracing::debug!(
            "Sorted {} records ({})",
            sorted.len(),
            self.config.sorting_order
        );

        let (candidates, window_stats) = candidate_clusters(&sorted, &self.config, &self.engine);
        let clusters = merge_clusters(
            candidates.iter().map(|c| c.members.clone()).collect(),
            self.config.merge_strategy,
        );

        let stats = BlockingStats {
            records: records.len(),
            comparisons: window_stats.comparisons,
            matches: window_stats.matches,
            candidate_clusters: candidates.len(),
            final_clusters: clusters.len(),
        };
        tracing::info!(
            "Blocked {} records into {} clusters (window {}, {})",
            stats.records,
            stats.final_clusters,
            self.config.window_size,
            self.config.similarity_measure
        );

        Ok(BlockingOutput {
            sorted,
            candidates,
            clusters,
            stats,
        })
    }
}

/// Validate `params` against `records` and block them.
///
/// On any validation failure nothing is computed and the error is returned.
pub fn block(records: &[Record], params: &BlockingParams) -> Result<Vec<Cluster>> {
    let config = params
        .validate(records.len())
        .inspect_err(|e| tracing::warn!("Rejected blocking parameters: {}", e))?;
    let output = Blocker::new(config).run(records)?;
    Ok(output.clusters)
}

/// Block untyped `[source, id, key]` rows.
///
/// Parameters are validated first; rows are then checked for shape before
/// anything is sorted.
pub fn block_table<S: AsRef<str>>(rows: &[Vec<S>], params: &BlockingParams) -> Result<Vec<Cluster>> {
    let config = params
        .validate(rows.len())
        .inspect_err(|e| tracing::warn!("Rejected blocking parameters: {}", e))?;
    let records = rows
        .iter()
        .enumerate()
        .map(|(row, fields)| Record::from_fields(row, fields.as_slice()))
        .collect::<Result<Vec<_>>>()
        .inspect_err(|e| tracing::warn!("Rejected blocking input: {}", e))?;
    let output = Blocker::new(config).run(&records)?;
    Ok(output.clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MergeStrategy, SimilarityMeasure, SortOrder};
    use crate::error::ErrorKind;
    use crate::record::RecordIdentity;

    fn identity(source: &str, id: &str) -> RecordIdentity {
        RecordIdentity::new(source, id)
    }

    #[test]
    fn test_block_single_source_yields_singletons() {
        let records = vec![
            Record::new("a", "1", "MSKAD98"),
            Record::new("a", "2", "MSKAD98"),
            Record::new("a", "3", "MSKAD97"),
        ];
        let clusters = block(&records, &BlockingParams::new("asc", 3_i64, "levenshtein")).unwrap();
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_block_rejects_window_larger_than_input() {
        let records = vec![Record::new("a", "1", "X")];
        let err = block(&records, &BlockingParams::new("asc", 3_i64, "dice")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWindowSize);
    }

    #[test]
    fn test_block_empty_input_rejected() {
        let err = block(&[], &BlockingParams::new("asc", 1_i64, "dice")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWindowSize);
    }

    #[test]
    fn test_block_table_shape_error() {
        let rows = vec![
            vec!["a", "1", "AAAA"],
            vec!["b", "1"],
            vec!["b", "2", "AAAB"],
        ];
        let err = block_table(&rows, &BlockingParams::new("asc", 3_i64, "hamming")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecordShape);
    }

    #[test]
    fn test_block_table_validates_params_before_shape() {
        let rows = vec![vec!["a", "1"]];
        let err = block_table(&rows, &BlockingParams::new("up", 1_i64, "dice")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSortOrder);
    }

    #[test]
    fn test_block_table_matches_block() {
        let rows = vec![
            vec!["a", "1", "AAAA"],
            vec!["b", "2", "AAAB"],
            vec!["c", "1", "BBBB"],
        ];
        let clusters = block_table(&rows, &BlockingParams::new("asc", 3_i64, "hamming")).unwrap();
        assert_eq!(
            clusters,
            vec![
                [identity("a", "1"), identity("b", "2")].into_iter().collect::<Cluster>(),
                Cluster::singleton(identity("c", "1")),
            ]
        );
    }

    #[test]
    fn test_blocker_run_reports_stats() {
        let records = vec![
            Record::new("a", "1", "AAAA"),
            Record::new("b", "2", "AAAB"),
            Record::new("c", "1", "BBBB"),
        ];
        let config = BlockingConfig::new(SortOrder::Ascending, 3, SimilarityMeasure::Hamming)
            .unwrap()
            .with_merge_strategy(MergeStrategy::SinglePass);
        let output = Blocker::new(config).run(&records).unwrap();
        assert_eq!(
            output.stats,
            BlockingStats {
                records: 3,
                comparisons: 4,
                matches: 2,
                candidate_clusters: 3,
                final_clusters: 2,
            }
        );
        assert_eq!(output.sorted[0].key, "AAAA");
    }

    #[test]
    fn test_blocker_run_rechecks_window() {
        let config = BlockingConfig::new(SortOrder::Ascending, 5, SimilarityMeasure::Dice).unwrap();
        let records = vec![Record::new("a", "1", "X"), Record::new("b", "1", "X")];
        assert!(Blocker::new(config).run(&records).is_err());
    }
}
