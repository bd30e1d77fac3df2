//! impress-blocking: Sorted neighbourhood blocking for multi-source record linkage.
//!
//! Blocking narrows an all-pairs duplicate search down to small candidate
//! groups before any expensive matching runs. Records from several source
//! tables are tagged with their source, sorted by a key, and each record is
//! compared only with the records around it in sort order. Neighbours from a
//! different source whose keys are similar enough join the record's candidate
//! cluster, and overlapping candidate clusters are then merged.
//!
//! # Pipeline
//!
//! 1. [`normalize`]: tag `(id, key)` rows with a source label
//! 2. [`BlockingParams::validate`]: check sort order, window size, and measure
//! 3. [`sort_records`]: stable sort by key
//! 4. [`candidate_clusters`]: one candidate cluster per sorted position
//! 5. [`merge_clusters`]: coalesce overlapping candidates
//!
//! # Example
//!
//! ```
//! use impress_blocking::{block, normalize, BlockingParams};
//!
//! let mut records = normalize("abt", vec![("1", "MSKAD98"), ("2", "RTRCH94")]);
//! records.extend(normalize("buy", vec![("7", "MSKAD97")]));
//!
//! let params = BlockingParams::new("asc", 3_i64, "levenshtein");
//! let clusters = block(&records, &params).unwrap();
//! assert_eq!(clusters.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod similarity;
pub mod sort;
pub mod window;

pub use config::{
    BlockingConfig, BlockingParams, MergeStrategy, SimilarityMeasure, SortOrder, WindowSizeInput,
};
pub use error::{BlockingError, ErrorKind, Result, WindowSizeProblem};
pub use merge::{disjoint_set_merge, merge_clusters, single_pass_merge, Cluster, DisjointSet};
pub use pipeline::{block, block_table, Blocker, BlockingOutput, BlockingStats};
pub use record::{normalize, normalize_fields, Record, RecordIdentity};
pub use similarity::{
    DefaultSimilarityEngine, QgramTokenizer, SimilarityEngine, MATCH_THRESHOLD, QGRAM_SIZE,
};
pub use sort::sort_records;
pub use window::{candidate_clusters, CandidateCluster, WindowStats};
