//! Blocking parameters and their validation.
//!
//! `BlockingParams` holds parameters as a caller supplies them (strings and a
//! loosely typed window size, possibly loaded from TOML or JSON).
//! `BlockingParams::validate` checks them against the record count and yields a
//! typed `BlockingConfig`, the only form the pipeline accepts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlockingError, Result, WindowSizeProblem};

/// Direction of the sort stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl FromStr for SortOrder {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(BlockingError::InvalidSortOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "asc"),
            SortOrder::Descending => write!(f, "desc"),
        }
    }
}

/// String similarity used to decide whether two keys match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    Dice,
    Hamming,
    Jaccard,
    #[serde(alias = "jaro winkler", alias = "jaro-winkler")]
    JaroWinkler,
    Levenshtein,
}

impl SimilarityMeasure {
    pub const ALL: [SimilarityMeasure; 5] = [
        SimilarityMeasure::Dice,
        SimilarityMeasure::Hamming,
        SimilarityMeasure::Jaccard,
        SimilarityMeasure::JaroWinkler,
        SimilarityMeasure::Levenshtein,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMeasure::Dice => "dice",
            SimilarityMeasure::Hamming => "hamming",
            SimilarityMeasure::Jaccard => "jaccard",
            SimilarityMeasure::JaroWinkler => "jaro_winkler",
            SimilarityMeasure::Levenshtein => "levenshtein",
        }
    }
}

impl FromStr for SimilarityMeasure {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dice" => Ok(SimilarityMeasure::Dice),
            "hamming" => Ok(SimilarityMeasure::Hamming),
            "jaccard" => Ok(SimilarityMeasure::Jaccard),
            "jaro_winkler" | "jaro winkler" | "jaro-winkler" => Ok(SimilarityMeasure::JaroWinkler),
            "levenshtein" => Ok(SimilarityMeasure::Levenshtein),
            _ => Err(BlockingError::InvalidSimilarityMeasure(s.to_string())),
        }
    }
}

impl std::fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How overlapping candidate clusters are coalesced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Union-find over record identities; full transitive closure
    #[default]
    DisjointSet,
    /// One left-to-right sweep; may leave overlapping clusters behind
    SinglePass,
}

/// Window size as supplied by a caller or parameter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowSizeInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl WindowSizeInput {
    /// Integer value, if the input holds one.
    ///
    /// Text is accepted when it parses as an integer; floats never are.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            WindowSizeInput::Integer(n) => Some(*n),
            WindowSizeInput::Float(_) => None,
            WindowSizeInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for WindowSizeInput {
    fn from(n: i64) -> Self {
        WindowSizeInput::Integer(n)
    }
}

impl From<usize> for WindowSizeInput {
    fn from(n: usize) -> Self {
        i64::try_from(n)
            .map(WindowSizeInput::Integer)
            .unwrap_or_else(|_| WindowSizeInput::Text(n.to_string()))
    }
}

impl From<&str> for WindowSizeInput {
    fn from(s: &str) -> Self {
        WindowSizeInput::Text(s.to_string())
    }
}

impl std::fmt::Display for WindowSizeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowSizeInput::Integer(n) => write!(f, "{}", n),
            WindowSizeInput::Float(x) => write!(f, "{}", x),
            WindowSizeInput::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Unvalidated blocking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingParams {
    pub sorting_order: String,
    pub window_size: WindowSizeInput,
    pub similarity_measure: String,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl BlockingParams {
    pub fn new(
        sorting_order: impl Into<String>,
        window_size: impl Into<WindowSizeInput>,
        similarity_measure: impl Into<String>,
    ) -> Self {
        Self {
            sorting_order: sorting_order.into(),
            window_size: window_size.into(),
            similarity_measure: similarity_measure.into(),
            merge_strategy: MergeStrategy::default(),
        }
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Load parameters from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load parameters from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Check every selector against a table of `record_count` records.
    ///
    /// Checks run in a fixed order (sort order, window size, similarity
    /// measure) and the first failure is returned.
    pub fn validate(&self, record_count: usize) -> Result<BlockingConfig> {
        let sorting_order: SortOrder = self.sorting_order.parse()?;

        let window_error = |reason| BlockingError::InvalidWindowSize {
            value: self.window_size.to_string(),
            record_count,
            reason,
        };
        let window = self
            .window_size
            .as_integer()
            .ok_or_else(|| window_error(WindowSizeProblem::NotAnInteger))?;
        let window_size = check_window_size(window, record_count).map_err(window_error)?;

        let similarity_measure: SimilarityMeasure = self.similarity_measure.parse()?;

        Ok(BlockingConfig {
            sorting_order,
            window_size,
            similarity_measure,
            merge_strategy: self.merge_strategy,
        })
    }
}

fn check_window_size(window: i64, record_count: usize) -> std::result::Result<usize, WindowSizeProblem> {
    if window <= 0 {
        return Err(WindowSizeProblem::NotPositive);
    }
    if window % 2 == 0 {
        return Err(WindowSizeProblem::Even);
    }
    let window = usize::try_from(window).map_err(|_| WindowSizeProblem::LargerThanInput)?;
    if window > record_count {
        return Err(WindowSizeProblem::LargerThanInput);
    }
    Ok(window)
}

/// Validated blocking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingConfig {
    pub sorting_order: SortOrder,
    /// Positive odd number of positions in the comparison window
    pub window_size: usize,
    pub similarity_measure: SimilarityMeasure,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl BlockingConfig {
    /// Build a config directly from typed selectors.
    ///
    /// The window bound against the input size is checked later by
    /// [`BlockingConfig::ensure_fits`].
    pub fn new(
        sorting_order: SortOrder,
        window_size: usize,
        similarity_measure: SimilarityMeasure,
    ) -> Result<Self> {
        let config = Self {
            sorting_order,
            window_size,
            similarity_measure,
            merge_strategy: MergeStrategy::default(),
        };
        config.ensure_fits(usize::MAX)?;
        Ok(config)
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Number of positions compared on each side of the anchor
    pub fn offset(&self) -> usize {
        self.window_size / 2
    }

    /// Re-check the window against a concrete record count
    pub fn ensure_fits(&self, record_count: usize) -> Result<()> {
        i64::try_from(self.window_size)
            .map_err(|_| WindowSizeProblem::LargerThanInput)
            .and_then(|window| check_window_size(window, record_count))
            .map(|_| ())
            .map_err(|reason| BlockingError::InvalidWindowSize {
                value: self.window_size.to_string(),
                record_count,
                reason,
            })
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a validated configuration back from JSON
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.ensure_fits(usize::MAX)?;
        Ok(config)
    }
}
