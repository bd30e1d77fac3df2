//! Error types for impress-blocking

use thiserror::Error;

/// Result type alias for blocking operations
pub type Result<T> = std::result::Result<T, BlockingError>;

/// Input validation failures.
///
/// Every variant is raised before or during the sort stage; once a run gets
/// past sorting it cannot fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockingError {
    /// Sorting order is not one of `asc` / `desc`
    #[error("Sorting order must be 'asc' or 'desc', got '{0}'")]
    InvalidSortOrder(String),

    /// Window size is not a positive odd integer within the record count
    #[error("Invalid window size '{value}' for {record_count} records: {reason}")]
    InvalidWindowSize {
        value: String,
        record_count: usize,
        reason: WindowSizeProblem,
    },

    /// Similarity measure is not one of the supported names
    #[error(
        "Similarity measure must be one of dice, hamming, jaccard, jaro_winkler, levenshtein; got '{0}'"
    )]
    InvalidSimilarityMeasure(String),

    /// A row does not have the `[source, id, key]` shape
    #[error("Row {row} has {fields} field(s), expected {expected}")]
    InvalidRecordShape {
        row: usize,
        fields: usize,
        expected: &'static str,
    },

    /// A parameter file could not be decoded
    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

/// Why a window size was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSizeProblem {
    NotAnInteger,
    NotPositive,
    Even,
    LargerThanInput,
}

impl std::fmt::Display for WindowSizeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowSizeProblem::NotAnInteger => write!(f, "must be an integer number"),
            WindowSizeProblem::NotPositive => write!(f, "must be positive"),
            WindowSizeProblem::Even => write!(f, "must be an odd number"),
            WindowSizeProblem::LargerThanInput => write!(f, "greater than the table size"),
        }
    }
}

/// Fieldless error discriminant for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSortOrder,
    InvalidWindowSize,
    InvalidSimilarityMeasure,
    InvalidRecordShape,
    ConfigParse,
}

impl BlockingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockingError::InvalidSortOrder(_) => ErrorKind::InvalidSortOrder,
            BlockingError::InvalidWindowSize { .. } => ErrorKind::InvalidWindowSize,
            BlockingError::InvalidSimilarityMeasure(_) => ErrorKind::InvalidSimilarityMeasure,
            BlockingError::InvalidRecordShape { .. } => ErrorKind::InvalidRecordShape,
            BlockingError::ConfigParse(_) => ErrorKind::ConfigParse,
        }
    }
}

impl From<toml::de::Error> for BlockingError {
    fn from(err: toml::de::Error) -> Self {
        BlockingError::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for BlockingError {
    fn from(err: serde_json::Error) -> Self {
        BlockingError::ConfigParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_message() {
        let err = BlockingError::InvalidWindowSize {
            value: "4".to_string(),
            record_count: 10,
            reason: WindowSizeProblem::Even,
        };
        assert_eq!(
            err.to_string(),
            "Invalid window size '4' for 10 records: must be an odd number"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidWindowSize);
    }

    #[test]
    fn test_toml_error_converts_to_config_parse() {
        let err: BlockingError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::ConfigParse);
    }
}
