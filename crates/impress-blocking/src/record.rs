//! Record model and source tagging.
//!
//! Upstream tables arrive as `(id, key)` rows per source. Tagging each row with
//! its source label yields the uniform `(source, id, key)` records the
//! blocking pipeline consumes.

use serde::{Deserialize, Serialize};

use crate::error::{BlockingError, Result};

/// A record taking part in blocking.
///
/// Immutable once built; the pipeline only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Label of the table the record came from
    pub source: String,
    /// Identifier, unique within `source`
    pub id: String,
    /// Sorting / comparison key
    pub key: String,
}

impl Record {
    pub fn new(source: impl Into<String>, id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
            key: key.into(),
        }
    }

    /// Build a record from an untyped `[source, id, key]` row.
    ///
    /// `row` is the row's position in its table, used only for error reporting.
    pub fn from_fields<S: AsRef<str>>(row: usize, fields: &[S]) -> Result<Self> {
        match fields {
            [source, id, key] => Ok(Self::new(source.as_ref(), id.as_ref(), key.as_ref())),
            _ => Err(BlockingError::InvalidRecordShape {
                row,
                fields: fields.len(),
                expected: "exactly 3 ([source, id, key])",
            }),
        }
    }

    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity {
            source: self.source.clone(),
            id: self.id.clone(),
        }
    }

    /// Whether two records originate from the same source table
    pub fn same_source(&self, other: &Record) -> bool {
        self.source == other.source
    }
}

/// Identity of a record: `(source, id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordIdentity {
    pub source: String,
    pub id: String,
}

impl RecordIdentity {
    pub fn new(source: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.source, self.id)
    }
}

/// Tag `(id, key)` rows with their source label.
pub fn normalize<I, K>(source: &str, rows: impl IntoIterator<Item = (I, K)>) -> Vec<Record>
where
    I: Into<String>,
    K: Into<String>,
{
    rows.into_iter()
        .map(|(id, key)| Record::new(source, id, key))
        .collect()
}

/// Tag untyped rows with their source label.
///
/// The first column is the id and the second the key; further columns are
/// ignored. Rows with fewer than two columns are rejected.
pub fn normalize_fields<S: AsRef<str>>(source: &str, rows: &[Vec<S>]) -> Result<Vec<Record>> {
    rows.iter()
        .enumerate()
        .map(|(row, fields)| match fields.as_slice() {
            [id, key, ..] => Ok(Record::new(source, id.as_ref(), key.as_ref())),
            _ => Err(BlockingError::InvalidRecordShape {
                row,
                fields: fields.len(),
                expected: "at least 2 ([id, key, ...])",
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_tags_every_row() {
        let records = normalize("abt", vec![(1.to_string(), "SONY TV"), (2.to_string(), "LG TV")]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.source == "abt"));
        assert_eq!(records[1], Record::new("abt", "2", "LG TV"));
    }

    #[test]
    fn test_normalize_fields_ignores_extra_columns() {
        let rows = vec![
            vec!["10", "MSKAD98", "ignored"],
            vec!["11", "MSKAD97"],
        ];
        let records = normalize_fields("buy", &rows).unwrap();
        assert_eq!(records[0], Record::new("buy", "10", "MSKAD98"));
        assert_eq!(records[1].key, "MSKAD97");
    }

    #[test]
    fn test_normalize_fields_rejects_short_row() {
        let rows = vec![vec!["10", "MSKAD98"], vec!["11"]];
        let err = normalize_fields("buy", &rows).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecordShape);
        assert!(err.to_string().starts_with("Row 1 has 1 field(s)"));
    }

    #[test]
    fn test_from_fields_requires_three() {
        assert!(Record::from_fields(0, &["a", "1", "KEY"]).is_ok());
        assert!(Record::from_fields(0, &["a", "1"]).is_err());
        assert!(Record::from_fields(0, &["a", "1", "KEY", "extra"]).is_err());
    }

    #[test]
    fn test_identity_display() {
        let record = Record::new("a", "7", "AAAA");
        assert_eq!(record.identity().to_string(), "(a, 7)");
        assert!(record.same_source(&Record::new("a", "8", "BBBB")));
    }
}
