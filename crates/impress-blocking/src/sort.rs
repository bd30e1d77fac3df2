//! Sort stage

use crate::config::SortOrder;
use crate::record::Record;

/// Order records by key, byte-lexicographically.
///
/// The sort is stable in both directions: records with equal keys keep their
/// input order, so repeated runs over the same input produce the same windows.
pub fn sort_records(records: &[Record], order: SortOrder) -> Vec<&Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::Descending => sorted.sort_by(|a, b| b.key.cmp(&a.key)),
    }
    sorted
}
