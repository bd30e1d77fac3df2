//! Record and cluster builders shared by the integration tests

use impress_blocking::{normalize, Cluster, Record, RecordIdentity};

/// Build records from `(source, id, key)` triples
pub fn records(rows: &[(&str, &str, &str)]) -> Vec<Record> {
    rows.iter()
        .map(|(source, id, key)| Record::new(*source, *id, *key))
        .collect()
}

/// Build a cluster from `(source, id)` pairs
pub fn cluster(members: &[(&str, &str)]) -> Cluster {
    members
        .iter()
        .map(|(source, id)| RecordIdentity::new(*source, *id))
        .collect()
}

/// Twenty single-source records with clustered keys
#[allow(dead_code)]
pub fn single_source_table() -> Vec<Record> {
    let keys = [
        "MSKAD98", "MSKAD98", "MSKAD97", "MSCSC97", "DDMCO91", "DDMCO98", "DRMCO97", "RSHCO98",
        "MTRSC99", "MRRAD00", "RTRCH94", "RTRCH96", "ATRAD94", "DMSCO91", "DMSCO91", "DMSCO93",
        "DMSCG94", "RTRCH95", "RTRCH99", "RTRCH00",
    ];
    normalize(
        "a",
        keys.iter()
            .enumerate()
            .map(|(i, key)| ((i + 1).to_string(), *key)),
    )
}

/// Two sources whose near-duplicate keys interleave after sorting
#[allow(dead_code)]
pub fn two_source_table() -> Vec<Record> {
    records(&[
        ("a", "1", "MSKAD98"),
        ("b", "1", "MSKAD97"),
        ("a", "2", "RTRCH94"),
        ("b", "2", "RTRCH95"),
        ("b", "3", "ZZZZZZZ"),
    ])
}
