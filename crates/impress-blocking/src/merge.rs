//! Cluster model and cluster merging.
//!
//! Candidate clusters overlap freely: a record usually shows up in its own
//! cluster and in those of the neighbours that matched it. Merging coalesces
//! overlapping clusters so each record ends up in one final cluster.
//!
//! Two strategies are available:
//!
//! - [`MergeStrategy::DisjointSet`] unions record identities in a disjoint-set
//!   forest. The result is the transitive closure of "shares a record", so the
//!   final clusters are pairwise disjoint and merging them again changes
//!   nothing.
//! - [`MergeStrategy::SinglePass`] sweeps the list once, folding every later
//!   cluster that intersects cluster `i` into it. A cluster skipped before `i`
//!   grew is never revisited, so a chain bridged by an earlier cluster can
//!   leave overlapping clusters behind.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::MergeStrategy;
use crate::record::RecordIdentity;

/// A set of record identities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cluster {
    members: BTreeSet<RecordIdentity>,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster holding only `identity`
    pub fn singleton(identity: RecordIdentity) -> Self {
        let mut cluster = Self::new();
        cluster.insert(identity);
        cluster
    }

    /// Returns `true` if `identity` was not already present
    pub fn insert(&mut self, identity: RecordIdentity) -> bool {
        self.members.insert(identity)
    }

    pub fn contains(&self, identity: &RecordIdentity) -> bool {
        self.members.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordIdentity> {
        self.members.iter()
    }

    pub fn intersects(&self, other: &Cluster) -> bool {
        // Walk the smaller set
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|identity| large.contains(identity))
    }

    /// Move every member of `other` into this cluster
    pub fn absorb(&mut self, other: Cluster) {
        self.members.extend(other.members);
    }
}

impl FromIterator<RecordIdentity> for Cluster {
    fn from_iter<T: IntoIterator<Item = RecordIdentity>>(iter: T) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Cluster {
    type Item = RecordIdentity;
    type IntoIter = std::collections::btree_set::IntoIter<RecordIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cluster {
    type Item = &'a RecordIdentity;
    type IntoIter = std::collections::btree_set::Iter<'a, RecordIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, identity) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", identity)?;
        }
        write!(f, "}}")
    }
}

/// Coalesce overlapping clusters with the given strategy
pub fn merge_clusters(clusters: Vec<Cluster>, strategy: MergeStrategy) -> Vec<Cluster> {
    let before = clusters.len();
    let merged = match strategy {
        MergeStrategy::DisjointSet => disjoint_set_merge(clusters),
        MergeStrategy::SinglePass => single_pass_merge(clusters),
    };
    tracing::debug!(
        "Merged {} candidate clusters into {} ({:?})",
        before,
        merged.len(),
        strategy
    );
    merged
}

/// One left-to-right sweep, folding later intersecting clusters into earlier ones.
///
/// For each surviving cluster `i`, every cluster `j > i` that intersects it is
/// absorbed into `i` and removed; the scan over `j` continues from the same
/// index since the list has compacted.
pub fn single_pass_merge(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    let mut i = 0;
    while i < clusters.len() {
        let mut j = i + 1;
        while j < clusters.len() {
            if clusters[i].intersects(&clusters[j]) {
                let absorbed = clusters.remove(j);
                clusters[i].absorb(absorbed);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
    clusters
}

/// Transitive closure of overlapping clusters via union-find.
///
/// Final clusters are ordered by the first appearance of their earliest-seen
/// identity in the input.
pub fn disjoint_set_merge(clusters: Vec<Cluster>) -> Vec<Cluster> {
    let mut index: HashMap<RecordIdentity, usize> = HashMap::new();
    let mut identities: Vec<RecordIdentity> = Vec::new();
    let mut sets = DisjointSet::new();

    for cluster in clusters {
        let mut first: Option<usize> = None;
        for identity in cluster {
            let idx = match index.get(&identity) {
                Some(&idx) => idx,
                None => {
                    let idx = sets.make_set();
                    index.insert(identity.clone(), idx);
                    identities.push(identity);
                    idx
                }
            };
            match first {
                Some(head) => {
                    sets.union(head, idx);
                }
                None => first = Some(idx),
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut merged: Vec<Cluster> = Vec::new();
    for (idx, identity) in identities.into_iter().enumerate() {
        let root = sets.find(idx);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            merged.push(Cluster::new());
            merged.len() - 1
        });
        merged[slot].insert(identity);
    }
    merged
}

/// Disjoint-set forest over dense indices with path compression and union by size
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forest of `n` singleton sets `0..n`
    pub fn with_len(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Add a new singleton set and return its index
    pub fn make_set(&mut self) -> usize {
        let idx = self.parent.len();
        self.parent.push(idx);
        self.size.push(1);
        idx
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Join the sets containing `a` and `b`; returns `false` if already joined
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    /// Number of elements in the set containing `x`
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RecordIdentity {
        let (source, id) = s.split_at(1);
        RecordIdentity::new(source, id)
    }

    fn cluster(members: &[&str]) -> Cluster {
        members.iter().map(|m| id(m)).collect()
    }

    #[test]
    fn test_cluster_intersects() {
        assert!(cluster(&["a1", "b1"]).intersects(&cluster(&["b1", "c1", "c2"])));
        assert!(!cluster(&["a1"]).intersects(&cluster(&["a2"])));
        assert!(!Cluster::new().intersects(&cluster(&["a1"])));
    }

    #[test]
    fn test_cluster_display() {
        assert_eq!(cluster(&["b1", "a1"]).to_string(), "{(a, 1), (b, 1)}");
        assert_eq!(Cluster::new().to_string(), "{}");
    }

    #[test]
    fn test_cluster_serializes_as_list() {
        let json = serde_json::to_string(&cluster(&["a1"])).unwrap();
        assert_eq!(json, r#"[{"source":"a","id":"1"}]"#);
    }

    #[test]
    fn test_disjoint_set_union_and_find() {
        let mut sets = DisjointSet::with_len(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(3, 4));
        assert!(!sets.union(1, 0));
        assert!(sets.union(1, 4));
        assert_eq!(sets.find(0), sets.find(3));
        assert_ne!(sets.find(0), sets.find(2));
        assert_eq!(sets.set_size(4), 4);
        assert_eq!(sets.set_size(2), 1);
    }

    #[test]
    fn test_single_pass_folds_chain() {
        let merged = single_pass_merge(vec![
            cluster(&["a1", "b1"]),
            cluster(&["b1", "a1"]),
            cluster(&["c1"]),
            cluster(&["b1", "c2"]),
        ]);
        assert_eq!(merged, vec![cluster(&["a1", "b1", "c2"]), cluster(&["c1"])]);
    }

    #[test]
    fn test_single_pass_misses_late_bridge() {
        // {a1} only meets {b1,c1} through {a1,b1}, which is folded in after
        // {b1,c1} was already passed over.
        let merged = single_pass_merge(vec![
            cluster(&["a1"]),
            cluster(&["b1", "c1"]),
            cluster(&["a1", "b1"]),
        ]);
        assert_eq!(merged, vec![cluster(&["a1", "b1"]), cluster(&["b1", "c1"])]);

        let again = single_pass_merge(merged);
        assert_eq!(again, vec![cluster(&["a1", "b1", "c1"])]);
    }

    #[test]
    fn test_disjoint_set_closes_late_bridge() {
        let merged = disjoint_set_merge(vec![
            cluster(&["a1"]),
            cluster(&["b1", "c1"]),
            cluster(&["a1", "b1"]),
        ]);
        assert_eq!(merged, vec![cluster(&["a1", "b1", "c1"])]);
    }

    #[test]
    fn test_disjoint_set_orders_by_first_appearance() {
        let merged = disjoint_set_merge(vec![
            cluster(&["c1"]),
            cluster(&["a2", "b2"]),
            cluster(&["a1"]),
            cluster(&["b2", "c1"]),
        ]);
        assert_eq!(
            merged,
            vec![cluster(&["a2", "b2", "c1"]), cluster(&["a1"])]
        );
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_clusters(Vec::new(), MergeStrategy::DisjointSet).is_empty());
        assert!(merge_clusters(Vec::new(), MergeStrategy::SinglePass).is_empty());
    }
}
