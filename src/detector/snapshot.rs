use std::collections::HashSet;
use std::sync::Arc;

use crate::Query;
use crate::QueryCache;

/// The set of in-flight queries observed at one instant.
///
/// Hashes are unique within a snapshot; the cache keeps one entry per hash.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    queries: Vec<Arc<Query>>,
}

impl Snapshot {
    /// Read every in-flight query from `cache`, in cache iteration order.
    pub fn capture<C: QueryCache + ?Sized>(cache: &C) -> Self {
        Self {
            queries: cache.find_all(&|query: &Query| query.is_in_flight()),
        }
    }

    pub fn from_queries(queries: Vec<Arc<Query>>) -> Self {
        Self { queries }
    }

    pub fn queries(&self) -> &[Arc<Query>] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn contains(
        &self,
        hash: &str,
    ) -> bool {
        self.queries.iter().any(|q| q.hash() == hash)
    }

    pub fn sorted_hashes(&self) -> Vec<String> {
        let mut hashes: Vec<String> = self.queries.iter().map(|q| q.hash().to_string()).collect();
        hashes.sort_unstable();
        hashes
    }

    /// Canonical serialization of the snapshot: its sorted hash list.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.sorted_hashes()).unwrap_or_default()
    }

    /// Queries present here but absent, by hash, from `other`.
    fn difference(
        &self,
        other: &Snapshot,
    ) -> Vec<Arc<Query>> {
        let other_hashes: HashSet<&str> = other.queries.iter().map(|q| q.hash()).collect();
        self.queries
            .iter()
            .filter(|q| !other_hashes.contains(q.hash()))
            .cloned()
            .collect()
    }
}

/// Net change of the in-flight set between two snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    /// In flight now, not before
    pub started: Vec<Arc<Query>>,
    /// In flight before, not now
    pub finished: Vec<Arc<Query>>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.finished.is_empty()
    }
}

/// Compare two snapshots by query hash.
///
/// Returns `None` when the in-flight sets are identical. The sorted-hash
/// fingerprints are compared first, so the per-query diff is only built for
/// snapshots that actually differ.
pub fn diff_snapshots(
    previous: &Snapshot,
    current: &Snapshot,
) -> Option<SnapshotDiff> {
    if previous.fingerprint() == current.fingerprint() {
        return None;
    }

    let diff = SnapshotDiff {
        started: current.difference(previous),
        finished: previous.difference(current),
    };
    (!diff.is_empty()).then_some(diff)
}
