use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::QueryKey;

/// Lifecycle status of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Pending,
    Success,
    Error,
    /// Spelling of [`QueryStatus::Pending`] used by caches predating the
    /// `pending` status. Kept so both generations are recognised as in flight.
    Loading,
}

impl QueryStatus {
    /// Compatibility shim: both `pending` and the legacy `loading` status mean
    /// the query is currently fetching.
    pub fn is_in_flight(self) -> bool {
        matches!(self, QueryStatus::Pending | QueryStatus::Loading)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Idle => "idle",
            QueryStatus::Pending => "pending",
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
            QueryStatus::Loading => "loading",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single trackable fetch unit as seen by the detector.
///
/// Queries are owned by the cache. The detector only holds shared
/// references for the duration of a cycle and between two cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    key: QueryKey,
    hash: String,
    status: QueryStatus,
}

impl Query {
    pub fn new(
        key: QueryKey,
        status: QueryStatus,
    ) -> Self {
        let hash = key.hash();
        Self { key, hash, status }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    /// Copy of this query with a different status; key and hash are kept.
    pub fn with_status(
        &self,
        status: QueryStatus,
    ) -> Self {
        Self {
            key: self.key.clone(),
            hash: self.hash.clone(),
            status,
        }
    }
}
