use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::CacheListener;
use super::NotifyManager;
use super::QueryCache;
use super::Subscription;
use crate::Query;
use crate::QueryKey;
use crate::QueryStatus;

/// In-memory query cache
///
/// Entries are kept in insertion order, one per key hash. Every mutation
/// schedules a notification through the cache's [`NotifyManager`], so
/// mutations wrapped in [`MemoryQueryCache::batch`] reach listeners as a
/// single change.
#[derive(Debug)]
pub struct MemoryQueryCache {
    queries: RwLock<Vec<Arc<Query>>>,
    notify: Arc<NotifyManager>,
}

impl Default for MemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self {
            queries: RwLock::new(Vec::new()),
            notify: NotifyManager::new(),
        }
    }

    /// Insert the query for `key`, or move the existing entry to `status`.
    pub fn set_status(
        &self,
        key: QueryKey,
        status: QueryStatus,
    ) -> Arc<Query> {
        let query = {
            let mut queries = self.queries.write();
            let hash = key.hash();
            match queries.iter().position(|q| q.hash() == hash) {
                Some(pos) => {
                    let updated = Arc::new(queries[pos].with_status(status));
                    queries[pos] = updated.clone();
                    updated
                }
                None => {
                    let created = Arc::new(Query::new(key, status));
                    queries.push(created.clone());
                    created
                }
            }
        };
        trace!(hash = query.hash(), %status, "Query updated");
        self.notify.schedule();
        query
    }

    /// Remove the entry for `key`. Returns the removed query, if any.
    pub fn remove(
        &self,
        key: &QueryKey,
    ) -> Option<Arc<Query>> {
        let removed = {
            let mut queries = self.queries.write();
            let hash = key.hash();
            queries
                .iter()
                .position(|q| q.hash() == hash)
                .map(|pos| queries.remove(pos))
        };
        if removed.is_some() {
            self.notify.schedule();
        }
        removed
    }

    pub fn clear(&self) {
        let cleared = {
            let mut queries = self.queries.write();
            let had_entries = !queries.is_empty();
            queries.clear();
            had_entries
        };
        if cleared {
            self.notify.schedule();
        }
    }

    pub fn get(
        &self,
        key: &QueryKey,
    ) -> Option<Arc<Query>> {
        let hash = key.hash();
        self.queries.read().iter().find(|q| q.hash() == hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.queries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.read().is_empty()
    }

    /// Apply several mutations as one change.
    pub fn batch<R>(
        &self,
        f: impl FnOnce(&Self) -> R,
    ) -> R {
        self.notify.batch(|| f(self))
    }

    pub fn listener_count(&self) -> usize {
        self.notify.listener_count()
    }
}

impl QueryCache for MemoryQueryCache {
    fn find_all(
        &self,
        predicate: &dyn Fn(&Query) -> bool,
    ) -> Vec<Arc<Query>> {
        self.queries
            .read()
            .iter()
            .filter(|q| predicate(q))
            .cloned()
            .collect()
    }

    fn subscribe(
        &self,
        listener: CacheListener,
    ) -> Subscription {
        self.notify.subscribe(listener)
    }
}
