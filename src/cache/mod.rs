//! Query cache collaborator.
//!
//! The detector never stores, fetches or retries anything itself. It needs
//! three things from the cache that owns the queries:
//!
//! 1. a query over all cached entries ([`QueryCache::find_all`]);
//! 2. structured key matching ([`QueryCache::matches`]);
//! 3. change notifications ([`QueryCache::subscribe`]).
//!
//! # Coalescing contract
//!
//! A listener registered through [`QueryCache::subscribe`] must observe a
//! settled cache. When several mutations happen inside one batch, the
//! listener runs exactly once, after the outermost batch has finished.
//! The detector relies on this to never report a half-applied state or the
//! same transition twice. [`NotifyManager`] implements the contract and can
//! be reused by any cache implementation.

mod memory;
mod notify;


use std::fmt;
use std::sync::Arc;

pub use memory::*;
pub use notify::*;

use crate::partial_match_key;
use crate::Query;
use crate::QueryKey;

/// Zero-argument callback invoked after one or more cache mutations.
pub type CacheListener = Arc<dyn Fn() + Send + Sync>;

pub trait QueryCache: Send + Sync + 'static {
    /// All cached queries accepted by `predicate`, in cache iteration order.
    fn find_all(
        &self,
        predicate: &dyn Fn(&Query) -> bool,
    ) -> Vec<Arc<Query>>;

    /// Structured match of `pattern` against `key`.
    ///
    /// Caches with their own key semantics may override this.
    fn matches(
        &self,
        pattern: &QueryKey,
        key: &QueryKey,
    ) -> bool {
        partial_match_key(key, pattern)
    }

    /// Register `listener` for coalesced change notifications.
    fn subscribe(
        &self,
        listener: CacheListener,
    ) -> Subscription;
}

/// Handle to a registered cache listener.
///
/// The listener stays registered until the subscription is unsubscribed or
/// dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Stop delivery and release the cache's reference to the listener.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the listener registered for the lifetime of the cache.
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
