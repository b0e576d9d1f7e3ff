use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::trace;

use super::CacheListener;
use super::Subscription;

#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    dirty: bool,
}

/// Batched change notification.
///
/// Mutations call [`NotifyManager::schedule`]. Outside a batch listeners run
/// immediately. Inside [`NotifyManager::batch`] the notification is deferred
/// and delivered once when the outermost batch returns, however many
/// mutations it contained.
///
/// Listeners are invoked without any internal lock held, so a listener may
/// read the cache or drop its own subscription.
pub struct NotifyManager {
    listeners: RwLock<BTreeMap<u64, CacheListener>>,
    next_id: AtomicU64,
    batch: Mutex<BatchState>,
}

impl std::fmt::Debug for NotifyManager {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NotifyManager")
            .field("listeners", &self.listeners.read().len())
            .field("batch", &*self.batch.lock())
            .finish()
    }
}

impl NotifyManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listeners: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            batch: Mutex::new(BatchState::default()),
        })
    }

    pub fn subscribe(
        self: &Arc<Self>,
        listener: CacheListener,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, listener);
        trace!(listener_id = id, "Cache listener registered");

        let manager: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(manager) = manager.upgrade() {
                manager.listeners.write().remove(&id);
                trace!(listener_id = id, "Cache listener unregistered");
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Run `f` as one batch. Batches nest; only the outermost one flushes.
    ///
    /// If `f` panics the batch is still closed. Its deferred notification is
    /// dropped rather than delivered while unwinding; listeners see those
    /// mutations with the next notification.
    pub fn batch<R>(
        &self,
        f: impl FnOnce() -> R,
    ) -> R {
        self.batch.lock().depth += 1;
        let _guard = BatchGuard { manager: self };
        f()
    }

    /// Record that the cache changed.
    pub fn schedule(&self) {
        {
            let mut state = self.batch.lock();
            if state.depth > 0 {
                state.dirty = true;
                return;
            }
        }
        self.flush();
    }

    fn flush(&self) {
        let listeners: Vec<CacheListener> = self.listeners.read().values().cloned().collect();
        trace!(listeners = listeners.len(), "Flushing cache notification");
        for listener in listeners {
            listener();
        }
    }
}

/// Closes one batch level when dropped, flushing at the outermost level.
struct BatchGuard<'a> {
    manager: &'a NotifyManager,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let flush = {
            let mut state = self.manager.batch.lock();
            state.depth -= 1;
            if state.depth == 0 && state.dirty {
                state.dirty = false;
                true
            } else {
                false
            }
        };
        if !flush {
            return;
        }
        if std::thread::panicking() {
            trace!("Batch aborted by panic, notification dropped");
            return;
        }
        self.manager.flush();
    }
}
