use std::fmt;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::diff_snapshots;
use super::pair_waterfalls;
use super::ExemptionList;
use super::LogReporter;
use super::Reporter;
use super::Snapshot;
use crate::metrics::DETECTION_CYCLES;
use crate::metrics::WATERFALLS_EXEMPTED;
use crate::metrics::WATERFALLS_REPORTED;
use crate::CacheListener;
use crate::DetectorConfig;
use crate::QueryCache;
use crate::Result;
use crate::Subscription;

/// Start watching `cache` for waterfalls, reporting through the log.
///
/// The in-flight set at call time becomes the baseline: queries already
/// pending are not reported as having started. Watching stops when the
/// returned handle is unsubscribed or dropped.
pub fn watch_waterfalls<C: QueryCache>(
    cache: Arc<C>,
    config: DetectorConfig,
) -> Result<WatchHandle> {
    WaterfallDetector::new(cache, config).watch()
}

/// Builder for a waterfall watch on one cache.
pub struct WaterfallDetector<C: QueryCache> {
    cache: Arc<C>,
    config: DetectorConfig,
    reporter: Option<Arc<dyn Reporter>>,
}

impl<C: QueryCache> WaterfallDetector<C> {
    pub fn new(
        cache: Arc<C>,
        config: DetectorConfig,
    ) -> Self {
        Self {
            cache,
            config,
            reporter: None,
        }
    }

    /// Replace the default [`LogReporter`].
    pub fn with_reporter(
        mut self,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn watch(self) -> Result<WatchHandle> {
        self.config.validate()?;

        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(LogReporter::new(self.config.report.clone())));
        let previous = Arc::new(Mutex::new(Snapshot::capture(self.cache.as_ref())));

        let cycle = Arc::new(DetectionCycle {
            cache: Arc::downgrade(&self.cache),
            exemptions: ExemptionList::new(self.config.exemptions.clone()),
            reporter,
            previous: previous.clone(),
        });

        let listener: CacheListener = Arc::new(move || {
            cycle.run();
        });
        let subscription = self.cache.subscribe(listener);

        info!(
            exemptions = self.config.exemptions.len(),
            baseline = previous.lock().len(),
            "Watching query cache for waterfalls"
        );
        Ok(WatchHandle {
            subscription: Some(subscription),
            previous,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    CacheDropped,
    Unchanged,
    Changed { reported: usize, exempted: usize },
}

/// One detector's state: the previous snapshot and what it needs to
/// turn a change notification into a report.
///
/// The cache owns the listener that owns the cycle, so the cycle only
/// holds the cache weakly.
pub(crate) struct DetectionCycle<C: QueryCache> {
    pub(crate) cache: Weak<C>,
    pub(crate) exemptions: ExemptionList,
    pub(crate) reporter: Arc<dyn Reporter>,
    pub(crate) previous: Arc<Mutex<Snapshot>>,
}

impl<C: QueryCache> DetectionCycle<C> {
    /// snapshot -> diff -> pair -> filter -> report -> store snapshot
    ///
    /// Capture, diff and store happen under the `previous` lock, so cycles
    /// started from different threads run one after another.
    pub(crate) fn run(&self) -> CycleOutcome {
        let Some(cache) = self.cache.upgrade() else {
            debug!("Query cache dropped, skipping detection cycle");
            return CycleOutcome::CacheDropped;
        };
        let mut previous = self.previous.lock();
        let current = Snapshot::capture(cache.as_ref());

        let Some(diff) = diff_snapshots(&previous, &current) else {
            DETECTION_CYCLES.with_label_values(&["unchanged"]).inc();
            debug!(pending = current.len(), "In-flight set unchanged");
            return CycleOutcome::Unchanged;
        };
        DETECTION_CYCLES.with_label_values(&["changed"]).inc();
        debug!(
            started = diff.started.len(),
            finished = diff.finished.len(),
            "In-flight set changed"
        );

        let candidates = pair_waterfalls(&diff.finished, &diff.started);
        let (waterfalls, exempted) = self.exemptions.filter(cache.as_ref(), candidates);
        *previous = current;
        drop(previous);

        WATERFALLS_EXEMPTED.inc_by(exempted as u64);
        if !waterfalls.is_empty() {
            WATERFALLS_REPORTED.inc_by(waterfalls.len() as u64);
            self.reporter.report(&waterfalls);
        }
        CycleOutcome::Changed {
            reported: waterfalls.len(),
            exempted,
        }
    }
}

/// Live waterfall watch. Dropping it unsubscribes.
pub struct WatchHandle {
    subscription: Option<Subscription>,
    previous: Arc<Mutex<Snapshot>>,
}

impl WatchHandle {
    /// Stop watching.
    ///
    /// No new cycle starts once this returns. A cycle already running on
    /// another thread may still deliver its report.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// Keep watching for the lifetime of the cache.
    ///
    /// The detector does not keep the cache alive.
    pub fn detach(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
        }
    }

    /// Sorted hashes of the in-flight set the next cycle will diff against.
    pub fn pending_hashes(&self) -> Vec<String> {
        self.previous.lock().sorted_hashes()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            *self.previous.lock() = Snapshot::default();
            info!("Stopped watching query cache for waterfalls");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self.is_active())
            .field("pending", &self.previous.lock().len())
            .finish()
    }
}
