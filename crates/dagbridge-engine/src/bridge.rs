//! [`DagBridge`] — the query facade composing cache, store, and
//! ingestion pipeline.
//!
//! All state (cache, counters, the consumer task) is owned by the
//! bridge instance with explicit construction and shutdown; there are
//! no process-wide singletons. Read operations never escalate store
//! failures: absence is an explicit result and transient errors fall
//! back to "not seen", recorded on the failure counter.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dagbridge_store::{GraphStore, StoreError};
use dagbridge_types::{Epoch, Event, EventId};
use tracing::{debug, trace};

use crate::cache::{DEFAULT_CACHE_CAPACITY, EventCache};
use crate::error::BridgeError;
use crate::pipeline::{FailurePolicy, IngestionPipeline};

/// Default capacity of the bounded ingestion queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// How often the consumer emits a progress line at most.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(8);

/// Configuration for creating a [`DagBridge`].
pub struct BridgeConfig {
    /// Maximum number of pending ingestion tasks.
    pub queue_capacity: usize,
    /// Maximum number of cached event headers.
    pub cache_capacity: usize,
    /// Whether `save` waits for its task's commit to complete.
    pub synced: bool,
    /// Minimum time between ingestion progress lines.
    pub report_interval: Duration,
    /// Visibility of swallowed store failures.
    pub failure_policy: FailurePolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            synced: false,
            report_interval: DEFAULT_REPORT_INTERVAL,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// The ingestion-and-query bridge over a graph store.
pub struct DagBridge {
    store: Arc<dyn GraphStore>,
    cache: Arc<EventCache>,
    pipeline: IngestionPipeline,
    policy: FailurePolicy,
    transient_failures: Arc<AtomicU64>,
}

impl DagBridge {
    /// Bootstrap the store and spawn the ingestion consumer.
    ///
    /// Bootstrap failures are non-fatal: an already-prepared store
    /// rejecting its constraints again is the normal restart path.
    pub async fn new(store: Arc<dyn GraphStore>, config: BridgeConfig) -> Self {
        if let Err(e) = store.bootstrap().await {
            debug!(error = %e, "store bootstrap rejected, assuming already bootstrapped");
        }

        let cache = Arc::new(EventCache::new(config.cache_capacity));
        let transient_failures = Arc::new(AtomicU64::new(0));
        let pipeline = IngestionPipeline::spawn(
            Arc::clone(&store),
            Arc::clone(&cache),
            &config,
            Arc::clone(&transient_failures),
        );

        Self {
            store,
            cache,
            pipeline,
            policy: config.failure_policy,
            transient_failures,
        }
    }

    /// Accept one event for ingestion (see [`IngestionPipeline::save`]).
    ///
    /// The only surfaced error is calling after `close`; store
    /// failures during the commit are swallowed per policy.
    pub async fn save(&self, event: Event) -> Result<(), BridgeError> {
        self.pipeline.save(event).await
    }

    /// Whether the event is cached or present in the store.
    pub async fn has_event(&self, id: EventId) -> bool {
        if self.cache.contains(&id) {
            return true;
        }
        match self.store.has_event(id).await {
            Ok(found) => found,
            Err(e) => {
                self.note_failure(e);
                false
            }
        }
    }

    /// Fetch an event header, backfilling the cache on a store hit.
    ///
    /// Absence is `None`, never an error.
    pub async fn get_event(&self, id: EventId) -> Option<Event> {
        if let Some(event) = self.cache.get(&id) {
            return Some(event);
        }
        match self.store.get_event(id).await {
            Ok(Some(event)) => {
                self.cache.put(event.clone());
                Some(event)
            }
            Ok(None) => None,
            Err(e) => {
                self.note_failure(e);
                None
            }
        }
    }

    /// The distinct set of all ancestors of `id`, itself excluded.
    ///
    /// May be partial while some ancestors are still being ingested;
    /// callers tolerate eventual completeness.
    pub async fn find_ancestors(&self, id: EventId) -> HashSet<EventId> {
        match self.store.find_ancestors(id).await {
            Ok(ancestors) => ancestors.into_iter().collect(),
            Err(e) => {
                self.note_failure(e);
                HashSet::new()
            }
        }
    }

    /// The stored singleton epoch counter; 1 if it was never set.
    pub async fn get_epoch(&self) -> Epoch {
        match self.store.get_epoch().await {
            Ok(epoch) => epoch,
            Err(e) => {
                self.note_failure(e);
                Epoch::default()
            }
        }
    }

    /// Unconditionally overwrite the epoch counter. Monotonicity is
    /// the caller's responsibility.
    pub async fn set_epoch(&self, epoch: Epoch) {
        if let Err(e) = self.store.set_epoch(epoch).await {
            self.note_failure(e);
        }
    }

    /// Cumulative count of swallowed store failures (commit + query).
    pub fn transient_failures(&self) -> u64 {
        self.transient_failures.load(Ordering::Relaxed)
    }

    /// Return a reference to the store handle.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Return a reference to the event header cache.
    pub fn cache(&self) -> &Arc<EventCache> {
        &self.cache
    }

    /// Close the pipeline and wait for all queued tasks to commit.
    pub async fn close(self) {
        self.pipeline.close().await;
    }

    fn note_failure(&self, err: StoreError) {
        trace!(error = %err, "graph store non-critical error");
        self.transient_failures.fetch_add(1, Ordering::Relaxed);
        self.policy.observe(err);
    }
}
