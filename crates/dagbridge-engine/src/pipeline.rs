//! Bounded ingestion pipeline: producers enqueue events, one consumer
//! commits them to the graph store in enqueue order.
//!
//! The queue is the only serialization point. Producers block when it
//! is full (backpressure, bounded memory regardless of producer
//! speed); the consumer blocks when it is empty. Closing the pipeline
//! drains every queued task to completion before the consumer exits.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dagbridge_store::{GraphStore, StoreError};
use dagbridge_types::{Event, EventId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::bridge::BridgeConfig;
use crate::cache::EventCache;
use crate::error::BridgeError;
use crate::rate::{DEFAULT_WINDOW_SECS, RateTracker, ReportGate};

/// What the consumer does with a store failure it has swallowed.
///
/// Failures are never retried and never escalate to the producer;
/// the policy only controls their visibility beyond the trace log.
#[derive(Clone, Default)]
pub enum FailurePolicy {
    /// Log at trace level and move on.
    #[default]
    Swallow,
    /// Log, and forward each failure on this channel so an external
    /// monitor can alert on them.
    Report(mpsc::UnboundedSender<StoreError>),
}

impl FailurePolicy {
    pub(crate) fn observe(&self, err: StoreError) {
        if let Self::Report(tx) = self {
            // A dropped receiver degrades to Swallow.
            let _ = tx.send(err);
        }
    }
}

/// One unit of ingestion work: an event plus an optional one-shot
/// completion signal releasing a synchronous producer.
struct IngestTask {
    event: Event,
    done: Option<oneshot::Sender<()>>,
}

/// The bounded task queue and its single consumer.
pub struct IngestionPipeline {
    tx: mpsc::Sender<IngestTask>,
    consumer: JoinHandle<()>,
    synced: bool,
    cache: Arc<EventCache>,
}

impl IngestionPipeline {
    /// Spawn the consumer task and return the producer handle.
    pub fn spawn(
        store: Arc<dyn GraphStore>,
        cache: Arc<EventCache>,
        config: &BridgeConfig,
        failures: Arc<AtomicU64>,
    ) -> Self {
        // The bounded channel requires a positive buffer.
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let consumer = tokio::spawn(run_consumer(
            store,
            Arc::clone(&cache),
            rx,
            config.failure_policy.clone(),
            failures,
            config.report_interval,
        ));
        Self {
            tx,
            consumer,
            synced: config.synced,
            cache,
        }
    }

    /// Accept one event for ingestion.
    ///
    /// Returns once the event is enqueued (async mode) or fully
    /// committed and cache-refreshed (synchronous mode). Blocks while
    /// the queue is at capacity. The cache is updated before the task
    /// is enqueued, so `has_event` confirms the save immediately.
    pub async fn save(&self, event: Event) -> Result<(), BridgeError> {
        self.cache.put(event.clone());

        let (done, wait) = if self.synced {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        self.tx
            .send(IngestTask { event, done })
            .await
            .map_err(|_| BridgeError::PipelineClosed)?;

        if let Some(rx) = wait {
            // The consumer drops the sender only when draining after
            // close; treat that like a completed task.
            let _ = rx.await;
        }

        Ok(())
    }

    /// Whether producers wait for their task's commit.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Close the queue and wait for the consumer to drain it.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.consumer.await {
            warn!(error = %e, "ingestion consumer did not exit cleanly");
        }
    }
}

async fn run_consumer(
    store: Arc<dyn GraphStore>,
    cache: Arc<EventCache>,
    mut rx: mpsc::Receiver<IngestTask>,
    policy: FailurePolicy,
    failures: Arc<AtomicU64>,
    report_interval: Duration,
) {
    let start = Instant::now();
    let tracker = RateTracker::new(DEFAULT_WINDOW_SECS);
    let mut last: Option<EventId> = None;
    let mut gate = ReportGate::new(report_interval);

    debug!("ingestion consumer started");

    while let Some(task) = rx.recv().await {
        match store.put_event(&task.event).await {
            Ok(()) => {}
            Err(e) if e.is_non_fatal() => {
                trace!(event = %task.event.id, error = %e, "store rejected event, non-critical");
                failures.fetch_add(1, Ordering::Relaxed);
                policy.observe(e);
            }
            Err(e) => {
                trace!(event = %task.event.id, error = %e, "store commit failed, continuing");
                failures.fetch_add(1, Ordering::Relaxed);
                policy.observe(e);
            }
        }

        cache.put(task.event.clone());

        if let Some(done) = task.done {
            let _ = done.send(());
        }

        tracker.inc();
        last = Some(task.event.id);

        if gate.due() {
            info!(
                last = %task.event.id,
                rate = format!("{:.1}/s", tracker.rate()),
                total = tracker.total(),
                elapsed = ?start.elapsed(),
                "ingestion progress"
            );
        }
    }

    // Queue closed and drained; emit the whole-run summary.
    let elapsed = start.elapsed();
    let total = tracker.total();
    let run_rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    info!(
        last = %last.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        rate = format!("{run_rate:.1}/s"),
        total,
        elapsed = ?elapsed,
        "ingestion finished"
    );
}
