//! A [`GraphStore`] wrapper that adds configurable random IO latency.
//!
//! `SlowGraphStore` wraps any `Arc<dyn GraphStore>` and sleeps for a
//! random duration before each read or write operation. The RNG is
//! seeded for deterministic, reproducible behaviour across test runs.
//!
//! # Example
//!
//! ```ignore
//! let slow = SlowGraphStore::new(inner)
//!     .read_latency(5, 20)    // 5–20 ms per read
//!     .write_latency(10, 30)  // 10–30 ms per write
//!     .seed(42);
//! ```

use std::sync::{Arc, Mutex};

use dagbridge_types::{Epoch, Event, EventId};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::StoreError;
use crate::traits::GraphStore;

/// A [`GraphStore`] wrapper that injects random latency before IO.
///
/// Useful for surfacing backpressure, ordering, and drain behaviour
/// that an instant in-memory store never exercises.
pub struct SlowGraphStore {
    inner: Arc<dyn GraphStore>,
    read_latency_ms: (u64, u64),
    write_latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
}

impl SlowGraphStore {
    /// Wrap an existing store with zero latency (pass-through) by default.
    pub fn new(inner: Arc<dyn GraphStore>) -> Self {
        Self {
            inner,
            read_latency_ms: (0, 0),
            write_latency_ms: (0, 0),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Set the read latency range in milliseconds (uniform random).
    pub fn read_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.read_latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the write latency range in milliseconds (uniform random).
    pub fn write_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.write_latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the RNG seed for deterministic behaviour.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Sleep for a random duration in `[min, max]` milliseconds.
    async fn delay(&self, range: (u64, u64)) {
        let (min, max) = range;

        if max == 0 {
            return;
        }

        let ms = if min == max {
            min
        } else {
            self.rng.lock().expect("rng lock poisoned").gen_range(min..=max)
        };

        if ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait::async_trait]
impl GraphStore for SlowGraphStore {
    async fn bootstrap(&self) -> Result<(), StoreError> {
        self.inner.bootstrap().await
    }

    async fn put_event(&self, event: &Event) -> Result<(), StoreError> {
        self.delay(self.write_latency_ms).await;
        self.inner.put_event(event).await
    }

    async fn has_event(&self, id: EventId) -> Result<bool, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.inner.has_event(id).await
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.inner.get_event(id).await
    }

    async fn find_ancestors(&self, id: EventId) -> Result<Vec<EventId>, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.inner.find_ancestors(id).await
    }

    async fn get_epoch(&self) -> Result<Epoch, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.inner.get_epoch().await
    }

    async fn set_epoch(&self, epoch: Epoch) -> Result<(), StoreError> {
        self.delay(self.write_latency_ms).await;
        self.inner.set_epoch(epoch).await
    }
}
