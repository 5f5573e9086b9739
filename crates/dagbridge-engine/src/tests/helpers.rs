//! Shared test utilities for dagbridge-engine tests.

use std::sync::Arc;

use dagbridge_store::{GraphStore, MemoryGraphStore, SlowGraphStore};
use dagbridge_types::{Creator, Epoch, Event, EventId};

use crate::bridge::{BridgeConfig, DagBridge};

/// Build a deterministic test event. The ID is derived from the
/// fields, so distinct (creator, seq) pairs give distinct events.
pub fn event(creator: u32, seq: u32, parents: Vec<EventId>) -> Event {
    Event::new(Creator(creator), Epoch(1), seq, 0, seq, parents)
}

/// Config with synchronous saves and otherwise default settings.
pub fn synced_config() -> BridgeConfig {
    BridgeConfig {
        synced: true,
        ..Default::default()
    }
}

/// Create a bridge over a fresh in-memory store, returning both so
/// tests can inspect the store directly.
pub async fn memory_bridge(config: BridgeConfig) -> (DagBridge, Arc<MemoryGraphStore>) {
    let store = Arc::new(MemoryGraphStore::new());
    let bridge = DagBridge::new(Arc::clone(&store) as Arc<dyn GraphStore>, config).await;
    (bridge, store)
}

/// Create a bridge whose store sleeps `write_ms` before each commit.
/// The returned store handle is the inner (instant) one, so tests can
/// observe what has actually been committed.
pub async fn slow_bridge(write_ms: u64, config: BridgeConfig) -> (DagBridge, Arc<MemoryGraphStore>) {
    let inner = Arc::new(MemoryGraphStore::new());
    let slow = SlowGraphStore::new(Arc::clone(&inner) as Arc<dyn GraphStore>)
        .write_latency(write_ms, write_ms)
        .seed(7);
    let bridge = DagBridge::new(Arc::new(slow) as Arc<dyn GraphStore>, config).await;
    (bridge, inner)
}

/// Save a chain e1 <- e2 <- ... <- eN synchronously and return it.
pub async fn save_chain(bridge: &DagBridge, creator: u32, len: u32) -> Vec<Event> {
    let mut chain: Vec<Event> = Vec::with_capacity(len as usize);
    for seq in 1..=len {
        let parents = chain.last().map(|e| vec![e.id]).unwrap_or_default();
        let e = event(creator, seq, parents);
        bridge.save(e.clone()).await.unwrap();
        chain.push(e);
    }
    chain
}
