//! Basic save/lookup behaviour of the bridge facade.

use dagbridge_store::GraphStore;
use dagbridge_types::{Epoch, EventId};

use super::helpers::{event, memory_bridge, slow_bridge, synced_config};
use crate::bridge::BridgeConfig;

#[tokio::test]
async fn test_sync_save_then_get_roundtrip() {
    let (bridge, _store) = memory_bridge(synced_config()).await;
    let e = event(1, 1, vec![]);

    bridge.save(e.clone()).await.unwrap();
    assert_eq!(bridge.get_event(e.id).await, Some(e));
}

#[tokio::test]
async fn test_sync_save_commits_before_returning() {
    let (bridge, store) = memory_bridge(synced_config()).await;
    let e = event(1, 1, vec![]);

    bridge.save(e.clone()).await.unwrap();
    // Synchronous mode: the store itself has it, not just the cache.
    assert!(store.has_event(e.id).await.unwrap());
}

#[tokio::test]
async fn test_async_save_visible_before_commit() {
    // 50 ms per commit, so right after save the write is still in
    // flight. The cache must already confirm the event.
    let (bridge, inner) = slow_bridge(50, BridgeConfig::default()).await;
    let e = event(1, 1, vec![]);

    bridge.save(e.clone()).await.unwrap();
    assert!(bridge.has_event(e.id).await);
    assert_eq!(bridge.get_event(e.id).await, Some(e.clone()));

    bridge.close().await;
    assert!(inner.has_event(e.id).await.unwrap());
}

#[tokio::test]
async fn test_get_unknown_event_returns_none() {
    let (bridge, _store) = memory_bridge(synced_config()).await;
    let id = EventId::from_data(b"never saved");

    assert!(!bridge.has_event(id).await);
    assert_eq!(bridge.get_event(id).await, None);
}

#[tokio::test]
async fn test_get_event_backfills_cache() {
    let (bridge, store) = memory_bridge(synced_config()).await;
    let e = event(1, 1, vec![]);

    // Written behind the bridge's back, so the cache has no entry.
    store.put_event(&e).await.unwrap();
    assert!(!bridge.cache().contains(&e.id));

    assert_eq!(bridge.get_event(e.id).await, Some(e.clone()));
    assert!(bridge.cache().contains(&e.id));
}

#[tokio::test]
async fn test_epoch_defaults_to_one() {
    let (bridge, _store) = memory_bridge(synced_config()).await;
    assert_eq!(bridge.get_epoch().await, Epoch(1));
}

#[tokio::test]
async fn test_epoch_set_then_get() {
    let (bridge, _store) = memory_bridge(synced_config()).await;

    bridge.set_epoch(Epoch(5)).await;
    assert_eq!(bridge.get_epoch().await, Epoch(5));
}

#[tokio::test]
async fn test_parents_survive_roundtrip() {
    let (bridge, _store) = memory_bridge(synced_config()).await;
    let a = event(1, 1, vec![]);
    let b = event(1, 2, vec![a.id]);

    bridge.save(a.clone()).await.unwrap();
    bridge.save(b.clone()).await.unwrap();

    let got = bridge.get_event(b.id).await.unwrap();
    assert_eq!(got.parents, vec![a.id]);
}
