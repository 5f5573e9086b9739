//! Edge cases: degenerate configs, eviction under load, the file
//! backend behind the bridge, and out-of-order arrivals.

use std::collections::HashSet;
use std::sync::Arc;

use dagbridge_store::{FileGraphStore, GraphStore};
use dagbridge_types::{Epoch, EventId};

use super::helpers::{event, memory_bridge, save_chain, synced_config};
use crate::bridge::{BridgeConfig, DagBridge};
use crate::config::BridgeSettings;

#[tokio::test]
async fn test_close_without_saves() {
    let (bridge, store) = memory_bridge(BridgeConfig::default()).await;
    bridge.close().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_zero_queue_capacity_clamped_not_panicking() {
    // A hand-built config can bypass the settings validation; the
    // pipeline clamps the buffer to one slot instead of panicking.
    let config = BridgeConfig {
        queue_capacity: 0,
        synced: true,
        ..Default::default()
    };
    let (bridge, store) = memory_bridge(config).await;
    let e = event(1, 1, vec![]);

    bridge.save(e.clone()).await.unwrap();
    assert!(store.has_event(e.id).await.unwrap());
    bridge.close().await;
}

#[tokio::test]
async fn test_zero_cache_capacity_still_serves_reads() {
    let config = BridgeConfig {
        cache_capacity: 0,
        synced: true,
        ..Default::default()
    };
    let (bridge, _store) = memory_bridge(config).await;
    let e = event(1, 1, vec![]);

    bridge.save(e.clone()).await.unwrap();
    // No cache to confirm from; the store answers.
    assert!(bridge.has_event(e.id).await);
    assert_eq!(bridge.get_event(e.id).await, Some(e));
}

#[tokio::test]
async fn test_eviction_does_not_lose_events() {
    let config = BridgeConfig {
        cache_capacity: 2,
        synced: true,
        ..Default::default()
    };
    let (bridge, _store) = memory_bridge(config).await;
    let chain = save_chain(&bridge, 1, 10).await;

    // The oldest events fell out of the tiny cache long ago; lookups
    // still find them in the store.
    let first = &chain[0];
    assert!(!bridge.cache().contains(&first.id));
    assert!(bridge.has_event(first.id).await);
    assert_eq!(bridge.get_event(first.id).await.as_ref(), Some(first));
}

#[tokio::test]
async fn test_event_with_many_parents() {
    let (bridge, _store) = memory_bridge(synced_config()).await;

    let mut parent_ids = Vec::new();
    for creator in 1..=8u32 {
        let p = event(creator, 1, vec![]);
        bridge.save(p.clone()).await.unwrap();
        parent_ids.push(p.id);
    }
    let merge = event(9, 1, parent_ids.clone());
    bridge.save(merge.clone()).await.unwrap();

    let ancestors = bridge.find_ancestors(merge.id).await;
    let expected: HashSet<EventId> = parent_ids.into_iter().collect();
    assert_eq!(ancestors, expected);
}

#[tokio::test]
async fn test_ghost_parent_keeps_save_ok() {
    let (bridge, store) = memory_bridge(synced_config()).await;
    let ghost = EventId::from_data(b"not yet arrived");
    let e = event(1, 1, vec![ghost]);

    // The missing parent is reported inside the pipeline, never to
    // the producer. The header itself is committed.
    bridge.save(e.clone()).await.unwrap();
    assert!(store.has_event(e.id).await.unwrap());
    assert_eq!(bridge.transient_failures(), 1);
}

#[tokio::test]
async fn test_file_backend_behind_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileGraphStore::new(dir.path()).unwrap());
    let bridge = DagBridge::new(store, synced_config()).await;

    let a = event(1, 1, vec![]);
    let b = event(1, 2, vec![a.id]);
    bridge.save(a.clone()).await.unwrap();
    bridge.save(b.clone()).await.unwrap();
    bridge.set_epoch(Epoch(4)).await;

    assert_eq!(
        bridge.find_ancestors(b.id).await,
        [a.id].into_iter().collect()
    );
    bridge.close().await;

    // Reopen over the same directory; everything persisted.
    let reopened: Arc<dyn GraphStore> = Arc::new(FileGraphStore::new(dir.path()).unwrap());
    let bridge = DagBridge::new(reopened, synced_config()).await;
    assert!(bridge.has_event(a.id).await);
    assert_eq!(bridge.get_event(b.id).await, Some(b));
    assert_eq!(bridge.get_epoch().await, Epoch(4));
}

#[tokio::test]
async fn test_settings_driven_construction() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        r#"
[ingest]
synced = true

[store]
backend = "file"
data_dir = "{}"
"#,
        dir.path().display()
    );
    let settings = BridgeSettings::from_toml(&toml).unwrap();
    let store = settings.open_store().unwrap();
    let bridge = DagBridge::new(store, settings.bridge_config().unwrap()).await;

    let e = event(1, 1, vec![]);
    bridge.save(e.clone()).await.unwrap();
    assert_eq!(bridge.get_event(e.id).await, Some(e));
}
