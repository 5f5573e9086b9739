//! Concurrent producer/reader tests against a shared bridge.

use std::sync::Arc;

use super::helpers::{event, memory_bridge, synced_config};

#[tokio::test]
async fn test_concurrent_producers_all_committed() {
    let (bridge, store) = memory_bridge(synced_config()).await;
    let bridge = Arc::new(bridge);

    let mut handles = Vec::new();
    for creator in 1..=10u32 {
        let b = Arc::clone(&bridge);
        handles.push(tokio::spawn(async move {
            for seq in 1..=10u32 {
                b.save(event(creator, seq, vec![])).await.unwrap();
            }
        }));
    }

    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(store.len(), 100);
    for creator in 1..=10u32 {
        for seq in 1..=10u32 {
            let e = event(creator, seq, vec![]);
            assert!(bridge.has_event(e.id).await, "missing {creator}/{seq}");
        }
    }
}

#[tokio::test]
async fn test_concurrent_reads_during_writes() {
    let (bridge, _store) = memory_bridge(synced_config()).await;
    let bridge = Arc::new(bridge);

    // Pre-populate a chain the readers can query.
    let a = event(1, 1, vec![]);
    let b = event(1, 2, vec![a.id]);
    bridge.save(a.clone()).await.unwrap();
    bridge.save(b.clone()).await.unwrap();

    let writer = {
        let br = Arc::clone(&bridge);
        tokio::spawn(async move {
            for seq in 3..=30u32 {
                br.save(event(1, seq, vec![])).await.unwrap();
            }
        })
    };

    let reader = {
        let br = Arc::clone(&bridge);
        let (a_id, b_id) = (a.id, b.id);
        tokio::spawn(async move {
            for _ in 0..30 {
                assert_eq!(br.get_event(b_id).await.map(|e| e.id), Some(b_id));
                let ancestors = br.find_ancestors(b_id).await;
                assert!(ancestors.contains(&a_id));
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test]
async fn test_concurrent_duplicate_producers_converge() {
    // Two producers racing to save the same events: exactly one copy
    // of each lands, the rest are swallowed as duplicates.
    let (bridge, store) = memory_bridge(synced_config()).await;
    let bridge = Arc::new(bridge);

    let mut handles = Vec::new();
    for _ in 0..2 {
        let b = Arc::clone(&bridge);
        handles.push(tokio::spawn(async move {
            for seq in 1..=20u32 {
                b.save(event(7, seq, vec![])).await.unwrap();
            }
        }));
    }

    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(store.len(), 20);
    assert_eq!(bridge.transient_failures(), 20);
}
