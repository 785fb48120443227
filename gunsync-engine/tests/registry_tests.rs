use gunsync_crypto::{encrypt, KeyResolver, RecordKey, StaticKeyResolver};
use gunsync_engine::index::mock::MockIndex;
use gunsync_engine::store::mock::MockGraphStore;
use gunsync_engine::{SyncConfig, SyncEngine, SyncError};
use serde_json::{json, Value};
use std::sync::Arc;

fn record_of_type(record_type: &str) -> Value {
    json!({
        "oip": {
            "ver": "0.8.0",
            "recordType": record_type,
            "creator": { "publicKey": "k", "didAddress": "did:arweave:x" },
        },
        "data": { "basic": {} },
    })
}

fn engine_with(store: Arc<MockGraphStore>) -> SyncEngine {
    let keys: Arc<dyn KeyResolver> = Arc::new(StaticKeyResolver::new());
    SyncEngine::new(
        store,
        Arc::new(MockIndex::new()),
        keys,
        SyncConfig::default(),
    )
}

#[tokio::test]
async fn stats_group_souls_by_record_type() {
    let store = Arc::new(MockGraphStore::new());
    store.put("s1", record_of_type("post"));
    store.put("s2", record_of_type("post"));
    store.put("s3", record_of_type("image"));
    let wire = encrypt(&RecordKey::random(), &json!({ "data": { "basic": {} } }))
        .unwrap()
        .to_wire("owner-pk");
    store.put("s4", wire);

    let engine = engine_with(store);
    let registry = engine.registry();
    let stats = registry.stats().await.unwrap();

    assert_eq!(stats.total_souls, 4);
    assert_eq!(stats.by_record_type.get("post"), Some(&2));
    assert_eq!(stats.by_record_type.get("image"), Some(&1));
    assert_eq!(stats.by_record_type.get("encrypted"), Some(&1));
    assert_eq!(&stats.node_id, engine.node_id());
}

#[tokio::test]
async fn stats_surface_store_unavailability() {
    let store = Arc::new(MockGraphStore::new());
    store.set_unavailable(true);

    let engine = engine_with(store);
    // Callers degrade gracefully on this instead of crashing.
    assert!(matches!(
        engine.registry().stats().await,
        Err(SyncError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn each_engine_gets_its_own_identity() {
    let a = engine_with(Arc::new(MockGraphStore::new()));
    let b = engine_with(Arc::new(MockGraphStore::new()));
    assert_ne!(a.node_id(), b.node_id());
}
