//! SQLite store: schema, uniqueness under concurrency, sequence, outbox.

use std::collections::HashSet;
use std::sync::Arc;

use courier_core::{
    AllocationError, DeliveryId, DeliveryRecord, DeliveryStore, IdSource, InsertOutcome, OrderId, OutboxEvent,
    OutboxStorage, SqliteStore, StoreError,
};
use serde_json::json;
use tempfile::TempDir;

async fn file_store(dir: &TempDir) -> SqliteStore {
    let url = format!("sqlite://{}", dir.path().join("courier.db").display());
    let store = SqliteStore::connect(&url, 4).await.unwrap();
    store.migrate().await.unwrap();
    store
}

fn created(id: DeliveryId, order_id: i64) -> (DeliveryRecord, OutboxEvent) {
    let record = DeliveryRecord::created(id, OrderId::new(order_id), "221B Baker Street");
    let event = OutboxEvent::new(
        "delivery.created",
        json!({ "deliveryId": id, "orderId": order_id }),
    );
    (record, event)
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    store.migrate().await.unwrap();
    store.migrate().await.unwrap();
    assert!(store.find_by_order(OrderId::new(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_order_reports_existing_delivery_and_keeps_one_outbox_row() {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    store.migrate().await.unwrap();

    let first = store.next_id().await.unwrap();
    let (record, event) = created(first, 42);
    assert_eq!(store.insert(&record, &event).await.unwrap(), InsertOutcome::Inserted);

    let second = store.next_id().await.unwrap();
    assert_ne!(first, second);
    let (record, event) = created(second, 42);
    assert_eq!(
        store.insert(&record, &event).await.unwrap(),
        InsertOutcome::Conflict { existing: first }
    );

    let stored = store.find_by_order(OrderId::new(42)).await.unwrap().unwrap();
    assert_eq!(stored.delivery_id, first);
    assert_eq!(stored.address, "221B Baker Street");

    let pending = store.fetch_pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].event_type, "delivery.created");
    assert_eq!(pending[0].payload["deliveryId"], json!(first.get()));
}

#[tokio::test]
async fn reused_delivery_id_is_a_store_error() {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    store.migrate().await.unwrap();
    let (record, event) = created(DeliveryId::new(5), 1);
    store.insert(&record, &event).await.unwrap();
    let (record, event) = created(DeliveryId::new(5), 2);
    let err = store.insert(&record, &event).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateDeliveryId(id) if id.get() == 5));
    assert!(store.find_by_order(OrderId::new(2)).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_for_one_order_yield_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(file_store(&dir).await);
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let id = store.next_id().await.unwrap();
            let (record, event) = created(id, 7);
            (id, store.insert(&record, &event).await.unwrap())
        }));
    }
    let mut winners = Vec::new();
    let mut conflicts = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            (id, InsertOutcome::Inserted) => winners.push(id),
            (_, InsertOutcome::Conflict { existing }) => conflicts.push(existing),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts.len(), 15);
    assert!(conflicts.iter().all(|existing| *existing == winners[0]));
    assert_eq!(store.fetch_pending(100).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sequence_never_repeats_under_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(file_store(&dir).await);
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..25 {
                ids.push(store.next_id().await.unwrap());
            }
            ids
        }));
    }
    let mut seen = HashSet::new();
    for task in tasks {
        for id in task.await.unwrap() {
            assert!(seen.insert(id), "duplicate id {}", id);
        }
    }
    assert_eq!(seen.len(), 200);
}

#[tokio::test]
async fn sequence_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let before = {
        let store = file_store(&dir).await;
        store.next_id().await.unwrap()
    };
    let store = file_store(&dir).await;
    let after = store.next_id().await.unwrap();
    assert!(after > before);
}

#[tokio::test]
async fn marked_messages_are_no_longer_pending() {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    store.migrate().await.unwrap();
    for order_id in 1..=3 {
        let id = store.next_id().await.unwrap();
        let (record, event) = created(id, order_id);
        store.insert(&record, &event).await.unwrap();
    }
    let pending = store.fetch_pending(2).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending[0].id < pending[1].id);

    store.mark_published(&[pending[0].id]).await.unwrap();
    let rest = store.fetch_pending(10).await.unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].id, pending[1].id);
}

#[tokio::test]
async fn sequence_reports_exhaustion_after_the_largest_id() {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    store.migrate().await.unwrap();
    store.next_id().await.unwrap();
    sqlx::query("UPDATE sqlite_sequence SET seq = ?1 WHERE name = 'delivery_ids'")
        .bind(i64::MAX - 1)
        .execute(store.pool())
        .await
        .unwrap();

    assert_eq!(store.next_id().await.unwrap(), DeliveryId::new(i64::MAX));
    assert!(matches!(store.next_id().await, Err(AllocationError::Exhausted)));
    assert!(matches!(store.next_id().await, Err(AllocationError::Exhausted)));
}
