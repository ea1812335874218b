//! Outbox relay: publish once, keep pending on bus failure, recover.

use std::sync::Arc;
use std::time::Duration;

use courier_core::{
    ChannelBus, DeliveryRecord, DeliveryStore, IdSource, InMemoryStore, OrderId, OutboxEvent,
    OutboxRelay, OutboxStorage,
};
use serde_json::json;

async fn record_deliveries(store: &InMemoryStore, orders: std::ops::RangeInclusive<i64>) {
    for order_id in orders {
        let id = store.next_id().await.unwrap();
        let record = DeliveryRecord::created(id, OrderId::new(order_id), "Nevsky 1");
        let event = OutboxEvent::new("delivery.created", json!({ "orderId": order_id }));
        store.insert(&record, &event).await.unwrap();
    }
}

#[tokio::test]
async fn drain_publishes_each_message_once_in_order() {
    let store = Arc::new(InMemoryStore::new());
    record_deliveries(&store, 1..=5).await;
    let (bus, mut rx) = ChannelBus::new();
    let relay = OutboxRelay::new(store.clone(), Arc::new(bus)).batch_size(2);

    assert_eq!(relay.drain().await.unwrap(), 5);
    assert_eq!(relay.drain().await.unwrap(), 0);

    let mut orders = Vec::new();
    while let Ok(message) = rx.try_recv() {
        orders.push(message.payload["orderId"].as_i64().unwrap());
    }
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    assert!(store.fetch_pending(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn closed_bus_leaves_messages_pending_until_a_bus_accepts_them() {
    let store = Arc::new(InMemoryStore::new());
    record_deliveries(&store, 1..=2).await;

    let (closed, rx) = ChannelBus::new();
    drop(rx);
    let relay = OutboxRelay::new(store.clone(), Arc::new(closed));
    assert!(relay.drain().await.is_err());
    assert_eq!(store.fetch_pending(10).await.unwrap().len(), 2);

    let (bus, mut rx) = ChannelBus::new();
    let relay = OutboxRelay::new(store.clone(), Arc::new(bus));
    assert_eq!(relay.drain().await.unwrap(), 2);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn kick_wakes_a_running_relay() {
    let store = Arc::new(InMemoryStore::new());
    let (bus, mut rx) = ChannelBus::new();
    let relay = Arc::new(
        OutboxRelay::new(store.clone(), Arc::new(bus)).interval(Duration::from_secs(3600)),
    );
    let trigger = relay.trigger();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let running = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            relay
                .run(async {
                    let _ = stop_rx.await;
                })
                .await
        })
    };

    record_deliveries(&store, 1..=1).await;
    trigger.kick();
    let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message.payload["orderId"], json!(1));

    stop_tx.send(()).unwrap();
    running.await.unwrap();
}
