//! End-to-end client behaviour against the in-memory store

mod common;

use common::*;
use kds_client::prelude::*;
use kds_client::{client::MARK_READY_FAILED, FEED_ERROR_MESSAGE};
use rust_decimal_macros::dec;
use std::sync::Arc;

async fn connect(store: &MemoryStore, builder: KitchenClientBuilder) -> (KitchenClient, EventReceiver) {
    let mut client = builder.connect(Arc::new(store.clone())).await.unwrap();
    let events = client.events().unwrap();
    (client, events)
}

fn is_updated(event: &DisplayEvent) -> bool {
    matches!(event, DisplayEvent::Feed(FeedEvent::Updated { .. }))
}

// ============================================================================
// Alarm
// ============================================================================

#[tokio::test]
async fn test_first_snapshot_is_baseline() {
    let store = seeded_store(&[("a", pending_order(0))]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;

    let event = expect_event(&mut events, is_updated).await;
    assert!(matches!(
        event,
        DisplayEvent::Feed(FeedEvent::Updated { pending: 1, completed: 0, baseline: true })
    ));
    assert!(!client.is_alarm_active());

    store.insert(ORDERS, "b", pending_order(5)).unwrap();
    let event = expect_event(&mut events, |e| matches!(e, DisplayEvent::Alarm(_))).await;
    match event {
        DisplayEvent::Alarm(AlarmEvent::Raised { order, new_pending }) => {
            assert_eq!(order.id, "b");
            assert_eq!(new_pending, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(client.is_alarm_active());

    let acked = client.acknowledge_alarm().unwrap();
    assert_eq!(acked.id, "b");
    assert!(!client.is_alarm_active());
    assert!(client.acknowledge_alarm().is_none());
}

#[tokio::test]
async fn test_legacy_policy_alarms_on_first_snapshot() {
    let store = seeded_store(&[("a", pending_order(0)), ("b", pending_order(1))]);
    let builder = KitchenClient::builder()
        .without_store_gate()
        .with_baseline_policy(BaselinePolicy::CompareAgainstEmpty);
    let (client, mut events) = connect(&store, builder).await;

    let event = expect_event(&mut events, |e| matches!(e, DisplayEvent::Alarm(_))).await;
    match event {
        DisplayEvent::Alarm(AlarmEvent::Raised { order, new_pending }) => {
            // last new pending in feed order
            assert_eq!(order.id, "b");
            assert_eq!(new_pending, 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        client.with_board(|b| b.surfaced().map(|o| o.id.clone())),
        Some("b".to_string())
    );
}

#[tokio::test]
async fn test_active_alarm_is_not_restarted() {
    let store = seeded_store(&[]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    expect_event(&mut events, is_updated).await;

    store.insert(ORDERS, "a", pending_order(0)).unwrap();
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Alarm(_))).await;

    store.insert(ORDERS, "b", pending_order(1)).unwrap();
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Feed(FeedEvent::Updated { pending: 2, .. }))
    })
    .await;

    assert!(drain(&mut events)
        .iter()
        .all(|e| !matches!(e, DisplayEvent::Alarm(AlarmEvent::Raised { .. }))));
    assert_eq!(client.with_board(|b| b.surfaced().map(|o| o.id.clone())), Some("a".into()));
}

// ============================================================================
// Mark ready
// ============================================================================

#[tokio::test]
async fn test_mark_ready_moves_order_on_next_snapshot() {
    let store = seeded_store(&[("a", pending_order(0)), ("r", ready_order(0, "Tarjeta"))]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    expect_event(&mut events, is_updated).await;

    client.mark_ready("a").await.unwrap();
    expect_event(&mut events, |e| matches!(e, DisplayEvent::OrderReady { .. })).await;
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Feed(FeedEvent::Updated { pending: 0, completed: 2, .. }))
    })
    .await;

    let stored = store.get(ORDERS, "a").unwrap();
    assert_eq!(stored["status"], "2");
    assert!(stored.contains_key("fechaListo"));

    client.with_board(|board| {
        let order = board.orders().iter().find(|o| o.id == "a").unwrap();
        assert_eq!(order.status, OrderStatus::Ready);
        assert!(order.ready_at.is_some());
        // 2 x 80 + 30 + 20 shipping
        assert_eq!(order.revenue(), dec!(210));
    });
}

#[tokio::test]
async fn test_mark_ready_failure_keeps_local_state() {
    let store = seeded_store(&[("a", pending_order(0))]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    expect_event(&mut events, is_updated).await;

    store.fail_writes(Some(FeedError::WriteRejected("offline".into())));
    let err = client.mark_ready("a").await.unwrap_err();
    assert!(matches!(err, ClientError::Feed(FeedError::WriteRejected(_))));

    let event = expect_event(&mut events, |e| matches!(e, DisplayEvent::Notice { .. })).await;
    assert!(matches!(event, DisplayEvent::Notice { message } if message == MARK_READY_FAILED));
    assert_eq!(client.with_board(|b| b.pending().len()), 1);
    assert_eq!(client.take_notice().as_deref(), Some(MARK_READY_FAILED));
    assert!(client.take_notice().is_none());
    assert_eq!(store.get(ORDERS, "a").unwrap()["status"], "1");
}

#[tokio::test]
async fn test_mark_ready_unknown_order() {
    let store = seeded_store(&[]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    expect_event(&mut events, is_updated).await;

    let err = client.mark_ready("ghost").await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownOrder { id } if id == "ghost"));
    assert_eq!(store.write_count(), 0);
}

// ============================================================================
// Feed errors
// ============================================================================

#[tokio::test]
async fn test_feed_error_freezes_then_recovers() {
    let store = seeded_store(&[("a", pending_order(0))]);
    let (client, mut events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    expect_event(&mut events, is_updated).await;

    store.push_error(ORDERS, FeedError::Connection("reset".into()));
    let event = expect_event(&mut events, |e| matches!(e, DisplayEvent::Feed(FeedEvent::Failed { .. }))).await;
    assert!(matches!(
        event,
        DisplayEvent::Feed(FeedEvent::Failed { message, .. }) if message == FEED_ERROR_MESSAGE
    ));
    client.with_board(|b| {
        assert_eq!(b.feed_error(), Some(FEED_ERROR_MESSAGE));
        assert_eq!(b.feed_state(), FeedState::Stale);
        assert_eq!(b.pending().len(), 1);
    });

    store.insert(ORDERS, "b", ready_order(3, "Efectivo")).unwrap();
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Feed(FeedEvent::Recovered))).await;
    assert!(client.with_board(|b| b.feed_error().is_none()));
}

// ============================================================================
// Store gate
// ============================================================================

#[tokio::test]
async fn test_missing_gate_is_created_open() {
    let store = seeded_store(&[]);
    let (client, mut events) = connect(&store, KitchenClient::builder()).await;

    expect_event(&mut events, |e| matches!(e, DisplayEvent::Gate(GateEvent::Created))).await;
    assert_eq!(client.store_status(), StoreStatus::Open);

    let gate = store.get("config", "tienda").unwrap();
    assert_eq!(gate["estadoTienda"], true);
    assert!(gate.contains_key("updatedAt"));
}

#[tokio::test]
async fn test_close_and_reopen_store() {
    let store = seeded_store(&[]);
    store
        .insert("config", "tienda", serde_json::json!({"estadoTienda": true}))
        .unwrap();
    let (client, mut events) = connect(&store, KitchenClient::builder()).await;
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { status: StoreStatus::Open }))
    })
    .await;

    client.set_store_open(false).await.unwrap();
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { status: StoreStatus::Closed }))
    })
    .await;
    assert!(!client.store_gate().is_open());

    client.set_store_open(true).await.unwrap();
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { status: StoreStatus::Open }))
    })
    .await;
}

#[tokio::test]
async fn test_non_boolean_gate_reads_open() {
    let store = seeded_store(&[]);
    store
        .insert("config", "tienda", serde_json::json!({"estadoTienda": "cerrada"}))
        .unwrap();
    let (client, mut events) = connect(&store, KitchenClient::builder()).await;
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { .. }))).await;
    assert_eq!(client.store_status(), StoreStatus::Open);
}

#[tokio::test]
async fn test_gate_error_falls_back_to_open() {
    let store = seeded_store(&[]);
    store
        .insert("config", "tienda", serde_json::json!({"estadoTienda": false}))
        .unwrap();
    let (client, mut events) = connect(&store, KitchenClient::builder()).await;
    expect_event(&mut events, |e| {
        matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { status: StoreStatus::Closed }))
    })
    .await;

    store.push_error("config", FeedError::Timeout(std::time::Duration::from_secs(10)));
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Gate(GateEvent::ReadFailed { .. }))).await;

    let gate = client.store_gate();
    assert_eq!(gate.status(), StoreStatus::Open);
    assert_eq!(gate.error(), Some("No se pudo leer el estado de la tienda."));
}

#[tokio::test]
async fn test_close_store_failure_queues_notice() {
    let store = seeded_store(&[]);
    store.fail_writes(Some(FeedError::WriteRejected("denied".into())));
    let (client, mut events) = connect(&store, KitchenClient::builder()).await;
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Gate(GateEvent::StatusChanged { .. }))).await;

    let err = client.set_store_open(false).await.unwrap_err();
    assert!(matches!(err, ClientError::Feed(_)));
    assert_eq!(client.take_notice().as_deref(), Some("No se pudo cerrar la tienda."));
}

#[tokio::test]
async fn test_gate_disabled() {
    let store = seeded_store(&[]);
    let (client, _events) = connect(&store, KitchenClient::builder().without_store_gate()).await;
    assert_eq!(client.store_status(), StoreStatus::Open);
    assert!(matches!(
        client.set_store_open(false).await,
        Err(ClientError::GateDisabled)
    ));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_shutdown_silences_alarm() {
    let store = seeded_store(&[("a", pending_order(0))]);
    let builder = KitchenClient::builder()
        .without_store_gate()
        .with_baseline_policy(BaselinePolicy::CompareAgainstEmpty);
    let (client, mut events) = connect(&store, builder).await;
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Alarm(_))).await;

    client.shutdown();
    assert!(client.is_shut_down());
    assert!(!client.is_alarm_active());
    expect_event(&mut events, |e| matches!(e, DisplayEvent::Shutdown)).await;

    assert!(matches!(client.mark_ready("a").await, Err(ClientError::ShutDown)));
    // working set survives teardown
    assert_eq!(client.with_board(|b| b.orders().len()), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let store = MemoryStore::new();
    let result = KitchenClient::builder()
        .with_orders_collection("")
        .connect(Arc::new(store))
        .await;
    assert!(matches!(result, Err(ClientError::Config(ConfigError::EmptyCollection))));
}
