//! Shared fixtures for client integration tests
//!
//! Orders mirror the documents the ordering app writes: string status codes,
//! epoch-millisecond `fecha`, a `carrito` of line items.

#![allow(dead_code)]

use kds_client::{DisplayEvent, EventReceiver};
use kds_feed::MemoryStore;
use serde_json::{json, Value};
use std::time::Duration;

pub const ORDERS: &str = "pedidos";

/// Base creation time for fixtures (2025-03-14T18:00:00Z)
pub const BASE_MS: i64 = 1_741_975_200_000;

/// Pending order created `minute` minutes after [`BASE_MS`]
pub fn pending_order(minute: i64) -> Value {
    json!({
        "status": "1",
        "fecha": BASE_MS + minute * 60_000,
        "infoCliente": {"nombre": "Ana", "telefono": "5550001"},
        "metodoPago": "Efectivo",
        "carrito": [
            {"nombre": "Hamburguesa", "cantidad": 2, "precio": 80},
            {"nombre": "Papas", "precio": 30}
        ],
        "costoEnvio": 20
    })
}

/// Ready order created `minute` minutes after [`BASE_MS`]
pub fn ready_order(minute: i64, payment: &str) -> Value {
    json!({
        "status": "listo",
        "fecha": BASE_MS + minute * 60_000,
        "fechaListo": BASE_MS + (minute + 10) * 60_000,
        "metodoPago": payment,
        "total": 150,
        "carrito": [{"handle": "hot-dog", "cantidad": 3}]
    })
}

/// Store seeded with `(id, document)` pairs in the orders collection
pub fn seeded_store(orders: &[(&str, Value)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (id, doc) in orders {
        store.insert(ORDERS, id, doc.clone()).unwrap();
    }
    store
}

/// Wait for the first event matching `pred`, skipping others
pub async fn expect_event<F>(events: &mut EventReceiver, mut pred: F) -> DisplayEvent
where
    F: FnMut(&DisplayEvent) -> bool,
{
    let wait = async {
        while let Some(event) = events.recv().await {
            if pred(&event) {
                return event;
            }
        }
        panic!("event channel closed");
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("timed out waiting for event")
}

/// Drain whatever is queued right now
pub fn drain(events: &mut EventReceiver) -> Vec<DisplayEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
