//! Demo mode: a seeded in-memory store with a steady trickle of new orders

use chrono::{Duration as ChronoDuration, Utc};
use kds_feed::{FeedResult, MemoryStore};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const ORDERS: &str = "pedidos";

const MENU: &[(&str, i64)] = &[
    ("hamburguesa-clasica", 95),
    ("hamburguesa-doble", 135),
    ("hot-dog", 55),
    ("papas-gajo", 45),
    ("aros-de-cebolla", 50),
    ("refresco", 25),
    ("malteada", 60),
];

const CUSTOMERS: &[&str] = &["Ana", "Luis", "María", "Jorge", "Sofía", "Carlos", "Fernanda"];
const PAYMENTS: &[&str] = &["Efectivo", "Transferencia bancaria", "Tarjeta", ""];
const COMMENTS: &[&str] = &["sin cebolla", "extra queso", "bien cocida", "sin hielo"];

fn random_order(rng: &mut impl Rng, status: &str, created_ms: i64) -> Value {
    let mut items = Vec::new();
    for _ in 0..rng.gen_range(1..=4) {
        let Some((handle, price)) = MENU.choose(rng) else {
            continue;
        };
        let mut item = json!({
            "handle": handle,
            "cantidad": rng.gen_range(1..=3),
            "precio": price,
        });
        if rng.gen_bool(0.25) {
            if let Some(comment) = COMMENTS.choose(rng) {
                item["comentario"] = json!(comment);
            }
        }
        items.push(item);
    }

    let delivery = rng.gen_bool(0.5);
    let mut order = json!({
        "status": status,
        "fecha": created_ms,
        "infoCliente": {
            "nombre": CUSTOMERS.choose(rng).copied().unwrap_or(""),
            "telefono": format!("55{:08}", rng.gen_range(0..100_000_000u32)),
        },
        "MetodoEntrga": if delivery { "Domicilio" } else { "Recoger" },
        "metodoPago": PAYMENTS.choose(rng).copied().unwrap_or(""),
        "nuevoCarrito": items,
    });
    if delivery {
        order["direccion"] = json!(format!("Calle {} #{}", rng.gen_range(1..40), rng.gen_range(10..999)));
        order["costoEnvio"] = json!(25);
    }
    if status != "1" {
        order["fechaListo"] = json!(created_ms + rng.gen_range(8..25) * 60_000);
    }
    order
}

/// Fill the store with a day of history plus a few pending orders
pub fn seed(store: &MemoryStore) -> FeedResult<()> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    for n in 0..40 {
        let created = now - ChronoDuration::hours(rng.gen_range(1..24 * 20));
        let status = if rng.gen_bool(0.7) { "2" } else { "3" };
        store.insert(
            ORDERS,
            &format!("hist{:04}", n),
            random_order(&mut rng, status, created.timestamp_millis()),
        )?;
    }
    for n in 0..3 {
        let created = now - ChronoDuration::minutes(5 * (3 - n));
        store.insert(
            ORDERS,
            &format!("pend{:04}", n),
            random_order(&mut rng, "1", created.timestamp_millis()),
        )?;
    }

    info!("Demo store seeded with {} orders", store.len(ORDERS));
    Ok(())
}

/// Insert a new pending order every `every`
pub fn spawn_rush(store: MemoryStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        let mut n = 0u32;
        loop {
            ticker.tick().await;
            let order = {
                let mut rng = rand::thread_rng();
                random_order(&mut rng, "1", Utc::now().timestamp_millis())
            };
            let id = format!("demo{:04}", n);
            n += 1;
            match store.insert(ORDERS, &id, order) {
                Ok(()) => debug!("Demo order {} placed", id),
                Err(e) => debug!("Demo order {} rejected: {}", id, e),
            }
        }
    })
}
