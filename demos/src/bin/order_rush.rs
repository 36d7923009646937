//! Demo 2: Order Rush
//!
//! Showcases: live feed reconciliation, new-order alarm, acknowledgment,
//! mark-ready writes and feed error recovery, all on the in-memory store
//!
//! Run: cargo run --bin order_rush

use anyhow::Result;
use chrono::Utc;
use colored::*;
use kds_client::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn order(customer: &str, product: &str, qty: u32) -> serde_json::Value {
    json!({
        "status": "1",
        "fecha": Utc::now().timestamp_millis(),
        "infoCliente": {"nombre": customer},
        "metodoPago": "Efectivo",
        "nuevoCarrito": [{"handle": product, "cantidad": qty, "precio": 90}]
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  ORDER RUSH".cyan().bold());
    println!("{}", "  Kitchen display demo - live alarm and mark ready".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let store = MemoryStore::new();
    store.insert("pedidos", "previo", order("Ana", "hot-dog", 1))?;

    let mut client = KitchenClient::builder()
        .connect(Arc::new(store.clone()))
        .await?;
    let mut events = client
        .events()
        .ok_or_else(|| anyhow::anyhow!("events already taken"))?;

    // Simulated ordering app
    let producer = store.clone();
    tokio::spawn(async move {
        let rush = [("Luis", "hamburguesa-doble", 2), ("María", "papas-gajo", 1), ("Jorge", "malteada", 3)];
        for (n, (customer, product, qty)) in rush.into_iter().enumerate() {
            tokio::time::sleep(Duration::from_millis(700)).await;
            let _ = producer.insert("pedidos", &format!("rush{}", n), order(customer, product, qty));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        producer.push_error("pedidos", FeedError::Connection("simulated outage".into()));
        tokio::time::sleep(Duration::from_millis(500)).await;
        producer.resend("pedidos");
    });

    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);

    loop {
        let event = tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            DisplayEvent::Feed(FeedEvent::Updated { pending, completed, baseline }) => {
                let tag = if baseline { "BASELINE".dimmed() } else { "UPDATE".normal() };
                println!("  {:>10}  pending={} completed={}", tag, pending, completed);
            }
            DisplayEvent::Alarm(AlarmEvent::Raised { order, new_pending }) => {
                println!(
                    "  {:>10}  #{} {} ({} new)",
                    "ALARM".red().bold(),
                    order.short_id(),
                    order.customer.display_name(),
                    new_pending
                );
                // cook acknowledges and finishes the order straight away
                client.acknowledge_alarm();
                if let Err(e) = client.mark_ready(&order.id).await {
                    println!("  {:>10}  {}", "ERROR".red(), e);
                }
            }
            DisplayEvent::OrderReady { order_id } => {
                println!("  {:>10}  {}", "READY".green().bold(), order_id);
            }
            DisplayEvent::Feed(FeedEvent::Failed { message, .. }) => {
                println!("  {:>10}  {}", "FEED".red(), message);
            }
            DisplayEvent::Feed(FeedEvent::Recovered) => {
                println!("  {:>10}  feed recovered", "FEED".green());
            }
            DisplayEvent::Gate(GateEvent::StatusChanged { status }) => {
                println!("  {:>10}  {}", "STORE".yellow(), status);
            }
            _ => {}
        }
    }

    let report = client.with_board(|board| board.report(&chrono::Local::now()));
    client.shutdown();

    println!();
    println!("  Ready today:  {}", report.total_orders);
    println!("  Units:        {}", report.total_units);
    println!("  Revenue:      {}", format!("${:.2}", report.total_revenue).green());
    Ok(())
}
