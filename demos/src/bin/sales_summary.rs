//! Demo 1: Offline Sales Summary
//!
//! Showcases: document normalization, date-range filtering, aggregation
//!
//! Reads an export of the orders collection (array of `{id, ...fields}`,
//! array of `{id, data}`, or an object keyed by id) and prints the ready
//! orders report.
//!
//! Run: cargo run --bin sales_summary -- pedidos.json [hoy|semana|mes|todo|YYYY-MM-DD..YYYY-MM-DD] [--json]

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use colored::*;
use kds_board::{aggregate, drill_down, filter_by_range, DateRange};
use kds_types::{Order, Snapshot};

fn parse_range(arg: &str) -> Result<DateRange> {
    let range = match arg {
        "hoy" => DateRange::Today,
        "semana" => DateRange::Last7Days,
        "mes" => DateRange::Last30Days,
        "todo" => DateRange::AllTime,
        custom => {
            let Some((start, end)) = custom.split_once("..") else {
                bail!("unknown range {custom:?}");
            };
            let date = |s: &str| -> Result<Option<NaiveDate>> {
                if s.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("bad date {s:?}"))?))
                }
            };
            DateRange::custom(date(start)?, date(end)?)
        }
    };
    Ok(range)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let Some(path) = positional.first() else {
        bail!("usage: sales_summary <export.json> [hoy|semana|mes|todo|FROM..TO] [--json]");
    };
    let range = match positional.get(1) {
        Some(arg) => parse_range(arg)?,
        None => DateRange::AllTime,
    };

    let raw = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?;
    let (snapshot, rejected) = Snapshot::from_json(&raw)?;
    let orders = Order::from_snapshot(&snapshot);
    let completed: Vec<&Order> = orders.iter().filter(|o| o.status.is_completed()).collect();
    let now = Local::now();
    let in_range = filter_by_range(completed.iter().copied(), &range, &now);
    let report = aggregate(in_range.iter().copied());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  RESUMEN DE VENTAS".cyan().bold());
    println!("{}", format!("  {} · {}", path, range.label()).cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();
    println!(
        "  Documentos: {}   Pedidos listos: {}   Rechazados: {}",
        snapshot.len(),
        completed.len(),
        rejected.len()
    );
    for err in &rejected {
        println!("  {} {}", "✗".red(), err.to_string().dimmed());
    }
    println!();

    if report.is_empty() {
        println!("  {}", "Sin ventas en este rango.".yellow());
        return Ok(());
    }

    println!("  Pedidos:    {}", report.total_orders.to_string().white().bold());
    println!("  Productos:  {}", report.total_units.to_string().white().bold());
    println!("  Total:      {}", format!("${:.2}", report.total_revenue).green().bold());
    println!();

    println!("  {:<28} {:>8}", "PRODUCTO".white().bold(), "CANT.".white().bold());
    println!("  {}", "─".repeat(37));
    for product in report.top_products(15) {
        println!("  {:<28} {:>8}", product.label(), product.quantity);
    }
    println!();

    println!(
        "  {:<16} {:>8} {:>8} {:>12}",
        "MÉTODO".white().bold(),
        "PEDIDOS".white().bold(),
        "PROD.".white().bold(),
        "TOTAL".white().bold()
    );
    println!("  {}", "─".repeat(47));
    for payment in &report.payments {
        println!(
            "  {:<16} {:>8} {:>8} {:>12}",
            payment.label.cyan(),
            payment.orders,
            payment.units,
            format!("${:.2}", payment.revenue).green()
        );
    }

    if let Some(top) = report.payments.first() {
        if let Some(detail) = drill_down(in_range.iter().copied(), &top.key) {
            println!();
            println!("  {} {}", "Más usado:".dimmed(), detail.summary.label.bold());
            for product in detail.products.iter().take(5) {
                println!("    {:<26} {:>8}", product.label(), product.quantity);
            }
        }
    }

    Ok(())
}
