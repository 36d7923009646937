//! Sales aggregation over completed orders
//!
//! All rankings are sorted by descending quantity with ties kept in the order
//! the key was first seen (feed order), so the output is deterministic for a
//! given input.

use kds_types::{product_label, Order, PaymentMethod};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Cumulative quantity for one product key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCount {
    /// Lower-cased product key
    pub key: String,
    pub quantity: u64,
}

impl ProductCount {
    /// Display label for the product
    pub fn label(&self) -> String {
        product_label(&self.key)
    }
}

/// Per-payment-method totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    /// Canonical key (`efectivo`, `transferencia`, ...)
    pub key: String,
    pub label: String,
    pub orders: usize,
    pub units: u64,
    pub revenue: Decimal,
}

impl PaymentSummary {
    fn new(method: &PaymentMethod) -> Self {
        Self {
            key: method.key().to_string(),
            label: method.label(),
            orders: 0,
            units: 0,
            revenue: Decimal::ZERO,
        }
    }

    fn add(&mut self, order: &Order) {
        self.orders += 1;
        self.units = self.units.saturating_add(order.units());
        self.revenue = self.revenue.saturating_add(order.revenue());
    }
}

/// Summary of a filtered set of completed orders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    pub total_orders: usize,
    pub total_units: u64,
    pub total_revenue: Decimal,
    /// Product ranking, descending by quantity
    pub products: Vec<ProductCount>,
    /// Payment breakdown, descending by units
    pub payments: Vec<PaymentSummary>,
}

impl SalesReport {
    /// Returns true if no orders were aggregated
    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }

    /// Find a payment row by key
    pub fn payment(&self, key: &str) -> Option<&PaymentSummary> {
        self.payments.iter().find(|p| p.key == key)
    }

    /// Top `n` products
    pub fn top_products(&self, n: usize) -> &[ProductCount] {
        &self.products[..n.min(self.products.len())]
    }
}

/// Detail for one payment method inside the filtered window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDrillDown {
    pub summary: PaymentSummary,
    /// Product ranking restricted to this method
    pub products: Vec<ProductCount>,
    /// Matching orders, in feed order
    pub orders: Vec<Order>,
}

/// Rank products by cumulative quantity
pub fn rank_products<'a, I>(orders: I) -> Vec<ProductCount>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranking: Vec<ProductCount> = Vec::new();

    for item in orders.into_iter().flat_map(|o| o.items.iter()) {
        let key = item.product_key();
        match index.get(&key) {
            Some(&i) => ranking[i].quantity += u64::from(item.quantity),
            None => {
                index.insert(key.clone(), ranking.len());
                ranking.push(ProductCount {
                    key,
                    quantity: u64::from(item.quantity),
                });
            }
        }
    }

    // stable: ties keep first-seen order
    ranking.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranking
}

/// Aggregate a filtered set of completed orders
pub fn aggregate<'a, I>(orders: I) -> SalesReport
where
    I: IntoIterator<Item = &'a Order>,
{
    let orders: Vec<&Order> = orders.into_iter().collect();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut payments: Vec<PaymentSummary> = Vec::new();
    let mut report = SalesReport::default();

    for order in &orders {
        report.total_orders += 1;
        report.total_units = report.total_units.saturating_add(order.units());
        report.total_revenue = report.total_revenue.saturating_add(order.revenue());

        let key = order.payment.key();
        let slot = match index.get(key) {
            Some(&i) => i,
            None => {
                index.insert(key.to_string(), payments.len());
                payments.push(PaymentSummary::new(&order.payment));
                payments.len() - 1
            }
        };
        payments[slot].add(order);
    }

    payments.sort_by(|a, b| b.units.cmp(&a.units));
    report.payments = payments;
    report.products = rank_products(orders.iter().copied());
    report
}

/// Drill into one payment method by canonical key
///
/// Returns `None` when no order in the window uses that method.
pub fn drill_down<'a, I>(orders: I, key: &str) -> Option<PaymentDrillDown>
where
    I: IntoIterator<Item = &'a Order>,
{
    let matching: Vec<&Order> = orders
        .into_iter()
        .filter(|o| o.payment.key() == key)
        .collect();
    let first = matching.first()?;

    let mut summary = PaymentSummary::new(&first.payment);
    for order in &matching {
        summary.add(order);
    }

    Some(PaymentDrillDown {
        summary,
        products: rank_products(matching.iter().copied()),
        orders: matching.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_types::{LineItem, OrderStatus};
    use rust_decimal_macros::dec;

    fn ready(id: &str, payment: &str, items: &[(&str, u32, Decimal)]) -> Order {
        items.iter().fold(
            Order::new(id, OrderStatus::Ready).with_payment(PaymentMethod::normalize(Some(payment))),
            |order, (name, qty, price)| order.with_item(LineItem::new(*name, *qty).with_price(*price)),
        )
    }

    #[test]
    fn test_case_insensitive_product_key() {
        let orders = vec![ready("a", "Efectivo", &[("Burger", 2, dec!(50)), ("BURGER", 1, dec!(50))])];
        let ranking = rank_products(&orders);
        assert_eq!(
            ranking,
            vec![ProductCount {
                key: "burger".into(),
                quantity: 3
            }]
        );
        assert_eq!(ranking[0].label(), "BURGER");
    }

    #[test]
    fn test_ranking_ties_keep_first_seen() {
        let orders = vec![
            ready("a", "", &[("taco", 2, dec!(0)), ("agua", 2, dec!(0))]),
            ready("b", "", &[("torta", 5, dec!(0))]),
        ];
        let keys: Vec<String> = rank_products(&orders).into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["torta", "taco", "agua"]);

        let reversed: Vec<Order> = orders.iter().rev().cloned().collect();
        let keys: Vec<String> = rank_products(&reversed).into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["torta", "taco", "agua"]);
    }

    #[test]
    fn test_report_totals_and_payment_breakdown() {
        let orders = vec![
            ready("a", "Efectivo", &[("taco", 3, dec!(20))]),
            ready("b", "Transferencia bancaria", &[("torta", 1, dec!(60)), ("agua", 1, dec!(15))]),
            ready("c", "efectivo", &[("taco", 1, dec!(20))]),
            ready("d", "tarjeta", &[("taco", 4, dec!(20))]),
        ];
        let report = aggregate(&orders);

        assert_eq!(report.total_orders, 4);
        assert_eq!(report.total_units, 10);
        assert_eq!(report.total_revenue, dec!(235));
        assert_eq!(report.products[0].key, "taco");
        assert_eq!(report.products[0].quantity, 8);

        let rows: Vec<(&str, usize, u64)> = report
            .payments
            .iter()
            .map(|p| (p.key.as_str(), p.orders, p.units))
            .collect();
        // efectivo and tarjeta tie on units; efectivo was seen first
        assert_eq!(
            rows,
            vec![("efectivo", 2, 4), ("tarjeta", 1, 4), ("transferencia", 1, 2)]
        );
        let transfer = report.payment("transferencia").unwrap();
        assert_eq!(transfer.label, "Transferencia");
        assert_eq!(transfer.revenue, dec!(75));
    }

    #[test]
    fn test_drill_down() {
        let orders = vec![
            ready("a", "Efectivo", &[("taco", 3, dec!(20))]),
            ready("b", "Tarjeta", &[("torta", 1, dec!(60))]),
            ready("c", "EFECTIVO", &[("agua", 5, dec!(15)), ("taco", 1, dec!(20))]),
        ];
        let detail = drill_down(&orders, "efectivo").unwrap();
        assert_eq!(detail.summary.orders, 2);
        assert_eq!(detail.summary.units, 9);
        assert_eq!(detail.summary.revenue, dec!(155));
        assert_eq!(detail.orders.len(), 2);
        assert_eq!(detail.products[0].key, "agua");
        assert_eq!(detail.products[1].key, "taco");
        assert_eq!(detail.products[1].quantity, 4);

        assert!(drill_down(&orders, "transferencia").is_none());
    }

    #[test]
    fn test_empty_report() {
        let report = aggregate(std::iter::empty());
        assert!(report.is_empty());
        assert!(report.products.is_empty());
        assert!(report.top_products(5).is_empty());
    }
}
