//! Canonical order model
//!
//! [`Order::from_document`] is the only place that knows the document field
//! names. Everything downstream works with the normalized fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::document::{Document, Snapshot};
use crate::fields::{as_i64, first_decimal, first_positive_decimal, first_str, first_text};
use crate::payment::{DeliveryMethod, PaymentMethod};
use crate::status::OrderStatus;
use crate::timestamp::parse_timestamp;

/// Status field
pub const STATUS_FIELD: &str = "status";
/// Creation time field, also the feed ordering field
pub const CREATED_AT_FIELD: &str = "fecha";
/// Ready time field, written by the server when an order is marked ready
pub const READY_AT_FIELD: &str = "fechaListo";
const RECORDED_AT_FIELD: &str = "creado_en";

/// Stored total fields, in priority order
pub const TOTAL_FIELDS: &[&str] = &["total", "totalPedido", "montoTotal", "importeTotal"];
/// Shipping cost fields, in priority order
pub const SHIPPING_FIELDS: &[&str] = &["costoEnvio", "envio", "shippingCost"];
/// Delivery method fields, in priority order (the first one is a historical typo)
pub const DELIVERY_FIELDS: &[&str] = &["MetodoEntrga", "metodoEntrega", "metodo"];
/// Payment method fields, in priority order
pub const PAYMENT_FIELDS: &[&str] = &["metodoPago", "metodo"];

const ITEM_NAME_FIELDS: &[&str] = &["handle", "nombre", "name"];
const ITEM_QTY_FIELDS: &[&str] = &["cantidad", "qty", "quantity"];
const ITEM_PRICE_FIELDS: &[&str] = &["precio", "price", "precioUnitario"];
const ITEM_COMMENT_FIELDS: &[&str] = &["comentario", "comment"];

/// Grouping key for items without a name
pub const UNNAMED_PRODUCT: &str = "producto sin nombre";

/// Customer contact block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Free-text references for the driver
    pub notes: Option<String>,
}

impl Customer {
    fn from_value(value: Option<&Value>) -> Self {
        let Some(map) = value.and_then(Value::as_object) else {
            return Self::default();
        };
        Self {
            name: first_text(map, &["nombre"]),
            phone: first_text(map, &["telefono"]),
            notes: first_text(map, &["referencias"]),
        }
    }

    /// Name for display
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Sin nombre")
    }
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    /// Product handle or display name as stored
    pub name: Option<String>,
    /// Always at least 1
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
    pub comment: Option<String>,
}

impl LineItem {
    /// Create a line item
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: Some(name.into()),
            quantity: quantity.max(1),
            unit_price: None,
            comment: None,
        }
    }

    /// Set the unit price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// Normalize a raw cart entry. Non-object entries yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            name: first_str(map, ITEM_NAME_FIELDS).map(str::to_string),
            quantity: quantity_of(map),
            unit_price: first_decimal(map, ITEM_PRICE_FIELDS),
            comment: first_text(map, ITEM_COMMENT_FIELDS),
        })
    }

    /// Grouping key: lower-cased name
    pub fn product_key(&self) -> String {
        match &self.name {
            Some(name) => name.to_lowercase(),
            None => UNNAMED_PRODUCT.to_string(),
        }
    }

    /// Price times quantity, with a missing price counted as zero
    ///
    /// A product that overflows `Decimal` counts as zero.
    pub fn line_total(&self) -> Decimal {
        let price = self.unit_price.unwrap_or(Decimal::ZERO);
        match price.checked_mul(Decimal::from(self.quantity)) {
            Some(total) => total,
            None => {
                warn!(
                    "Line total overflow ({} x {}), counted as zero",
                    price, self.quantity
                );
                Decimal::ZERO
            }
        }
    }
}

fn quantity_of(map: &Map<String, Value>) -> u32 {
    ITEM_QTY_FIELDS
        .iter()
        .find_map(|key| map.get(*key).and_then(as_i64))
        .filter(|q| *q > 0)
        .map(|q| u32::try_from(q).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Product label for display: dashes become spaces, upper-cased
pub fn product_label(key: &str) -> String {
    key.replace('-', " ").to_uppercase()
}

/// A normalized order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    /// Creation time (`fecha`)
    pub created_at: Option<DateTime<Utc>>,
    /// Time the kitchen marked it ready
    pub ready_at: Option<DateTime<Utc>>,
    /// Legacy record time, used only as a last-resort date
    pub recorded_at: Option<DateTime<Utc>>,
    pub customer: Customer,
    pub delivery: DeliveryMethod,
    pub address: Option<String>,
    pub items: Vec<LineItem>,
    pub payment: PaymentMethod,
    /// First positive stored total, if any
    pub stored_total: Option<Decimal>,
    pub shipping_cost: Decimal,
}

impl Order {
    /// Create an empty pending order (mostly useful for tests and demos)
    pub fn new(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            created_at: None,
            ready_at: None,
            recorded_at: None,
            customer: Customer::default(),
            delivery: DeliveryMethod::HomeDelivery,
            address: None,
            items: Vec::new(),
            payment: PaymentMethod::NoMethod,
            stored_total: None,
            shipping_cost: Decimal::ZERO,
        }
    }

    /// Normalize a store document
    ///
    /// Never fails: every unreadable field falls back to its default.
    pub fn from_document(doc: &Document) -> Self {
        let data = &doc.data;

        let cart = match data.get("nuevoCarrito") {
            Some(Value::Array(items)) => Some(items),
            _ => data.get("carrito").and_then(Value::as_array),
        };
        let items = cart
            .map(|items| items.iter().filter_map(LineItem::from_value).collect())
            .unwrap_or_default();

        Self {
            id: doc.id.clone(),
            status: OrderStatus::from_value(data.get(STATUS_FIELD)),
            created_at: data.get(CREATED_AT_FIELD).and_then(parse_timestamp),
            ready_at: data.get(READY_AT_FIELD).and_then(parse_timestamp),
            recorded_at: data.get(RECORDED_AT_FIELD).and_then(parse_timestamp),
            customer: Customer::from_value(data.get("infoCliente")),
            delivery: DeliveryMethod::normalize(first_text(data, DELIVERY_FIELDS).as_deref()),
            address: first_text(data, &["direccion"]),
            items,
            payment: PaymentMethod::normalize(first_text(data, PAYMENT_FIELDS).as_deref()),
            stored_total: first_positive_decimal(data, TOTAL_FIELDS),
            shipping_cost: first_decimal(data, SHIPPING_FIELDS).unwrap_or(Decimal::ZERO),
        }
    }

    /// Normalize every document in a snapshot, keeping feed order
    pub fn from_snapshot(snapshot: &Snapshot) -> Vec<Self> {
        snapshot.iter().map(Self::from_document).collect()
    }

    /// Set the creation time
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Set the ready time
    pub fn with_ready_at(mut self, at: DateTime<Utc>) -> Self {
        self.ready_at = Some(at);
        self
    }

    /// Add a line item
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Set the payment method
    pub fn with_payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = payment;
        self
    }

    /// Revenue: the stored total, else recomputed from the items plus shipping
    pub fn revenue(&self) -> Decimal {
        match self.stored_total {
            Some(total) => total,
            None => self
                .items
                .iter()
                .map(LineItem::line_total)
                .fold(self.shipping_cost, Decimal::saturating_add),
        }
    }

    /// Sum of item quantities
    pub fn units(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Date used for range filtering: ready time, else creation time, else record time
    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        self.ready_at.or(self.created_at).or(self.recorded_at)
    }

    /// Last six characters of the id, upper-cased
    pub fn short_id(&self) -> String {
        let chars: Vec<char> = self.id.chars().collect();
        let start = chars.len().saturating_sub(6);
        chars[start..].iter().collect::<String>().to_uppercase()
    }

    /// Address, only when the order goes out for delivery
    pub fn delivery_address(&self) -> Option<&str> {
        if self.delivery.is_home_delivery() {
            self.address.as_deref()
        } else {
            None
        }
    }
}
