//! Order lifecycle status

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Order lifecycle status
///
/// Every status has a numeric code and a word; both encodings (and the
/// English words) are accepted and compared case-insensitively.
///
/// | Status    | Code | Words                     |
/// |-----------|------|---------------------------|
/// | Pending   | `1`  | `pendiente`, `pending`    |
/// | Ready     | `2`  | `listo`, `ready`          |
/// | Delivered | `3`  | `entregado`, `delivered`  |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Waiting in the kitchen
    Pending,
    /// Cooked and waiting for pickup or dispatch
    Ready,
    /// Handed over to the customer
    Delivered,
    /// Missing or unrecognized tag (kept verbatim)
    Unknown(String),
}

impl OrderStatus {
    /// Parse from a status tag
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "1" | "pendiente" | "pending" => Self::Pending,
            "2" | "listo" | "ready" => Self::Ready,
            "3" | "entregado" | "delivered" => Self::Delivered,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Parse from a stored JSON value (string or number)
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::parse(s),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(code) => Self::parse(&code.to_string()),
                None => Self::parse(&n.to_string()),
            },
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::new()),
        }
    }

    /// Numeric code as written to the store
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Pending => Some("1"),
            Self::Ready => Some("2"),
            Self::Delivered => Some("3"),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true if the order still needs cooking
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the order is ready
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the order left the kitchen (ready or delivered)
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Ready | Self::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pendiente"),
            Self::Ready => write!(f, "listo"),
            Self::Delivered => write!(f, "entregado"),
            Self::Unknown(raw) if raw.is_empty() => write!(f, "sin status"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}
