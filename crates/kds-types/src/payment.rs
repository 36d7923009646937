//! Payment and delivery method normalization

use serde::Serialize;
use std::fmt;

/// Canonical payment method
///
/// Free-text payment fields are matched by case-insensitive substring:
/// `efectivo` → cash, `trans` → transfer, `tarjeta` → card. Empty values and
/// the literal strings `null` / `undefined` mean no method. Anything else is
/// kept as its own group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    NoMethod,
    /// Unrecognized method, stored lower-cased
    Other(String),
}

impl PaymentMethod {
    /// Normalize a raw payment field
    pub fn normalize(raw: Option<&str>) -> Self {
        let lowered = raw.unwrap_or_default().to_lowercase();

        if lowered.contains("efectivo") {
            return Self::Cash;
        }
        if lowered.contains("trans") {
            return Self::Transfer;
        }
        if lowered.contains("tarjeta") {
            return Self::Card;
        }
        if lowered.is_empty() || lowered == "null" || lowered == "undefined" {
            return Self::NoMethod;
        }
        Self::Other(lowered)
    }

    /// Grouping key
    pub fn key(&self) -> &str {
        match self {
            Self::Cash => "efectivo",
            Self::Transfer => "transferencia",
            Self::Card => "tarjeta",
            Self::NoMethod => "sin-metodo",
            Self::Other(key) => key,
        }
    }

    /// Display label
    pub fn label(&self) -> String {
        match self {
            Self::Cash => "Efectivo".to_string(),
            Self::Transfer => "Transferencia".to_string(),
            Self::Card => "Tarjeta".to_string(),
            Self::NoMethod => "Sin método".to_string(),
            Self::Other(key) => capitalize(key),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How the order leaves the kitchen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Home delivery (the default when the field is absent)
    #[default]
    HomeDelivery,
    /// Anything else, with the label the customer picked
    Pickup(String),
}

impl DeliveryMethod {
    /// Normalize a raw delivery field
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::HomeDelivery,
            Some(s) if s.eq_ignore_ascii_case("domicilio") => Self::HomeDelivery,
            Some(s) => Self::Pickup(s.to_string()),
        }
    }

    /// Returns true for home delivery
    pub fn is_home_delivery(&self) -> bool {
        matches!(self, Self::HomeDelivery)
    }

    /// Label as chosen by the customer
    pub fn label(&self) -> &str {
        match self {
            Self::HomeDelivery => "Domicilio",
            Self::Pickup(label) => label,
        }
    }

    /// Two-way label used on order cards
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::HomeDelivery => "Domicilio",
            Self::Pickup(_) => "Recoger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_methods() {
        assert_eq!(PaymentMethod::normalize(Some("Efectivo")), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::normalize(Some("pago en EFECTIVO")), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::normalize(Some("Tarjeta de crédito")), PaymentMethod::Card);
        assert_eq!(PaymentMethod::normalize(Some("trans")), PaymentMethod::Transfer);
    }

    #[test]
    fn test_bank_transfer_label() {
        let method = PaymentMethod::normalize(Some("Transferencia bancaria"));
        assert_eq!(method.key(), "transferencia");
        assert_eq!(method.label(), "Transferencia");
    }

    #[test]
    fn test_missing_method() {
        for raw in [None, Some(""), Some("null"), Some("UNDEFINED")] {
            let method = PaymentMethod::normalize(raw);
            assert_eq!(method, PaymentMethod::NoMethod);
            assert_eq!(method.key(), "sin-metodo");
            assert_eq!(method.label(), "Sin método");
        }
    }

    #[test]
    fn test_passthrough_method() {
        let method = PaymentMethod::normalize(Some("MercadoPago"));
        assert_eq!(method.key(), "mercadopago");
        assert_eq!(method.label(), "Mercadopago");

        let method = PaymentMethod::normalize(Some("órale pay"));
        assert_eq!(method.label(), "Órale pay");
    }

    #[test]
    fn test_delivery_method() {
        assert_eq!(DeliveryMethod::normalize(None), DeliveryMethod::HomeDelivery);
        assert_eq!(DeliveryMethod::normalize(Some("DOMICILIO")), DeliveryMethod::HomeDelivery);
        let pickup = DeliveryMethod::normalize(Some("Recoger en tienda"));
        assert!(!pickup.is_home_delivery());
        assert_eq!(pickup.label(), "Recoger en tienda");
        assert_eq!(pickup.short_label(), "Recoger");
    }
}
