//! Lenient field readers for loosely typed documents
//!
//! Store documents are written by several clients over time, so the same
//! semantic field can appear under different names and as either a string or
//! a number. These helpers take a prioritized key list and return the first
//! usable value.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Get a trimmed, non-empty string from a value
pub fn non_empty_str(value: &Value) -> Option<&str> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string among `keys`
pub fn first_str<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(non_empty_str))
}

/// First "truthy" value among `keys`, rendered as text
///
/// Strings must be non-empty, numbers must be non-zero and only `true`
/// booleans count. This mirrors how the writing clients fall through
/// alternative field names.
pub fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64().map(|f| f != 0.0).unwrap_or(false) => {
            Some(n.to_string())
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    })
}

/// Parse a JSON number or numeric string as a decimal
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            if s.contains('e') || s.contains('E') {
                n.as_f64().and_then(Decimal::from_f64)
            } else {
                Decimal::from_str(&s).ok()
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .ok()
                .or_else(|| Decimal::from_scientific(trimmed).ok())
        }
        _ => None,
    }
}

/// First value among `keys` that parses as a decimal
pub fn first_decimal(map: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(as_decimal))
}

/// First value among `keys` that parses as a strictly positive decimal
pub fn first_positive_decimal(map: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter()
        .filter_map(|key| map.get(*key).and_then(as_decimal))
        .find(|d| d.is_sign_positive() && !d.is_zero())
}

/// Parse a JSON number or numeric string as an integer, truncating fractions
pub fn as_i64(value: &Value) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(_) => as_decimal(value).and_then(|d| d.trunc().to_i64()),
        _ => None,
    }
}

/// Follow a dotted path (`infoCliente.nombre`) through nested objects
pub fn lookup_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = map.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_first_str_skips_blank() {
        let map = obj(json!({"a": "  ", "b": " Domicilio ", "c": "x"}));
        assert_eq!(first_str(&map, &["a", "b", "c"]), Some("Domicilio"));
        assert_eq!(first_str(&map, &["missing"]), None);
    }

    #[test]
    fn test_first_text_truthiness() {
        let map = obj(json!({"zero": 0, "empty": "", "num": 3, "s": "Efectivo"}));
        assert_eq!(first_text(&map, &["zero", "empty", "num"]), Some("3".into()));
        assert_eq!(first_text(&map, &["empty", "s"]), Some("Efectivo".into()));
        assert_eq!(first_text(&map, &["zero", "empty"]), None);
    }

    #[test]
    fn test_as_decimal_variants() {
        assert_eq!(as_decimal(&json!(80)), Some(dec!(80)));
        assert_eq!(as_decimal(&json!(12.5)), Some(dec!(12.5)));
        assert_eq!(as_decimal(&json!(" 99.90 ")), Some(dec!(99.90)));
        assert_eq!(as_decimal(&json!("gratis")), None);
        assert_eq!(as_decimal(&json!(null)), None);
        assert_eq!(as_decimal(&json!(true)), None);
    }

    #[test]
    fn test_first_positive_decimal_skips_zero_and_negative() {
        let map = obj(json!({"total": 0, "totalPedido": -5, "montoTotal": "150"}));
        assert_eq!(
            first_positive_decimal(&map, &["total", "totalPedido", "montoTotal"]),
            Some(dec!(150))
        );
    }

    #[test]
    fn test_as_i64_truncates() {
        assert_eq!(as_i64(&json!(2)), Some(2));
        assert_eq!(as_i64(&json!(2.9)), Some(2));
        assert_eq!(as_i64(&json!("3")), Some(3));
        assert_eq!(as_i64(&json!("tres")), None);
    }

    #[test]
    fn test_lookup_path() {
        let map = obj(json!({"infoCliente": {"nombre": "Ana", "extra": {"x": 1}}}));
        assert_eq!(lookup_path(&map, "infoCliente.nombre"), Some(&json!("Ana")));
        assert_eq!(lookup_path(&map, "infoCliente.extra.x"), Some(&json!(1)));
        assert_eq!(lookup_path(&map, "infoCliente.telefono"), None);
        assert_eq!(lookup_path(&map, "nope.nombre"), None);
    }
}
