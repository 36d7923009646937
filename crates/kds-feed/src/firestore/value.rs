//! Firestore typed values
//!
//! The REST API wraps every field in a type tag (`{"stringValue": "x"}`,
//! `{"integerValue": "3"}`, ...). Decoding strips the tags into plain JSON;
//! timestamps become `{seconds, nanoseconds}` objects so the order model reads
//! them like any other stored timestamp.

use crate::error::{FeedError, FeedResult};
use chrono::DateTime;
use kds_types::Document;
use serde_json::{json, Map, Number, Value};

/// Decode one typed value
pub fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    let Some((tag, inner)) = map.iter().next() else {
        return Value::Null;
    };

    match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map(Value::Bool).unwrap_or(Value::Null),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => other.clone(),
        },
        "doubleValue" => match inner {
            Value::Number(_) => inner.clone(),
            // NaN / Infinity arrive as strings and have no JSON form
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| json!({"seconds": ts.timestamp(), "nanoseconds": ts.timestamp_subsec_nanos()}))
            .unwrap_or(Value::Null),
        "stringValue" | "bytesValue" | "referenceValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_fields(inner.get("fields"))),
        _ => Value::Null,
    }
}

/// Decode a `fields` object into a plain map
pub fn decode_fields(fields: Option<&Value>) -> Map<String, Value> {
    fields
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(k, v)| (k.clone(), decode_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a REST document resource into a [`Document`]
///
/// The id is the last segment of the resource `name`.
pub fn decode_document(resource: &Value) -> FeedResult<Document> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| FeedError::Decode("document without a name".into()))?;
    let id = name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FeedError::Decode(format!("bad document name: {name}")))?;
    Ok(Document::new(id, decode_fields(resource.get("fields"))))
}

/// Encode plain JSON as a typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({"integerValue": i.to_string()}),
            None => json!({"doubleValue": n.as_f64()}),
        },
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(values) => {
            json!({"arrayValue": {"values": values.iter().map(encode_value).collect::<Vec<_>>()}})
        }
        Value::Object(map) => json!({"mapValue": {"fields": encode_fields(map)}}),
    }
}

/// Encode a plain map as a `fields` object
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect()
}

/// Quote a field name for use in a field path
///
/// Simple names (`[A-Za-z_][A-Za-z0-9_]*`) pass through; anything else is
/// wrapped in backticks with backticks and backslashes escaped.
pub fn quote_field_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        let escaped = field.replace('\\', "\\\\").replace('`', "\\`");
        format!("`{escaped}`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_types::{parse_timestamp, Order, OrderStatus};

    #[test]
    fn test_decode_order_document() {
        let resource = json!({
            "name": "projects/p/databases/(default)/documents/pedidos/AbC123",
            "fields": {
                "status": {"stringValue": "1"},
                "fecha": {"timestampValue": "2025-03-14T18:30:00.250Z"},
                "total": {"integerValue": "245"},
                "costoEnvio": {"doubleValue": 20.5},
                "infoCliente": {"mapValue": {"fields": {"nombre": {"stringValue": "Ana"}}}},
                "carrito": {"arrayValue": {"values": [
                    {"mapValue": {"fields": {"handle": {"stringValue": "taco"}, "cantidad": {"integerValue": "3"}}}}
                ]}},
                "vacio": {"arrayValue": {}},
                "nada": {"nullValue": null}
            }
        });
        let doc = decode_document(&resource).unwrap();
        assert_eq!(doc.id, "AbC123");
        assert_eq!(doc.get("total"), Some(&json!(245)));
        assert_eq!(doc.get("vacio"), Some(&json!([])));
        assert_eq!(doc.get("nada"), Some(&Value::Null));
        let ts = parse_timestamp(doc.get("fecha").unwrap()).unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);

        let order = Order::from_document(&doc);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer.display_name(), "Ana");
        assert_eq!(order.units(), 3);
    }

    #[test]
    fn test_decode_rejects_nameless() {
        assert!(decode_document(&json!({"fields": {}})).is_err());
        assert!(decode_document(&json!({"name": "a/b/"})).is_err());
    }

    #[test]
    fn test_decode_odd_values() {
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})), Value::Null);
        assert_eq!(decode_value(&json!({"integerValue": "99999999999999999999"})), json!("99999999999999999999"));
        assert_eq!(decode_value(&json!("untagged")), Value::Null);
        assert_eq!(
            decode_value(&json!({"geoPointValue": {"latitude": 19.4, "longitude": -99.1}})),
            json!({"latitude": 19.4, "longitude": -99.1})
        );
    }

    #[test]
    fn test_encode_value() {
        assert_eq!(encode_value(&json!("2")), json!({"stringValue": "2"}));
        assert_eq!(encode_value(&json!(false)), json!({"booleanValue": false}));
        assert_eq!(encode_value(&json!(7)), json!({"integerValue": "7"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(
            encode_value(&json!({"a": [1]})),
            json!({"mapValue": {"fields": {"a": {"arrayValue": {"values": [{"integerValue": "1"}]}}}}})
        );
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("fechaListo"), "fechaListo");
        assert_eq!(quote_field_path("_x1"), "_x1");
        assert_eq!(quote_field_path("1x"), "`1x`");
        assert_eq!(quote_field_path("metodo-pago"), "`metodo-pago`");
        assert_eq!(quote_field_path("a`b"), "`a\\`b`");
    }
}
