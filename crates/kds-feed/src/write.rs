//! Write model: field maps with server-assigned timestamps

use chrono::{DateTime, Utc};
use kds_types::timestamp_to_value;
use serde_json::{Map, Value};

/// Value of one written field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain JSON value
    Value(Value),
    /// Timestamp assigned by the store when the write is applied
    ServerTimestamp,
}

/// Ordered set of top-level fields to write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: Vec<(String, FieldValue)>,
}

impl FieldMap {
    /// Create an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a JSON value
    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_field(field, FieldValue::Value(value.into()))
    }

    /// Set a field to the server timestamp
    pub fn server_timestamp(self, field: impl Into<String>) -> Self {
        self.with_field(field, FieldValue::ServerTimestamp)
    }

    /// Set a field, replacing an earlier value for the same name
    pub fn with_field(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Resolve server timestamps against `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    FieldValue::Value(value) => value.clone(),
                    FieldValue::ServerTimestamp => timestamp_to_value(now),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_builder_and_resolve() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap();
        let fields = FieldMap::new()
            .set("status", "2")
            .server_timestamp("fechaListo")
            .set("status", "3");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.field_names(), vec!["status", "fechaListo"]);

        let resolved = fields.resolve(now);
        assert_eq!(resolved["status"], json!("3"));
        assert_eq!(resolved["fechaListo"]["seconds"], json!(now.timestamp()));
    }
}
