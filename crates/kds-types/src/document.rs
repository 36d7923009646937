//! Raw store documents and feed snapshots

use crate::error::{KdsError, KdsResult};
use crate::fields::lookup_path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document as delivered by the store: an id plus an untyped field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: String,
    /// Field map
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Create a document from a field map
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Create a document from a JSON value, which must be an object
    pub fn from_value(id: impl Into<String>, value: Value) -> KdsResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(KdsError::malformed(id, "empty document id"));
        }
        match value {
            Value::Object(data) => Ok(Self { id, data }),
            other => Err(KdsError::malformed(
                id,
                format!("expected an object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Get a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Get a nested field by dotted path
    pub fn path(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.data, path)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Complete, ordered list of documents delivered on every feed change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Documents in feed order
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Create a snapshot from documents already in feed order
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Empty snapshot (e.g. a watched document that does not exist)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if there are no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in feed order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Find a document by id
    pub fn find(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Parse a JSON export
    ///
    /// Accepts either an array of `{"id": .., "data": {..}}` / `{"id": .., ..fields}`
    /// entries, or an object keyed by document id. Entries that are not objects
    /// are reported as errors in the second tuple element and skipped.
    pub fn from_json(raw: &str) -> KdsResult<(Self, Vec<KdsError>)> {
        let value: Value = serde_json::from_str(raw).map_err(|e| KdsError::InvalidJson {
            message: e.to_string(),
            raw: Some(raw.chars().take(200).collect()),
        })?;

        let mut documents = Vec::new();
        let mut rejected = Vec::new();

        match value {
            Value::Array(entries) => {
                for (idx, entry) in entries.into_iter().enumerate() {
                    match export_entry(entry) {
                        Ok(doc) => documents.push(doc),
                        Err(e) => rejected.push(match e {
                            KdsError::MalformedDocument { id, reason } if id.is_empty() => {
                                KdsError::malformed(format!("#{idx}"), reason)
                            }
                            other => other,
                        }),
                    }
                }
            }
            Value::Object(map) => {
                for (id, data) in map {
                    match Document::from_value(id, data) {
                        Ok(doc) => documents.push(doc),
                        Err(e) => rejected.push(e),
                    }
                }
            }
            other => {
                return Err(KdsError::InvalidJson {
                    message: format!("expected an array or object, got {}", json_kind(&other)),
                    raw: None,
                })
            }
        }

        Ok((Self::new(documents), rejected))
    }
}

fn export_entry(entry: Value) -> KdsResult<Document> {
    let Value::Object(mut map) = entry else {
        return Err(KdsError::malformed("", "export entry is not an object"));
    };
    let id = match map.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(KdsError::malformed("", "export entry has no id")),
    };
    match map.remove("data") {
        Some(data) if map.is_empty() => Document::from_value(id, data),
        Some(data) => {
            map.insert("data".to_string(), data);
            Document::from_value(id, Value::Object(map))
        }
        None => Document::from_value(id, Value::Object(map)),
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(Document::from_value("a", json!({"status": "1"})).is_ok());
        let err = Document::from_value("a", json!([1, 2])).unwrap_err();
        assert!(err.is_skippable());
        assert!(Document::from_value(" ", json!({})).is_err());
    }

    #[test]
    fn test_nested_path() {
        let doc = Document::from_value("a", json!({"infoCliente": {"nombre": "Luis"}})).unwrap();
        assert_eq!(doc.path("infoCliente.nombre"), Some(&json!("Luis")));
        assert_eq!(doc.get("status"), None);
    }

    #[test]
    fn test_export_array_forms() {
        let raw = r#"[
            {"id": "a", "data": {"status": "1"}},
            {"id": "b", "status": "2", "total": 10},
            {"status": "3"},
            "garbage"
        ]"#;
        let (snapshot, rejected) = Snapshot::from_json(raw).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.documents[0].get("status"), Some(&json!("1")));
        assert_eq!(snapshot.find("b").unwrap().get("total"), Some(&json!(10)));
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_export_object_form() {
        let raw = r#"{"a": {"status": "1"}, "b": 5}"#;
        let (snapshot, rejected) = Snapshot::from_json(raw).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_export_invalid_json() {
        assert!(matches!(
            Snapshot::from_json("{nope"),
            Err(KdsError::InvalidJson { .. })
        ));
        assert!(Snapshot::from_json("42").is_err());
    }
}
