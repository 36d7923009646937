//! Snapshot fingerprints for change detection
//!
//! Polling feeds fetch the full result set every tick; only snapshots whose
//! fingerprint differs from the last delivered one are pushed downstream.

use kds_types::Snapshot;

/// CRC32 over document ids and bodies, in feed order
pub fn fingerprint(snapshot: &Snapshot) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&(snapshot.len() as u64).to_le_bytes());
    for doc in snapshot {
        hasher.update(doc.id.as_bytes());
        hasher.update(&[0]);
        // Map<String, Value> renders with sorted keys
        hasher.update(serde_json::Value::Object(doc.data.clone()).to_string().as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_types::Document;
    use serde_json::json;

    fn snap(docs: &[(&str, serde_json::Value)]) -> Snapshot {
        Snapshot::new(
            docs.iter()
                .map(|(id, v)| Document::from_value(*id, v.clone()).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_same_content_same_fingerprint() {
        let a = snap(&[("a", json!({"status": "1", "total": 10}))]);
        let b = snap(&[("a", json!({"total": 10, "status": "1"}))]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_changes_detected() {
        let base = snap(&[("a", json!({"status": "1"})), ("b", json!({"status": "1"}))]);
        let status = snap(&[("a", json!({"status": "2"})), ("b", json!({"status": "1"}))]);
        let order = snap(&[("b", json!({"status": "1"})), ("a", json!({"status": "1"}))]);
        let fewer = snap(&[("a", json!({"status": "1"}))]);

        let fp = fingerprint(&base);
        assert_ne!(fp, fingerprint(&status));
        assert_ne!(fp, fingerprint(&order));
        assert_ne!(fp, fingerprint(&fewer));
        assert_ne!(fingerprint(&Snapshot::empty()), fingerprint(&fewer));
    }
}
