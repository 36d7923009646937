//! In-memory document store
//!
//! Thread-safe collections with live snapshot fan-out. Every write pushes a
//! fresh snapshot to each watcher whose query it affects, the same way a
//! real-time store does. Used by tests, demos and the offline demo mode.
//!
//! # Example
//!
//! ```
//! use kds_feed::{DocumentStore, FeedQuery, FieldMap, MemoryStore, OrderDirection};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), kds_feed::FeedError> {
//! let store = MemoryStore::new();
//! store.insert("pedidos", "a1", json!({"status": "1", "fecha": 1_700_000_000_000i64}))?;
//!
//! let mut feed = store.subscribe(
//!     FeedQuery::collection("pedidos").order_by("fecha", OrderDirection::Ascending),
//! )?;
//! let first = feed.recv().await.unwrap()?;
//! assert_eq!(first.len(), 1);
//!
//! store.update_fields("pedidos", "a1", FieldMap::new().set("status", "2")).await?;
//! let second = feed.recv().await.unwrap()?;
//! assert_eq!(second.documents[0].get("status"), Some(&json!("2")));
//! # Ok(())
//! # }
//! ```

use crate::error::{FeedError, FeedResult};
use crate::query::{FeedQuery, OrderDirection};
use crate::store::DocumentStore;
use crate::subscription::{channel, FeedSender, Subscription};
use crate::write::FieldMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use kds_types::{parse_timestamp, Document, Snapshot};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

type Collection = HashMap<String, Map<String, Value>>;

struct Watcher {
    query: FeedQuery,
    sender: FeedSender,
}

impl Watcher {
    fn affected_by(&self, collection: &str, id: Option<&str>) -> bool {
        if self.query.collection != collection {
            return false;
        }
        match (&self.query.document, id) {
            (Some(watched), Some(id)) => watched == id,
            _ => true,
        }
    }
}

#[derive(Default)]
struct Inner {
    collections: DashMap<String, Collection>,
    watchers: Mutex<Vec<Watcher>>,
    write_failure: Mutex<Option<FeedError>>,
    writes: AtomicU64,
}

/// In-memory [`DocumentStore`]
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.inner.collections.len())
            .field("writes", &self.write_count())
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a whole document and notify watchers
    pub fn insert(&self, collection: &str, id: &str, value: Value) -> FeedResult<()> {
        let doc = Document::from_value(id, value).map_err(|e| FeedError::Decode(e.to_string()))?;
        self.inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id, doc.data);
        self.notify(collection, Some(id));
        Ok(())
    }

    /// Remove a document and notify watchers
    pub fn remove(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        let removed = self
            .inner
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id));
        if removed.is_some() {
            self.notify(collection, Some(id));
        }
        removed
    }

    /// Current body of a document
    pub fn get(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Returns true if the collection has no documents
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Make every subsequent write fail with `error` (None restores writes)
    pub fn fail_writes(&self, error: Option<FeedError>) {
        *self.inner.write_failure.lock() = error;
    }

    /// Push an error to every watcher of `collection`
    pub fn push_error(&self, collection: &str, error: FeedError) {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| {
            if w.affected_by(collection, None) {
                w.sender.send_error(error.clone())
            } else {
                !w.sender.is_closed()
            }
        });
    }

    /// Re-deliver the current snapshot to every watcher of `collection`
    pub fn resend(&self, collection: &str) {
        self.notify(collection, None);
    }

    /// Number of live watchers
    pub fn watcher_count(&self) -> usize {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.sender.is_closed());
        watchers.len()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }

    /// Drop every watcher; their subscriptions end
    pub fn close(&self) {
        self.inner.watchers.lock().clear();
    }

    /// Build the snapshot a query currently sees
    pub fn snapshot(&self, query: &FeedQuery) -> Snapshot {
        let Some(docs) = self.inner.collections.get(&query.collection) else {
            return Snapshot::empty();
        };

        if let Some(id) = &query.document {
            return match docs.get(id) {
                Some(data) => Snapshot::new(vec![Document::new(id.clone(), data.clone())]),
                None => Snapshot::empty(),
            };
        }

        let mut documents: Vec<Document> = docs
            .iter()
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect();
        drop(docs);

        match &query.order_by {
            Some(order) => {
                documents.retain(|d| d.get(&order.field).is_some());
                documents.sort_by(|a, b| {
                    let ka = sort_key(a.get(&order.field));
                    let kb = sort_key(b.get(&order.field));
                    ka.cmp(&kb).then_with(|| a.id.cmp(&b.id))
                });
                if order.direction == OrderDirection::Descending {
                    documents.reverse();
                }
            }
            None => documents.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        Snapshot::new(documents)
    }

    fn notify(&self, collection: &str, id: Option<&str>) {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| {
            if w.affected_by(collection, id) {
                w.sender.send_snapshot(self.snapshot(&w.query))
            } else {
                !w.sender.is_closed()
            }
        });
    }

    fn check_writable(&self) -> FeedResult<()> {
        match self.inner.write_failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn merge(&self, collection: &str, id: &str, fields: &FieldMap, create: bool) -> FeedResult<()> {
        self.check_writable()?;
        let resolved = fields.resolve(Utc::now());
        {
            let mut docs = if create {
                self.inner
                    .collections
                    .entry(collection.to_string())
                    .or_default()
            } else {
                self.inner
                    .collections
                    .get_mut(collection)
                    .ok_or_else(|| FeedError::not_found(collection, id))?
            };
            let doc = if create {
                docs.entry(id.to_string()).or_default()
            } else {
                docs.get_mut(id)
                    .ok_or_else(|| FeedError::not_found(collection, id))?
            };
            doc.extend(resolved);
        }
        self.inner.writes.fetch_add(1, Ordering::Relaxed);
        self.notify(collection, Some(id));
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Other,
    Bool(bool),
    Time(DateTime<Utc>),
    Text(String),
}

fn sort_key(value: Option<&Value>) -> SortKey {
    match value {
        Some(Value::Bool(b)) => SortKey::Bool(*b),
        Some(v @ (Value::Number(_) | Value::Object(_))) => {
            parse_timestamp(v).map(SortKey::Time).unwrap_or(SortKey::Other)
        }
        Some(Value::String(s)) => match value.and_then(parse_timestamp) {
            Some(ts) => SortKey::Time(ts),
            None => SortKey::Text(s.clone()),
        },
        _ => SortKey::Other,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn subscribe(&self, query: FeedQuery) -> FeedResult<Subscription> {
        let (sender, subscription) = channel();
        let mut watchers = self.inner.watchers.lock();
        sender.send_snapshot(self.snapshot(&query));
        debug!(subscription = sender.id(), %query, "Memory subscription opened");
        watchers.push(Watcher { query, sender });
        Ok(subscription)
    }

    #[instrument(skip(self, fields), fields(n = fields.len()))]
    async fn update_fields(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()> {
        self.merge(collection, id, &fields, false)
    }

    #[instrument(skip(self, fields), fields(n = fields.len()))]
    async fn upsert(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()> {
        self.merge(collection, id, &fields, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders_query() -> FeedQuery {
        FeedQuery::collection("pedidos").order_by("fecha", OrderDirection::Ascending)
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_initial_snapshot_ordered_by_field() {
        let store = MemoryStore::new();
        store.insert("pedidos", "late", json!({"fecha": "2025-03-14T20:00:00Z"})).unwrap();
        store.insert("pedidos", "early", json!({"fecha": {"seconds": 1_600_000_000}})).unwrap();
        store.insert("pedidos", "undated", json!({"status": "1"})).unwrap();

        let mut sub = store.subscribe(orders_query()).unwrap();
        let snapshot = sub.recv().await.unwrap().unwrap();
        // documents without the order field are excluded
        assert_eq!(ids(&snapshot), vec!["early", "late"]);

        let desc = store.snapshot(&FeedQuery::collection("pedidos").order_by("fecha", OrderDirection::Descending));
        assert_eq!(ids(&desc), vec!["late", "early"]);
    }

    #[tokio::test]
    async fn test_writes_fan_out() {
        let store = MemoryStore::new();
        store.insert("pedidos", "a", json!({"status": "1", "fecha": 1})).unwrap();
        let mut first = store.subscribe(orders_query()).unwrap();
        let mut second = store.subscribe(orders_query()).unwrap();
        first.recv().await.unwrap().unwrap();
        second.recv().await.unwrap().unwrap();

        store
            .update_fields("pedidos", "a", FieldMap::new().set("status", "2").server_timestamp("fechaListo"))
            .await
            .unwrap();

        for sub in [&mut first, &mut second] {
            let snapshot = sub.recv().await.unwrap().unwrap();
            let doc = snapshot.find("a").unwrap();
            assert_eq!(doc.get("status"), Some(&json!("2")));
            assert!(parse_timestamp(doc.get("fechaListo").unwrap()).is_some());
        }
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let err = store
            .update_fields("config", "tienda", FieldMap::new().set("estadoTienda", false))
            .await
            .unwrap_err();
        assert_eq!(err, FeedError::not_found("config", "tienda"));

        store
            .upsert("config", "tienda", FieldMap::new().set("estadoTienda", true))
            .await
            .unwrap();
        assert_eq!(store.get("config", "tienda").unwrap()["estadoTienda"], json!(true));

        store
            .upsert("config", "tienda", FieldMap::new().server_timestamp("updatedAt"))
            .await
            .unwrap();
        let doc = store.get("config", "tienda").unwrap();
        assert_eq!(doc["estadoTienda"], json!(true));
        assert!(doc.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn test_document_watch() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(FeedQuery::document("config", "tienda")).unwrap();
        assert!(sub.recv().await.unwrap().unwrap().is_empty());

        store.insert("pedidos", "x", json!({"fecha": 1})).unwrap();
        store.insert("config", "otro", json!({})).unwrap();
        assert!(sub.try_recv().is_none());

        store.insert("config", "tienda", json!({"estadoTienda": false})).unwrap();
        let snapshot = sub.recv().await.unwrap().unwrap();
        assert_eq!(snapshot.documents[0].get("estadoTienda"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.insert("pedidos", "a", json!({"fecha": 1})).unwrap();
        let mut sub = store.subscribe(orders_query()).unwrap();
        sub.recv().await.unwrap().unwrap();

        store.fail_writes(Some(FeedError::WriteRejected("offline".into())));
        let err = store
            .update_fields("pedidos", "a", FieldMap::new().set("status", "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::WriteRejected(_)));
        assert!(store.get("pedidos", "a").unwrap().get("status").is_none());

        store.push_error("pedidos", FeedError::Connection("reset".into()));
        assert!(matches!(sub.recv().await, Some(Err(FeedError::Connection(_)))));

        store.fail_writes(None);
        store
            .update_fields("pedidos", "a", FieldMap::new().set("status", "2"))
            .await
            .unwrap();
        assert!(sub.recv().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_are_pruned() {
        let store = MemoryStore::new();
        let sub = store.subscribe(orders_query()).unwrap();
        let _kept = store.subscribe(orders_query()).unwrap();
        assert_eq!(store.watcher_count(), 2);

        drop(sub);
        assert_eq!(store.watcher_count(), 1);

        store.close();
        assert_eq!(store.watcher_count(), 0);
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert("pedidos", "a", json!("hola")),
            Err(FeedError::Decode(_))
        ));
        assert!(store.is_empty("pedidos"));
        assert_eq!(store.remove("pedidos", "a"), None);
    }
}
