//! Firestore REST adapter
//!
//! Firestore's push listeners need gRPC streaming; this adapter emulates
//! them over the REST v1 API instead. Each subscription runs a polling task
//! that re-runs the query every `poll_interval`, fingerprints the result and
//! forwards only changed snapshots. Failed fetches are forwarded as errors
//! and retried with backoff, so the consumer sees the same
//! `Result<Snapshot, FeedError>` stream a real listener would produce.
//!
//! Writes go through `documents:commit` so a field update and a
//! server-assigned timestamp land atomically.

mod config;
mod value;

pub use config::{FirestoreConfig, DEFAULT_BASE_URL, DEFAULT_DATABASE};
pub use value::{
    decode_document, decode_fields, decode_value, encode_fields, encode_value, quote_field_path,
};

use crate::error::{FeedError, FeedResult};
use crate::fingerprint::fingerprint;
use crate::query::FeedQuery;
use crate::store::DocumentStore;
use crate::subscription::{channel, FeedSender, Subscription};
use crate::write::{FieldMap, FieldValue};
use async_trait::async_trait;
use kds_types::Snapshot;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// [`DocumentStore`] backed by the Firestore REST API
#[derive(Clone)]
pub struct FirestoreStore {
    config: Arc<FirestoreConfig>,
    http: Client,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("project_id", &self.config.project_id)
            .field("database", &self.config.database)
            .finish()
    }
}

impl FirestoreStore {
    /// Create a store after validating `config`
    pub fn new(config: FirestoreConfig) -> FeedResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("kds-feed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Configuration(format!("HTTP client: {e}")))?;

        info!(
            project = %config.project_id,
            database = %config.database,
            poll_ms = config.poll_interval.as_millis() as u64,
            "Created Firestore store"
        );

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    /// Fetch the current snapshot for a query once
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn fetch(&self, query: &FeedQuery) -> FeedResult<Snapshot> {
        match &query.document {
            Some(id) => self.fetch_document(&query.collection, id).await,
            None => self.run_query(query).await,
        }
    }

    async fn fetch_document(&self, collection: &str, id: &str) -> FeedResult<Snapshot> {
        let url = self.config.url(&self.config.document_name(collection, id));
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(e, self.config.request_timeout))?;

        // a missing singleton is an empty snapshot, not an error
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Snapshot::empty());
        }
        let body = read_json(response, self.config.request_timeout).await?;
        Ok(Snapshot::new(vec![decode_document(&body)?]))
    }

    async fn run_query(&self, query: &FeedQuery) -> FeedResult<Snapshot> {
        let url = self.config.url(&format!("{}:runQuery", self.config.documents_root()));
        let body = run_query_body(query);
        debug!(%url, "runQuery");

        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(e, self.config.request_timeout))?;
        let rows = read_json(response, self.config.request_timeout).await?;

        let Value::Array(rows) = rows else {
            return Err(FeedError::Decode("runQuery response is not an array".into()));
        };

        let mut documents = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in &rows {
            // rows without a document only carry readTime
            let Some(resource) = row.get("document") else {
                continue;
            };
            match decode_document(resource) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping undecodable document: {}", e);
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "Some documents could not be decoded");
        }
        Ok(Snapshot::new(documents))
    }

    #[instrument(skip(self, fields), fields(n = fields.len()))]
    async fn commit(&self, collection: &str, id: &str, fields: &FieldMap, must_exist: bool) -> FeedResult<()> {
        let url = self.config.url(&format!("{}:commit", self.config.documents_root()));
        let body = commit_body(&self.config.document_name(collection, id), fields, must_exist);

        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(e, self.config.request_timeout))?;

        let status = response.status();
        if status.is_success() {
            debug!("Commit applied");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Commit rejected: {}", message);
        if status == StatusCode::NOT_FOUND {
            Err(FeedError::not_found(collection, id))
        } else {
            Err(FeedError::WriteRejected(format!("HTTP {}: {}", status.as_u16(), message)))
        }
    }

    async fn poll(self, query: FeedQuery, sender: FeedSender) {
        let mut last_fingerprint: Option<u32> = None;
        let mut failures: u32 = 0;

        info!(subscription = sender.id(), %query, "Polling feed started");

        loop {
            if sender.is_closed() {
                break;
            }

            match self.fetch(&query).await {
                Ok(snapshot) => {
                    failures = 0;
                    let fp = fingerprint(&snapshot);
                    if last_fingerprint != Some(fp) {
                        debug!(documents = snapshot.len(), fingerprint = fp, "Feed changed");
                        last_fingerprint = Some(fp);
                        if !sender.send_snapshot(snapshot) {
                            break;
                        }
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Err(e) => {
                    // force the next good snapshot through so the error clears downstream
                    last_fingerprint = None;
                    failures += 1;
                    if !sender.send_error(e.clone()) {
                        break;
                    }
                    if !e.is_retryable() {
                        error!("Feed stopped on non-retryable error: {}", e);
                        break;
                    }
                    if !self.config.reconnect.allows(failures) {
                        error!("Feed retries exhausted after {} failures: {}", failures, e);
                        break;
                    }
                    let delay = self.config.reconnect.delay_for(failures);
                    warn!("Feed fetch failed, retrying in {:?} (attempt {}): {}", delay, failures, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        info!(subscription = sender.id(), "Polling feed stopped");
    }
}

async fn read_json(response: reqwest::Response, timeout: std::time::Duration) -> FeedResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(FeedError::Http {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| FeedError::from_reqwest(e, timeout))
}

/// Request body for a collection query
pub fn run_query_body(query: &FeedQuery) -> Value {
    let mut structured = Map::new();
    structured.insert("from".into(), json!([{"collectionId": query.collection}]));
    if let Some(order) = &query.order_by {
        structured.insert(
            "orderBy".into(),
            json!([{
                "field": {"fieldPath": quote_field_path(&order.field)},
                "direction": order.direction.as_firestore()
            }]),
        );
    }
    json!({"structuredQuery": Value::Object(structured)})
}

/// Request body for a single-document commit
///
/// Plain values go through `update` + `updateMask` so untouched fields are
/// kept; server timestamps become `REQUEST_TIME` transforms.
pub fn commit_body(document_name: &str, fields: &FieldMap, must_exist: bool) -> Value {
    let mut values = Map::new();
    let mut mask = Vec::new();
    let mut transforms = Vec::new();

    for (field, value) in fields.iter() {
        match value {
            FieldValue::Value(v) => {
                values.insert(field.to_string(), encode_value(v));
                mask.push(quote_field_path(field));
            }
            FieldValue::ServerTimestamp => transforms.push(json!({
                "fieldPath": quote_field_path(field),
                "setToServerValue": "REQUEST_TIME"
            })),
        }
    }

    let mut write = Map::new();
    write.insert("update".into(), json!({"name": document_name, "fields": values}));
    write.insert("updateMask".into(), json!({"fieldPaths": mask}));
    if !transforms.is_empty() {
        write.insert("updateTransforms".into(), Value::Array(transforms));
    }
    if must_exist {
        write.insert("currentDocument".into(), json!({"exists": true}));
    }

    json!({"writes": [Value::Object(write)]})
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    fn subscribe(&self, query: FeedQuery) -> FeedResult<Subscription> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FeedError::Configuration(format!("no async runtime: {e}")))?;
        let (sender, subscription) = channel();
        let task = runtime.spawn(self.clone().poll(query, sender));
        Ok(subscription.with_task(task))
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()> {
        self.commit(collection, id, &fields, true).await
    }

    async fn upsert(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()> {
        self.commit(collection, id, &fields, false).await
    }
}
