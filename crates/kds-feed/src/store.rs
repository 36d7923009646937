//! Document store abstraction
//!
//! The trait keeps the kitchen client independent of the backing store, so
//! tests and the demo mode run on [`MemoryStore`](crate::MemoryStore) while
//! production talks to Firestore.

use crate::error::FeedResult;
use crate::query::FeedQuery;
use crate::subscription::Subscription;
use crate::write::FieldMap;
use async_trait::async_trait;

/// A store that pushes full snapshots and accepts field writes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Start a live feed
    ///
    /// The current snapshot is delivered first, then one snapshot per change.
    fn subscribe(&self, query: FeedQuery) -> FeedResult<Subscription>;

    /// Update fields of an existing document
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn update_fields(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()>;

    /// Merge fields into a document, creating it if needed
    async fn upsert(&self, collection: &str, id: &str, fields: FieldMap) -> FeedResult<()>;
}
