//! Live document feeds for the kitchen display
//!
//! This crate abstracts the backing document store behind [`DocumentStore`]:
//! a live, cancellable [`Subscription`] that yields full [`Snapshot`]s, plus
//! field writes with server-assigned timestamps.
//!
//! # Stores
//!
//! - [`MemoryStore`] - in-process collections with instant fan-out (tests, demo mode)
//! - [`FirestoreStore`] - Firestore REST v1, polled and fingerprinted
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use kds_feed::{DocumentStore, FeedQuery, FirestoreConfig, FirestoreStore, OrderDirection};
//!
//! # async fn run() -> Result<(), kds_feed::FeedError> {
//! let store = FirestoreStore::new(FirestoreConfig::new("my-project"))?;
//! let mut feed = store.subscribe(
//!     FeedQuery::collection("pedidos").order_by("fecha", OrderDirection::Ascending),
//! )?;
//!
//! while let Some(item) = feed.next().await {
//!     match item {
//!         Ok(snapshot) => println!("{} orders", snapshot.len()),
//!         Err(e) => eprintln!("feed error: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Snapshot`]: kds_types::Snapshot

pub mod backoff;
pub mod error;
pub mod fingerprint;
pub mod firestore;
pub mod memory;
pub mod query;
pub mod store;
pub mod subscription;
pub mod write;

pub use backoff::ReconnectConfig;
pub use error::{FeedError, FeedResult};
pub use fingerprint::fingerprint;
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use query::{FeedQuery, OrderBy, OrderDirection};
pub use store::DocumentStore;
pub use subscription::{channel, FeedItem, FeedSender, Subscription};
pub use write::{FieldMap, FieldValue};
