//! High-level client for the kitchen display
//!
//! This crate wires a [`DocumentStore`](kds_feed::DocumentStore) to a
//! [`BoardState`](kds_board::BoardState): it subscribes to the orders feed and
//! the store gate, applies every snapshot, raises the new-order alarm and
//! performs the two writes the kitchen makes (mark ready, open/close store).
//!
//! # Quick Start
//!
//! ```no_run
//! use kds_client::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FirestoreStore::new(FirestoreConfig::new("my-project"))?);
//!     let mut client = KitchenClient::builder().connect(store).await?;
//!
//!     let mut events = client.events().unwrap();
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             DisplayEvent::Alarm(AlarmEvent::Raised { order, .. }) => {
//!                 println!("NEW ORDER {}", order.short_id());
//!                 client.acknowledge_alarm();
//!             }
//!             DisplayEvent::Feed(FeedEvent::Failed { message, .. }) => eprintln!("{}", message),
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod events;
pub mod gate;
pub mod prelude;

// Re-export main types
pub use builder::{ConfigError, KitchenClientBuilder, StoreGateConfig};
pub use client::{KitchenClient, FEED_ERROR_MESSAGE};
pub use error::{ClientError, ClientResult};
pub use events::{AlarmEvent, DisplayEvent, EventReceiver, FeedEvent, GateEvent};
pub use gate::{StoreGate, StoreStatus};
