//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use kds_client::prelude::*;
//! ```

// Client
pub use crate::builder::{ConfigError, KitchenClientBuilder, StoreGateConfig};
pub use crate::client::KitchenClient;
pub use crate::error::{ClientError, ClientResult};
pub use crate::events::{AlarmEvent, DisplayEvent, EventReceiver, FeedEvent, GateEvent};
pub use crate::gate::{StoreGate, StoreStatus};

// Order model
pub use kds_types::{
    Customer, DeliveryMethod, Document, LineItem, Order, OrderStatus, PaymentMethod, Snapshot,
};

// Board
pub use kds_board::{
    BaselinePolicy, BoardState, DateRange, FeedState, PaymentDrillDown, PaymentSummary,
    ProductCount, SalesReport,
};

// Stores
pub use kds_feed::{
    DocumentStore, FeedError, FeedQuery, FieldMap, FirestoreConfig, FirestoreStore, MemoryStore,
    OrderDirection, ReconnectConfig,
};

// Money
pub use rust_decimal::Decimal;
