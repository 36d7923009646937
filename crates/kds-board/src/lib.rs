//! Order board engine for the kitchen display
//!
//! This crate holds the pure logic behind the kitchen screen: reconciling
//! full feed snapshots, the new-order alarm, date-range filtering and sales
//! aggregation. It has no runtime or I/O dependencies; callers feed it
//! snapshots and read views back.
//!
//! # Example
//!
//! ```
//! use kds_board::{BoardState, DateRange};
//! use kds_types::{Document, Snapshot};
//! use serde_json::json;
//!
//! let mut board = BoardState::new();
//! let doc = Document::from_value("a1", json!({"status": "1"})).unwrap();
//! board.apply_snapshot(&Snapshot::new(vec![doc]), chrono::Utc::now());
//!
//! assert_eq!(board.pending().len(), 1);
//! assert_eq!(board.range(), DateRange::Today);
//! ```

pub mod aggregate;
pub mod board;
pub mod range;
pub mod reconcile;

// Re-export main types
pub use aggregate::{
    aggregate, drill_down, rank_products, PaymentDrillDown, PaymentSummary, ProductCount,
    SalesReport,
};
pub use board::{BoardState, Highlight, HIGHLIGHT_WINDOW_MS};
pub use range::{filter_by_range, DateRange};
pub use reconcile::{new_pending, BaselinePolicy, FeedState, ReconcileOutcome, Reconciler};
