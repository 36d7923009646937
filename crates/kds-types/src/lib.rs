//! Shared types for the kitchen display system
//!
//! This crate provides the canonical order model used across the workspace.
//! Documents arrive from the store with loosely typed, aliased fields; they are
//! normalized exactly once into an [`Order`] so that the rest of the system
//! never looks at raw field names again.
//!
//! # Key Types
//!
//! - [`Document`], [`Snapshot`] - Raw store documents and full feed snapshots
//! - [`Order`], [`LineItem`], [`Customer`] - Canonical order model
//! - [`OrderStatus`] - Pending / ready / delivered with dual encodings
//! - [`PaymentMethod`], [`DeliveryMethod`] - Normalized order attributes
//! - [`KdsError`] - Error types

pub mod document;
pub mod error;
pub mod fields;
pub mod order;
pub mod payment;
pub mod status;
pub mod timestamp;

// Re-export commonly used types
pub use document::*;
pub use error::*;
pub use order::*;
pub use payment::*;
pub use status::*;
pub use timestamp::{parse_timestamp, parse_timestamp_in, timestamp_to_value};

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
