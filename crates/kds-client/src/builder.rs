//! Client Builder Pattern
//!
//! Fluent configuration for [`KitchenClient`](crate::KitchenClient) with
//! defaults matching the production schema: orders live in `pedidos`, sorted
//! by `fecha`, and the store flag lives at `config/tienda.estadoTienda`.
//!
//! # Example
//!
//! ```
//! use kds_client::builder::KitchenClientBuilder;
//! use kds_board::BaselinePolicy;
//!
//! let builder = KitchenClientBuilder::new()
//!     .with_orders_collection("pedidos")
//!     .with_baseline_policy(BaselinePolicy::CompareAgainstEmpty)
//!     .without_store_gate();
//! assert!(builder.validate().is_ok());
//! assert!(builder.store_gate.is_none());
//! ```

use kds_board::BaselinePolicy;
use kds_feed::{FeedQuery, OrderDirection};

/// Default orders collection
pub const DEFAULT_ORDERS_COLLECTION: &str = "pedidos";
/// Default ordering field for the orders feed
pub const DEFAULT_ORDER_BY: &str = kds_types::CREATED_AT_FIELD;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Orders collection name is empty
    #[error("orders collection must not be empty")]
    EmptyCollection,

    /// Ordering field is empty
    #[error("order-by field must not be empty")]
    EmptyOrderBy,

    /// Store gate location is incomplete
    #[error("store gate location is incomplete: {0}")]
    InvalidStoreGate(String),
}

/// Location of the store open/closed flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreGateConfig {
    pub collection: String,
    pub document: String,
    /// Boolean field holding the flag
    pub field: String,
    /// Server timestamp written alongside every change
    pub updated_at_field: String,
}

impl Default for StoreGateConfig {
    fn default() -> Self {
        Self {
            collection: "config".to_string(),
            document: "tienda".to_string(),
            field: "estadoTienda".to_string(),
            updated_at_field: "updatedAt".to_string(),
        }
    }
}

impl StoreGateConfig {
    /// Create a gate at a custom location
    pub fn new(
        collection: impl Into<String>,
        document: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            document: document.into(),
            field: field.into(),
            ..Default::default()
        }
    }

    /// Query that watches the gate document
    pub fn query(&self) -> FeedQuery {
        FeedQuery::document(&self.collection, &self.document)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("collection", &self.collection),
            ("document", &self.document),
            ("field", &self.field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidStoreGate(format!("empty {}", name)));
            }
        }
        Ok(())
    }
}

/// Builder for configuring a kitchen client
#[derive(Debug, Clone)]
pub struct KitchenClientBuilder {
    /// Collection holding the orders
    pub orders_collection: String,

    /// Field the orders feed is sorted by
    pub order_by: String,

    /// Sort direction of the orders feed
    pub direction: OrderDirection,

    /// How the first snapshot is treated by the alarm
    pub baseline_policy: BaselinePolicy,

    /// Store gate location, `None` to run without a gate
    pub store_gate: Option<StoreGateConfig>,
}

impl Default for KitchenClientBuilder {
    fn default() -> Self {
        Self {
            orders_collection: DEFAULT_ORDERS_COLLECTION.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            direction: OrderDirection::Ascending,
            baseline_policy: BaselinePolicy::default(),
            store_gate: Some(StoreGateConfig::default()),
        }
    }
}

impl KitchenClientBuilder {
    /// Create a builder with production defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the orders collection
    pub fn with_orders_collection(mut self, collection: impl Into<String>) -> Self {
        self.orders_collection = collection.into();
        self
    }

    /// Set the ordering field and direction
    pub fn with_order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = field.into();
        self.direction = direction;
        self
    }

    /// Set the baseline policy
    ///
    /// # Example
    ///
    /// ```
    /// use kds_client::builder::KitchenClientBuilder;
    /// use kds_board::BaselinePolicy;
    ///
    /// let builder = KitchenClientBuilder::new()
    ///     .with_baseline_policy(BaselinePolicy::CompareAgainstEmpty);
    /// assert_eq!(builder.baseline_policy, BaselinePolicy::CompareAgainstEmpty);
    /// ```
    pub fn with_baseline_policy(mut self, policy: BaselinePolicy) -> Self {
        self.baseline_policy = policy;
        self
    }

    /// Watch the store gate at a custom location
    pub fn with_store_gate(mut self, gate: StoreGateConfig) -> Self {
        self.store_gate = Some(gate);
        self
    }

    /// Run without a store gate; the store always reads as open
    pub fn without_store_gate(mut self) -> Self {
        self.store_gate = None;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orders_collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }
        if self.order_by.trim().is_empty() {
            return Err(ConfigError::EmptyOrderBy);
        }
        if let Some(gate) = &self.store_gate {
            gate.validate()?;
        }
        Ok(())
    }

    /// Query that watches the orders collection
    pub fn orders_query(&self) -> FeedQuery {
        FeedQuery::collection(&self.orders_collection).order_by(&self.order_by, self.direction)
    }
}
