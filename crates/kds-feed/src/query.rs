//! Feed query descriptions

use std::fmt;

/// Sort direction for collection queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    /// Wire name used by the Firestore REST API
    pub fn as_firestore(&self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

/// What a subscription watches: a whole collection or a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Collection name
    pub collection: String,
    /// Single document id (for singleton documents such as configuration)
    pub document: Option<String>,
    /// Collection ordering; documents without the field are excluded
    pub order_by: Option<OrderBy>,
}

impl FeedQuery {
    /// Watch every document in a collection
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            document: None,
            order_by: None,
        }
    }

    /// Watch a single document
    pub fn document(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            document: Some(id.into()),
            order_by: None,
        }
    }

    /// Order a collection query by `field`
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Returns true for single-document queries
    pub fn is_document(&self) -> bool {
        self.document.is_some()
    }
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.document, &self.order_by) {
            (Some(id), _) => write!(f, "{}/{}", self.collection, id),
            (None, Some(order)) => write!(
                f,
                "{} orderBy {} {}",
                self.collection,
                order.field,
                order.direction.as_firestore().to_lowercase()
            ),
            (None, None) => write!(f, "{}", self.collection),
        }
    }
}
