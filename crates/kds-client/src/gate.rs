//! Store open/closed gate
//!
//! The gate is a singleton document holding a boolean flag. While the flag is
//! false the kitchen views are hidden behind a closed-store placeholder.
//!
//! Reading rules:
//! - document missing: the store is open, and the caller creates the document
//! - flag not a boolean: open
//! - subscription error: open, with an error message for the operator

use kds_types::Snapshot;
use serde_json::Value;
use std::fmt;

/// Message shown when the gate document cannot be read
pub const GATE_ERROR_MESSAGE: &str = "No se pudo leer el estado de la tienda.";

/// Store availability as seen by the kitchen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    /// No reading yet
    #[default]
    Loading,
    Open,
    Closed,
}

impl StoreStatus {
    /// Returns true once the store is known to be open
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Map a flag value
    pub fn from_flag(open: bool) -> Self {
        if open {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Cargando"),
            Self::Open => write!(f, "Abierta"),
            Self::Closed => write!(f, "Cerrada"),
        }
    }
}

/// What a gate snapshot said
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReading {
    /// Document does not exist yet
    Missing,
    /// Document exists with this effective status
    Status(StoreStatus),
}

/// Interpret a gate snapshot
pub fn read_gate(snapshot: &Snapshot, document: &str, field: &str) -> GateReading {
    match snapshot.find(document) {
        None => GateReading::Missing,
        Some(doc) => match doc.get(field) {
            Some(Value::Bool(open)) => GateReading::Status(StoreStatus::from_flag(*open)),
            _ => GateReading::Status(StoreStatus::Open),
        },
    }
}

/// Result of applying one gate update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateUpdate {
    /// Status differs from the previous one
    pub changed: bool,
    /// The gate document is missing and should be created open
    pub create_open: bool,
}

/// Current gate state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreGate {
    status: StoreStatus,
    error: Option<String>,
}

impl StoreGate {
    /// Create a gate that has not read anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate for clients configured without one
    pub fn always_open() -> Self {
        Self {
            status: StoreStatus::Open,
            error: None,
        }
    }

    /// Apply a snapshot of the gate document
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, document: &str, field: &str) -> GateUpdate {
        let (status, create_open) = match read_gate(snapshot, document, field) {
            GateReading::Missing => (StoreStatus::Open, true),
            GateReading::Status(status) => (status, false),
        };
        let changed = self.status != status;
        self.status = status;
        if !create_open {
            self.error = None;
        }
        GateUpdate {
            changed,
            create_open,
        }
    }

    /// Subscription failed: fall back to open and keep the message
    pub fn apply_error(&mut self) -> bool {
        let changed = self.status != StoreStatus::Open;
        self.status = StoreStatus::Open;
        self.error = Some(GATE_ERROR_MESSAGE.to_string());
        changed
    }

    pub fn status(&self) -> StoreStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Last read error, cleared by the next readable snapshot
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kds_types::Document;
    use serde_json::json;

    fn gate_snapshot(data: Option<Value>) -> Snapshot {
        match data {
            Some(v) => Snapshot::new(vec![Document::from_value("tienda", v).unwrap()]),
            None => Snapshot::empty(),
        }
    }

    #[test]
    fn test_read_gate() {
        let read = |data| read_gate(&gate_snapshot(data), "tienda", "estadoTienda");
        assert_eq!(read(None), GateReading::Missing);
        assert_eq!(
            read(Some(json!({"estadoTienda": false}))),
            GateReading::Status(StoreStatus::Closed)
        );
        assert_eq!(
            read(Some(json!({"estadoTienda": true}))),
            GateReading::Status(StoreStatus::Open)
        );
        // non-boolean reads as open
        assert_eq!(
            read(Some(json!({"estadoTienda": "false"}))),
            GateReading::Status(StoreStatus::Open)
        );
        assert_eq!(read(Some(json!({}))), GateReading::Status(StoreStatus::Open));
    }

    #[test]
    fn test_missing_document_opens_and_requests_creation() {
        let mut gate = StoreGate::new();
        assert_eq!(gate.status(), StoreStatus::Loading);

        let update = gate.apply_snapshot(&gate_snapshot(None), "tienda", "estadoTienda");
        assert!(update.create_open);
        assert!(update.changed);
        assert!(gate.is_open());
    }

    #[test]
    fn test_error_falls_back_to_open() {
        let mut gate = StoreGate::new();
        gate.apply_snapshot(
            &gate_snapshot(Some(json!({"estadoTienda": false}))),
            "tienda",
            "estadoTienda",
        );
        assert_eq!(gate.status(), StoreStatus::Closed);

        assert!(gate.apply_error());
        assert_eq!(gate.status(), StoreStatus::Open);
        assert_eq!(gate.error(), Some(GATE_ERROR_MESSAGE));

        let update = gate.apply_snapshot(
            &gate_snapshot(Some(json!({"estadoTienda": true}))),
            "tienda",
            "estadoTienda",
        );
        assert!(!update.changed);
        assert!(gate.error().is_none());
    }

    #[test]
    fn test_status_display() {
        assert!(!StoreStatus::Loading.is_open());
        assert!(!StoreStatus::Closed.is_open());
        assert_eq!(StoreStatus::Closed.to_string(), "Cerrada");
    }
}
