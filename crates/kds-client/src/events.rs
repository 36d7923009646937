//! Events published by the kitchen client
//!
//! The client owns the board; events tell the surface *that* something
//! changed. Views are read back from the board through the client.

use crate::gate::StoreStatus;
use kds_feed::FeedError;
use kds_types::Order;
use tokio::sync::mpsc;

/// Orders feed events
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A snapshot was applied to the board
    Updated {
        /// Pending orders after the update
        pending: usize,
        /// Ready and delivered orders after the update
        completed: usize,
        /// True when this snapshot only established the baseline
        baseline: bool,
    },
    /// The feed failed; the board keeps its last good snapshot
    Failed {
        /// Operator-facing message
        message: String,
        /// Underlying error
        error: FeedError,
    },
    /// A good snapshot arrived after a failure
    Recovered,
    /// The feed stream ended
    Closed,
}

/// Alarm lifecycle events
#[derive(Debug, Clone)]
pub enum AlarmEvent {
    /// New pending order surfaced; the alarm is now active
    Raised {
        /// Surfaced order
        order: Order,
        /// All new pending orders in the same update
        new_pending: usize,
    },
    /// Operator acknowledged the alarm
    Acknowledged {
        /// Order that was surfaced
        order_id: String,
    },
}

/// Store gate events
#[derive(Debug, Clone)]
pub enum GateEvent {
    /// Effective store status changed
    StatusChanged { status: StoreStatus },
    /// Gate document could not be read; the store reads as open
    ReadFailed { message: String },
    /// Gate document was missing and has been created open
    Created,
}

/// All events the client can emit
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    Feed(FeedEvent),
    Alarm(AlarmEvent),
    Gate(GateEvent),
    /// Order marked ready by this client
    OrderReady { order_id: String },
    /// One-shot operator notice (write failures)
    Notice { message: String },
    /// Client shut down
    Shutdown,
}

impl DisplayEvent {
    /// Returns true if the surface should redraw the order views
    pub fn touches_orders(&self) -> bool {
        matches!(
            self,
            Self::Feed(FeedEvent::Updated { .. }) | Self::Feed(FeedEvent::Recovered) | Self::Alarm(_)
        )
    }
}

impl From<FeedEvent> for DisplayEvent {
    fn from(event: FeedEvent) -> Self {
        Self::Feed(event)
    }
}

impl From<AlarmEvent> for DisplayEvent {
    fn from(event: AlarmEvent) -> Self {
        Self::Alarm(event)
    }
}

impl From<GateEvent> for DisplayEvent {
    fn from(event: GateEvent) -> Self {
        Self::Gate(event)
    }
}

/// Event sender
pub type EventSender = mpsc::UnboundedSender<DisplayEvent>;

/// Event receiver
pub type EventReceiver = mpsc::UnboundedReceiver<DisplayEvent>;
