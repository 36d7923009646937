//! Live feed reconciliation and the new-order alarm
//!
//! Every feed update carries the complete list of orders. The reconciler
//! replaces its working set wholesale and diffs ids against the previous
//! set to find orders that just arrived in the kitchen.
//!
//! # State Machine
//!
//! ```text
//! AwaitingBaseline → Live ↔ Stale
//! ```
//!
//! The alarm is orthogonal to the feed state: a new pending order raises it,
//! and only an explicit acknowledgment (or teardown) lowers it.

use kds_types::{Order, Snapshot};
use std::collections::HashSet;

/// How the first snapshot of a subscription is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePolicy {
    /// The first snapshot only establishes which orders are already known
    #[default]
    FirstSnapshotIsBaseline,
    /// The first snapshot is compared against an empty set, so every pending
    /// order in it raises the alarm
    CompareAgainstEmpty,
}

/// Feed health as seen by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    /// No snapshot received yet
    #[default]
    AwaitingBaseline,
    /// Receiving snapshots normally
    Live,
    /// Last update was an error; the working set is the last good snapshot
    Stale,
}

/// Result of applying one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Pending orders whose id was not in the previous snapshot, in feed order
    pub new_pending: Vec<Order>,
    /// Order surfaced for acknowledgment by this update, if the alarm was raised
    pub surfaced: Option<Order>,
    /// True when this snapshot only established the baseline
    pub baseline: bool,
}

impl ReconcileOutcome {
    /// Returns true if this update raised the alarm
    pub fn raised_alarm(&self) -> bool {
        self.surfaced.is_some()
    }
}

/// Orders in `next` that are pending and whose id does not appear in `previous`
pub fn new_pending<'a>(previous: &[Order], next: &'a [Order]) -> Vec<&'a Order> {
    let known: HashSet<&str> = previous.iter().map(|o| o.id.as_str()).collect();
    next.iter()
        .filter(|o| o.status.is_pending() && !known.contains(o.id.as_str()))
        .collect()
}

/// Working set of orders plus alarm state
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    policy: BaselinePolicy,
    state: FeedState,
    orders: Vec<Order>,
    alarm_active: bool,
    surfaced: Option<Order>,
    feed_error: Option<String>,
    /// Number of snapshots applied
    updates: u64,
}

impl Reconciler {
    /// Create a reconciler with the default baseline policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a specific baseline policy
    pub fn with_policy(policy: BaselinePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Normalize and apply a feed snapshot
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> ReconcileOutcome {
        self.apply_orders(Order::from_snapshot(snapshot))
    }

    /// Apply an already normalized snapshot
    pub fn apply_orders(&mut self, orders: Vec<Order>) -> ReconcileOutcome {
        let baseline = self.state == FeedState::AwaitingBaseline
            && self.policy == BaselinePolicy::FirstSnapshotIsBaseline;

        let arrived: Vec<Order> = if baseline {
            Vec::new()
        } else {
            new_pending(&self.orders, &orders)
                .into_iter()
                .cloned()
                .collect()
        };

        self.orders = orders;
        self.state = FeedState::Live;
        self.feed_error = None;
        self.updates += 1;

        let surfaced = match arrived.last() {
            Some(last) if !self.alarm_active => {
                self.enter_alarm(last.clone());
                Some(last.clone())
            }
            _ => None,
        };

        ReconcileOutcome {
            new_pending: arrived,
            surfaced,
            baseline,
        }
    }

    /// Record a feed failure, keeping the last good working set
    pub fn apply_feed_error(&mut self, message: impl Into<String>) {
        self.feed_error = Some(message.into());
        if self.state == FeedState::Live {
            self.state = FeedState::Stale;
        }
    }

    /// Raise the alarm for `order`
    ///
    /// No-op while an alarm is already active, so a second arrival never
    /// replaces the surfaced order.
    pub fn enter_alarm(&mut self, order: Order) {
        if self.alarm_active {
            return;
        }
        self.alarm_active = true;
        self.surfaced = Some(order);
    }

    /// Operator acknowledgment: stop the alarm and drop the surfaced order
    pub fn acknowledge(&mut self) -> Option<Order> {
        self.alarm_active = false;
        self.surfaced.take()
    }

    /// View teardown: clears the alarm, keeps the working set
    pub fn teardown(&mut self) {
        self.alarm_active = false;
        self.surfaced = None;
    }

    /// Returns true while the alarm waits for acknowledgment
    pub fn is_alarm_active(&self) -> bool {
        self.alarm_active
    }

    /// Order surfaced by the active alarm
    pub fn surfaced(&self) -> Option<&Order> {
        self.surfaced.as_ref()
    }

    /// Full working set in feed order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Pending orders in feed order
    pub fn pending(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status.is_pending())
    }

    /// Ready or delivered orders in feed order
    pub fn completed(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status.is_completed())
    }

    /// Find an order by id
    pub fn find(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Current feed error message
    pub fn feed_error(&self) -> Option<&str> {
        self.feed_error.as_deref()
    }

    /// Current feed state
    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Baseline policy in effect
    pub fn policy(&self) -> BaselinePolicy {
        self.policy
    }

    /// Number of snapshots applied so far
    pub fn update_count(&self) -> u64 {
        self.updates
    }
}
