//! Kitchen screen view state
//!
//! [`BoardState`] owns everything the operator surface shows: the reconciled
//! working set, the alarm, the report filters and the current selection.
//! Every change goes through a named transition; views are recomputed from
//! scratch on demand.

use crate::aggregate::{aggregate, drill_down, PaymentDrillDown, SalesReport};
use crate::range::{filter_by_range, DateRange};
use crate::reconcile::{BaselinePolicy, FeedState, ReconcileOutcome, Reconciler};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use kds_types::{Order, Snapshot};

/// How long a freshly surfaced order stays highlighted
pub const HIGHLIGHT_WINDOW_MS: i64 = 4_000;

/// Freshly arrived order highlight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub order_id: String,
    pub since: DateTime<Utc>,
}

/// Complete view state of the kitchen screen
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    reconciler: Reconciler,
    range: DateRange,
    selected_payment: Option<String>,
    selected_order: Option<String>,
    notice: Option<String>,
    highlight: Option<Highlight>,
}

impl BoardState {
    /// Create an empty board with the default baseline policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a specific baseline policy
    pub fn with_policy(policy: BaselinePolicy) -> Self {
        Self {
            reconciler: Reconciler::with_policy(policy),
            ..Self::default()
        }
    }

    // ========================================================================
    // Feed Transitions
    // ========================================================================

    /// Apply a feed snapshot received at `now`
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> ReconcileOutcome {
        let outcome = self.reconciler.apply_snapshot(snapshot);
        if let Some(order) = &outcome.surfaced {
            self.highlight = Some(Highlight {
                order_id: order.id.clone(),
                since: now,
            });
        }
        outcome
    }

    /// Record a feed error; the working set stays frozen
    pub fn set_feed_error(&mut self, message: impl Into<String>) {
        self.reconciler.apply_feed_error(message);
    }

    /// Operator acknowledged the new-order alarm
    pub fn acknowledge_alarm(&mut self) -> Option<Order> {
        self.reconciler.acknowledge()
    }

    /// View is going away: silence the alarm and drop transient UI state
    pub fn teardown(&mut self) {
        self.reconciler.teardown();
        self.highlight = None;
        self.notice = None;
    }

    // ========================================================================
    // Report Filters
    // ========================================================================

    /// Select a preset range
    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    /// Select a custom range
    pub fn set_custom_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.range = DateRange::custom(start, end);
    }

    /// Open the drill-down for a payment method key
    pub fn select_payment_method(&mut self, key: impl Into<String>) {
        self.selected_payment = Some(key.into());
    }

    /// Close the payment drill-down
    pub fn clear_payment_method(&mut self) {
        self.selected_payment = None;
    }

    /// Open the detail of one order
    pub fn select_order(&mut self, id: impl Into<String>) {
        self.selected_order = Some(id.into());
    }

    /// Close the order detail
    pub fn clear_order(&mut self) {
        self.selected_order = None;
    }

    // ========================================================================
    // Notices
    // ========================================================================

    /// Queue a one-shot notice (replaces any unread one)
    pub fn push_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Take the pending notice, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Peek at the pending notice
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Pending orders, oldest first
    pub fn pending(&self) -> Vec<&Order> {
        self.reconciler.pending().collect()
    }

    /// Ready and delivered orders, oldest first
    pub fn completed(&self) -> Vec<&Order> {
        self.reconciler.completed().collect()
    }

    /// Completed orders inside the selected range
    pub fn completed_in_range<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<&Order> {
        filter_by_range(self.reconciler.completed(), &self.range, now)
    }

    /// Sales report for the selected range
    pub fn report<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SalesReport {
        aggregate(self.completed_in_range(now))
    }

    /// Drill-down for the selected payment method, if one is selected and present
    pub fn drill_down<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<PaymentDrillDown> {
        let key = self.selected_payment.as_deref()?;
        drill_down(self.completed_in_range(now), key)
    }

    /// Selected order, if it is still in the working set
    pub fn selected_order(&self) -> Option<&Order> {
        self.selected_order
            .as_deref()
            .and_then(|id| self.reconciler.find(id))
    }

    /// Selected payment method key
    pub fn selected_payment(&self) -> Option<&str> {
        self.selected_payment.as_deref()
    }

    /// Current range
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Returns true while the alarm is active
    pub fn is_alarm_active(&self) -> bool {
        self.reconciler.is_alarm_active()
    }

    /// Order surfaced by the alarm
    pub fn surfaced(&self) -> Option<&Order> {
        self.reconciler.surfaced()
    }

    /// Returns true if `order_id` arrived within the highlight window
    pub fn is_highlighted(&self, order_id: &str, now: DateTime<Utc>) -> bool {
        self.highlight.as_ref().is_some_and(|h| {
            h.order_id == order_id && now - h.since < Duration::milliseconds(HIGHLIGHT_WINDOW_MS)
        })
    }

    /// Current feed error
    pub fn feed_error(&self) -> Option<&str> {
        self.reconciler.feed_error()
    }

    /// Feed state
    pub fn feed_state(&self) -> FeedState {
        self.reconciler.state()
    }

    /// Full working set
    pub fn orders(&self) -> &[Order] {
        self.reconciler.orders()
    }

    /// Underlying reconciler
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use kds_types::Document;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn snapshot(docs: Vec<(&str, serde_json::Value)>) -> Snapshot {
        Snapshot::new(
            docs.into_iter()
                .map(|(id, v)| Document::from_value(id, v).unwrap())
                .collect(),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_alarm_and_highlight() {
        let mut board = BoardState::new();
        board.apply_snapshot(&snapshot(vec![("a", json!({"status": "1"}))]), now());
        assert!(!board.is_alarm_active());

        let outcome = board.apply_snapshot(
            &snapshot(vec![("a", json!({"status": "1"})), ("b", json!({"status": "pendiente"}))]),
            now(),
        );
        assert!(outcome.raised_alarm());
        assert!(board.is_alarm_active());
        assert!(board.is_highlighted("b", now() + Duration::seconds(3)));
        assert!(!board.is_highlighted("b", now() + Duration::seconds(4)));
        assert!(!board.is_highlighted("a", now()));

        let acked = board.acknowledge_alarm();
        assert_eq!(acked.map(|o| o.id), Some("b".into()));
        assert!(!board.is_alarm_active());
        // highlight outlives the acknowledgment
        assert!(board.is_highlighted("b", now()));
    }

    #[test]
    fn test_report_and_drill_down() {
        let tz = FixedOffset::west_opt(6 * 3600).unwrap();
        let local_now = now().with_timezone(&tz);
        let mut board = BoardState::new();
        board.apply_snapshot(
            &snapshot(vec![
                ("p", json!({"status": "1", "carrito": [{"nombre": "Taco", "cantidad": 9}]})),
                ("r1", json!({
                    "status": "2",
                    "fechaListo": "2025-03-14T17:00:00Z",
                    "metodoPago": "Efectivo",
                    "carrito": [{"nombre": "Taco", "cantidad": 2, "precio": 20}]
                })),
                ("r2", json!({
                    "status": 3,
                    "fechaListo": "2025-03-01T17:00:00Z",
                    "metodoPago": "Tarjeta",
                    "total": 500,
                    "carrito": [{"nombre": "Torta", "cantidad": 1}]
                })),
            ]),
            now(),
        );

        assert_eq!(board.pending().len(), 1);
        assert_eq!(board.completed().len(), 2);

        let today = board.report(&local_now);
        assert_eq!(today.total_orders, 1);
        assert_eq!(today.total_revenue, dec!(40));

        board.set_range(DateRange::AllTime);
        let all = board.report(&local_now);
        assert_eq!(all.total_orders, 2);
        assert_eq!(all.total_revenue, dec!(540));

        board.select_payment_method("tarjeta");
        let detail = board.drill_down(&local_now).unwrap();
        assert_eq!(detail.summary.revenue, dec!(500));

        board.set_custom_dates(NaiveDate::from_ymd_opt(2025, 3, 10), None);
        assert!(board.range().is_custom());
        assert!(board.drill_down(&local_now).is_none());

        board.clear_payment_method();
        assert!(board.selected_payment().is_none());
    }

    #[test]
    fn test_feed_error_freezes_views() {
        let mut board = BoardState::new();
        board.apply_snapshot(&snapshot(vec![("a", json!({"status": "1"}))]), now());
        board.set_feed_error("No se pudieron cargar los pedidos. Revisa la conexión o Firestore.");

        assert_eq!(board.feed_state(), FeedState::Stale);
        assert_eq!(board.pending().len(), 1);

        board.apply_snapshot(&snapshot(vec![]), now());
        assert!(board.feed_error().is_none());
        assert!(board.pending().is_empty());
    }

    #[test]
    fn test_selection_follows_working_set() {
        let mut board = BoardState::new();
        board.apply_snapshot(&snapshot(vec![("a", json!({"status": "2"}))]), now());
        board.select_order("a");
        assert_eq!(board.selected_order().map(|o| o.id.as_str()), Some("a"));

        board.apply_snapshot(&snapshot(vec![]), now());
        assert!(board.selected_order().is_none());

        board.clear_order();
        assert!(board.selected_order().is_none());
    }

    #[test]
    fn test_notice_is_one_shot() {
        let mut board = BoardState::new();
        board.push_notice("No se pudo marcar como listo");
        assert_eq!(board.notice(), Some("No se pudo marcar como listo"));
        assert!(board.take_notice().is_some());
        assert!(board.take_notice().is_none());
    }

    #[test]
    fn test_teardown() {
        let mut board = BoardState::with_policy(BaselinePolicy::CompareAgainstEmpty);
        board.apply_snapshot(&snapshot(vec![("a", json!({"status": "1"}))]), now());
        board.push_notice("x");
        assert!(board.is_alarm_active());

        board.teardown();
        assert!(!board.is_alarm_active());
        assert!(!board.is_highlighted("a", now()));
        assert!(board.notice().is_none());
        assert_eq!(board.orders().len(), 1);
    }
}
