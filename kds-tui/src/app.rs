//! Application state and key handling

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, Utc};
use crossterm::event::KeyCode;
use kds_board::{BoardState, DateRange, FeedState, PaymentDrillDown, SalesReport};
use kds_client::{AlarmEvent, DisplayEvent, FeedEvent, GateEvent, KitchenClient, StoreGate};
use kds_types::Order;
use ratatui::style::Color;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::warn;

/// Kitchen palette: dark background, warm accents
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Rgb(10, 14, 20);
    pub const FG: Color = Color::Rgb(203, 213, 225);
    pub const ACCENT: Color = Color::Rgb(0, 217, 255);
    pub const HIGHLIGHT: Color = Color::Rgb(255, 215, 0);
    pub const MUTED: Color = Color::Rgb(100, 116, 139);
    pub const BORDER: Color = Color::Rgb(42, 46, 56);
    pub const SUCCESS: Color = Color::Rgb(52, 211, 153);
    pub const WARNING: Color = Color::Rgb(251, 191, 36);
    pub const ERROR: Color = Color::Rgb(248, 113, 113);
    /// Card header for home delivery
    pub const DELIVERY: Color = Color::Rgb(52, 211, 153);
    /// Card header for pickup
    pub const PICKUP: Color = Color::Rgb(251, 191, 36);
}

const BELL_INTERVAL: Duration = Duration::from_secs(1);
const NOTICE_TTL: Duration = Duration::from_secs(6);
const ACTIVITY_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Pending,
    Ready,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Pending => "Pendientes",
            Tab::Ready => "Listos",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Pending, Tab::Ready]
    }
}

/// Side effect requested by a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    MarkReady(String),
    SetStoreOpen(bool),
}

#[derive(Debug, Clone)]
pub struct Activity {
    pub at: DateTime<Local>,
    pub message: String,
}

/// Everything one frame draws, captured from the board in one read
#[derive(Debug, Clone, Default)]
pub struct View {
    pub pending: Vec<Order>,
    pub completed: usize,
    pub highlighted: Option<String>,
    /// Completed orders in the selected range, newest first
    pub in_range: Vec<Order>,
    pub report: SalesReport,
    pub drill_down: Option<PaymentDrillDown>,
    pub selected_payment: Option<String>,
    pub range: DateRange,
    pub alarm: Option<Order>,
    pub detail: Option<Order>,
    pub feed_error: Option<String>,
    pub feed_state: FeedState,
}

impl View {
    pub fn capture(board: &BoardState, now: DateTime<Utc>, local: &DateTime<Local>) -> Self {
        let pending: Vec<Order> = board.pending().into_iter().cloned().collect();
        let highlighted = pending
            .iter()
            .find(|o| board.is_highlighted(&o.id, now))
            .map(|o| o.id.clone());

        let mut in_range: Vec<Order> = board.completed_in_range(local).into_iter().cloned().collect();
        in_range.sort_by(|a, b| b.resolved_date().cmp(&a.resolved_date()));

        Self {
            pending,
            completed: board.completed().len(),
            highlighted,
            in_range,
            report: board.report(local),
            drill_down: board.drill_down(local),
            selected_payment: board.selected_payment().map(str::to_string),
            range: board.range(),
            alarm: if board.is_alarm_active() {
                board.surfaced().cloned()
            } else {
                None
            },
            detail: board.selected_order().cloned(),
            feed_error: board.feed_error().map(str::to_string),
            feed_state: board.feed_state(),
        }
    }
}

pub struct App {
    pub client: KitchenClient,
    pub demo: bool,

    // UI State
    pub current_tab: Tab,
    pub selected_card: usize,
    pub selected_row: usize,
    pub show_bar: bool,
    pub start_time: Instant,

    // Data
    pub view: View,
    pub gate: StoreGate,
    pub notice: Option<(String, Instant)>,
    pub activity: VecDeque<Activity>,
    last_bell: Option<Instant>,
}

impl App {
    pub fn new(client: KitchenClient, demo: bool) -> Self {
        let gate = client.store_gate();
        Self {
            client,
            demo,
            current_tab: Tab::Pending,
            selected_card: 0,
            selected_row: 0,
            show_bar: true,
            start_time: Instant::now(),
            view: View::default(),
            gate,
            notice: None,
            activity: VecDeque::with_capacity(ACTIVITY_CAP),
            last_bell: None,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Re-read the board and gate
    pub fn tick(&mut self) {
        let local = Local::now();
        self.view = self
            .client
            .with_board(|board| View::capture(board, Utc::now(), &local));
        self.gate = self.client.store_gate();

        if let Some(message) = self.client.take_notice() {
            self.notice = Some((message, Instant::now()));
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }

        self.selected_card = self.selected_card.min(self.view.pending.len().saturating_sub(1));
        self.selected_row = self.selected_row.min(self.view.in_range.len().saturating_sub(1));
    }

    /// Returns true when the bell should sound now
    pub fn bell_due(&mut self) -> bool {
        if self.view.alarm.is_none() {
            self.last_bell = None;
            return false;
        }
        let due = match self.last_bell {
            Some(at) => at.elapsed() >= BELL_INTERVAL,
            None => true,
        };
        if due {
            self.last_bell = Some(Instant::now());
        }
        due
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|(message, _)| message.as_str())
    }

    fn log(&mut self, message: String) {
        if self.activity.len() >= ACTIVITY_CAP {
            self.activity.pop_back();
        }
        self.activity.push_front(Activity {
            at: Local::now(),
            message,
        });
    }

    /// Record client events in the activity log
    pub fn on_event(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::Alarm(AlarmEvent::Raised { order, .. }) => {
                self.current_tab = Tab::Pending;
                self.log(format!("Nuevo pedido #{}", order.short_id()));
            }
            DisplayEvent::Alarm(AlarmEvent::Acknowledged { order_id }) => {
                self.log(format!("Pedido {} visto", order_id));
            }
            DisplayEvent::OrderReady { order_id } => {
                self.log(format!("Pedido {} marcado como listo", order_id));
            }
            DisplayEvent::Feed(FeedEvent::Failed { message, .. }) => self.log(message),
            DisplayEvent::Feed(FeedEvent::Recovered) => self.log("Conexión restablecida".to_string()),
            DisplayEvent::Gate(GateEvent::StatusChanged { status }) => {
                self.log(format!("Tienda: {}", status));
            }
            DisplayEvent::Gate(GateEvent::ReadFailed { message }) => self.log(message),
            DisplayEvent::Notice { message } => self.log(message),
            _ => {}
        }
    }

    // ========================================================================
    // Key handling
    // ========================================================================

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')) {
            return Action::Quit;
        }

        if self.gate.status() == kds_client::StoreStatus::Closed {
            return match code {
                KeyCode::Char('o') | KeyCode::Char('O') => Action::SetStoreOpen(true),
                _ => Action::None,
            };
        }

        if self.view.alarm.is_some() {
            if matches!(code, KeyCode::Enter | KeyCode::Char('a') | KeyCode::Char('A')) {
                self.client.acknowledge_alarm();
                self.tick();
            }
            return Action::None;
        }

        if self.view.detail.is_some() {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                self.client.with_board_mut(|b| b.clear_order());
                self.tick();
            }
            return Action::None;
        }

        match code {
            KeyCode::Char('1') => self.current_tab = Tab::Pending,
            KeyCode::Char('2') => self.current_tab = Tab::Ready,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_tab(),
            KeyCode::Char('b') | KeyCode::Char('B') => self.show_bar = !self.show_bar,
            KeyCode::Char('c') | KeyCode::Char('C') => return Action::SetStoreOpen(false),
            _ => {
                return match self.current_tab {
                    Tab::Pending => self.handle_pending_key(code),
                    Tab::Ready => {
                        self.handle_ready_key(code);
                        Action::None
                    }
                }
            }
        }
        Action::None
    }

    fn toggle_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Pending => Tab::Ready,
            Tab::Ready => Tab::Pending,
        };
    }

    fn handle_pending_key(&mut self, code: KeyCode) -> Action {
        let count = self.view.pending.len();
        match code {
            KeyCode::Left if count > 0 => {
                self.selected_card = (self.selected_card + count - 1) % count;
            }
            KeyCode::Right if count > 0 => {
                self.selected_card = (self.selected_card + 1) % count;
            }
            KeyCode::Enter => {
                if let Some(order) = self.view.pending.get(self.selected_card) {
                    return Action::MarkReady(order.id.clone());
                }
            }
            _ => {}
        }
        Action::None
    }

    fn handle_ready_key(&mut self, code: KeyCode) {
        let rows = self.view.in_range.len();
        match code {
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.client.with_board_mut(|b| b.set_range(b.range().next()));
                self.selected_row = 0;
            }
            KeyCode::Char('h') => self.shift_custom(-1, 0),
            KeyCode::Char('l') => self.shift_custom(1, 0),
            KeyCode::Char('j') => self.shift_custom(0, -1),
            KeyCode::Char('k') => self.shift_custom(0, 1),
            KeyCode::Char('u') | KeyCode::Char('U') => self.clear_custom_bound(true),
            KeyCode::Char('i') | KeyCode::Char('I') => self.clear_custom_bound(false),
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.client.with_board_mut(|b| b.set_range(DateRange::Today));
            }
            KeyCode::Char('p') | KeyCode::Char('P') => self.cycle_payment(),
            KeyCode::Esc => self.client.with_board_mut(|b| b.clear_payment_method()),
            KeyCode::Up if rows > 0 => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down if rows > 0 => self.selected_row = (self.selected_row + 1).min(rows - 1),
            KeyCode::Enter => {
                if let Some(order) = self.view.in_range.get(self.selected_row) {
                    let id = order.id.clone();
                    self.client.with_board_mut(|b| b.select_order(id));
                }
            }
            _ => {}
        }
        self.tick();
    }

    /// Move the custom range bounds by whole days, starting from today
    fn shift_custom(&mut self, start_days: i64, end_days: i64) {
        let today = Local::now().date_naive();
        let shift = |date: Option<NaiveDate>, days: i64| -> Option<NaiveDate> {
            if days == 0 {
                date
            } else {
                date.unwrap_or(today)
                    .checked_add_signed(ChronoDuration::days(days))
            }
        };
        self.client.with_board_mut(|b| {
            let (start, end) = match b.range() {
                DateRange::Custom { start, end } => (start, end),
                _ => (None, None),
            };
            b.set_custom_dates(shift(start, start_days), shift(end, end_days));
        });
    }

    /// Drop one custom bound; an open start runs from the epoch, an open end up to now
    fn clear_custom_bound(&mut self, start_bound: bool) {
        self.client.with_board_mut(|b| {
            if let DateRange::Custom { start, end } = b.range() {
                if start_bound {
                    b.set_custom_dates(None, end);
                } else {
                    b.set_custom_dates(start, None);
                }
            }
        });
    }

    /// Step the drill-down through the payment rows, then back to none
    fn cycle_payment(&mut self) {
        let keys: Vec<String> = self.view.report.payments.iter().map(|p| p.key.clone()).collect();
        let next = match &self.view.selected_payment {
            None => keys.first().cloned(),
            Some(current) => keys
                .iter()
                .position(|k| k == current)
                .and_then(|i| keys.get(i + 1).cloned()),
        };
        self.client.with_board_mut(|b| match next {
            Some(key) => b.select_payment_method(key),
            None => b.clear_payment_method(),
        });
    }

    /// Run a requested side effect; returns false to quit
    pub async fn perform(&mut self, action: Action) -> bool {
        match action {
            Action::None => {}
            Action::Quit => return false,
            Action::MarkReady(id) => {
                if let Err(e) = self.client.mark_ready(&id).await {
                    warn!("Mark ready failed for {}: {}", id, e);
                }
            }
            Action::SetStoreOpen(open) => {
                if let Err(e) = self.client.set_store_open(open).await {
                    warn!("Store toggle failed: {}", e);
                }
            }
        }
        self.tick();
        true
    }
}
