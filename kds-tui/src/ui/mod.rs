//! UI rendering components

mod closed;
mod footer;
mod header;
mod modal;
mod pending;
mod report;

use crate::app::{App, Tab, Theme};
use kds_client::StoreStatus;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Main render function - routes to the store gate screens or the kitchen
pub fn render(frame: &mut Frame, app: &App) {
    match app.gate.status() {
        StoreStatus::Loading => closed::render_loading(frame),
        StoreStatus::Closed => closed::render(frame, app),
        StoreStatus::Open => render_main(frame, app),
    }
}

fn render_main(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let banner = u16::from(app.view.feed_error.is_some()) * 3;
    let bar = if app.show_bar { 3 } else { 0 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(bar),    // Header
            Constraint::Length(2),      // Tabs
            Constraint::Length(banner), // Feed error
            Constraint::Min(10),        // Content
            Constraint::Length(3),      // Footer
        ])
        .split(area);

    if app.show_bar {
        header::render(frame, app, layout[0]);
    }
    render_tabs(frame, app, layout[1]);
    if let Some(message) = &app.view.feed_error {
        render_banner(frame, message, layout[2]);
    }
    match app.current_tab {
        Tab::Pending => pending::render(frame, app, layout[3]),
        Tab::Ready => report::render(frame, app, layout[3]),
    }
    footer::render(frame, app, layout[4]);

    // Overlays: the alarm wins over the detail view
    if let Some(order) = &app.view.alarm {
        modal::render_new_order(frame, order);
    } else if let Some(order) = &app.view.detail {
        modal::render_detail(frame, order);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let counts = [app.view.pending.len(), app.view.completed];
    let spans: Vec<Span> = Tab::all()
        .iter()
        .zip(counts)
        .enumerate()
        .flat_map(|(i, (tab, count))| {
            let style = if *tab == app.current_tab {
                Style::default().fg(Theme::ACCENT).bold()
            } else {
                Style::default().fg(Theme::FG)
            };
            vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Theme::MUTED)),
                Span::styled(format!("{} ({})", tab.title(), count), style),
                Span::raw("   "),
            ]
        })
        .collect();

    let tabs = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Theme::BG))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Theme::BORDER)),
        );
    frame.render_widget(tabs, area);
}

fn render_banner(frame: &mut Frame, message: &str, area: Rect) {
    let banner = Paragraph::new(Span::styled(message, Style::default().fg(Theme::ERROR)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Theme::ERROR)),
        );
    frame.render_widget(banner, area);
}

/// Centered rect of fixed size, clamped to `area`
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Local "HH:MM" of an order time
pub(crate) fn clock(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_default()
}
