//! Header bar with store status, counters and clock

use crate::app::{App, Theme};
use kds_board::FeedState;
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28), // Title
            Constraint::Min(10),    // Spacer
            Constraint::Length(64), // Stats
        ])
        .split(area);

    let mut title = vec![
        Span::styled("██ ", Style::default().fg(Theme::ACCENT)),
        Span::styled("Cocina Don Burgo", Style::default().fg(Theme::FG).bold()),
    ];
    if app.demo {
        title.push(Span::styled(" DEMO", Style::default().fg(Theme::WARNING)));
    }
    let logo = Paragraph::new(Line::from(title)).block(Block::default().padding(Padding::new(1, 0, 1, 0)));
    frame.render_widget(logo, layout[0]);

    let (feed_icon, feed_text, feed_color) = match app.view.feed_state {
        FeedState::Live => ("●", "EN VIVO", Theme::SUCCESS),
        FeedState::AwaitingBaseline => ("◐", "CARGANDO", Theme::HIGHLIGHT),
        FeedState::Stale => ("●", "SIN CONEXIÓN", Theme::ERROR),
    };

    let stats = Paragraph::new(Line::from(vec![
        Span::styled("Tienda: ", Style::default().fg(Theme::MUTED)),
        Span::styled(app.gate.status().to_string(), Style::default().fg(Theme::SUCCESS).bold()),
        Span::raw("   "),
        Span::styled(
            format!("Pendientes: {}", app.view.pending.len()),
            Style::default().fg(Theme::WARNING),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Listos: {}", app.view.completed),
            Style::default().fg(Theme::SUCCESS),
        ),
        Span::raw("   "),
        Span::styled(feed_icon, Style::default().fg(feed_color)),
        Span::raw(" "),
        Span::styled(feed_text, Style::default().fg(feed_color).bold()),
        Span::raw("   "),
        Span::styled(
            chrono::Local::now().format("%H:%M:%S").to_string(),
            Style::default().fg(Theme::FG),
        ),
    ]))
    .alignment(Alignment::Right)
    .block(Block::default().padding(Padding::new(0, 1, 1, 0)));
    frame.render_widget(stats, layout[2]);

    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Theme::ACCENT));
    frame.render_widget(border, area);
}
