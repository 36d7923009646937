//! Store gate screens: loading and closed

use super::centered;
use crate::app::{App, Theme};
use ratatui::prelude::*;
use ratatui::widgets::*;

const CLOSED_BG: Color = Color::Rgb(69, 10, 10);

pub fn render_loading(frame: &mut Frame) {
    let area = frame.area();
    let text = Paragraph::new(Span::styled(
        "Cargando estado de tienda...",
        Style::default().fg(Theme::MUTED),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().padding(Padding::new(0, 0, area.height / 2, 0)));
    frame.render_widget(text, area);
}

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(CLOSED_BG)), area);

    let mut lines = vec![
        Line::from(Span::styled("Tienda cerrada", Style::default().fg(Theme::FG).bold())),
        Line::from(""),
        Line::from(Span::styled(
            "La tienda está en modo cerrado. Presiona [O] para volver a abrir.",
            Style::default().fg(Theme::FG),
        )),
    ];
    if let Some(error) = app.gate.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Theme::ERROR))));
    }
    if let Some(notice) = app.notice_text() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice.to_string(), Style::default().fg(Theme::WARNING))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[O] Abrir tienda    [Q] Salir",
        Style::default().fg(Theme::SUCCESS).bold(),
    )));

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Theme::ERROR))
                .padding(Padding::new(2, 2, 1, 1)),
        );
    frame.render_widget(panel, centered(area, 56, 13));
}
