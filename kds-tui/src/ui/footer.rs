//! Footer with keybindings, notices and the latest activity

use crate::app::{App, Tab, Theme};
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = app.notice_text() {
        Line::from(Span::styled(format!("⚠ {}", notice), Style::default().fg(Theme::ERROR).bold()))
    } else {
        keybindings(app)
    };

    let latest = app
        .activity
        .front()
        .map(|a| format!("{} {}", a.at.format("%H:%M"), a.message))
        .unwrap_or_default();

    let help = Paragraph::new(vec![
        line,
        Line::from(Span::styled(latest, Style::default().fg(Theme::MUTED))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Theme::BORDER)),
    );

    frame.render_widget(help, area);
}

fn keybindings(app: &App) -> Line<'static> {
    let mut bindings = vec![("Q", "Salir"), ("1-2", "Vista")];
    match app.current_tab {
        Tab::Pending => {
            bindings.push(("←→", "Pedido"));
            bindings.push(("Enter", "Listo"));
        }
        Tab::Ready => {
            bindings.push(("F", "Rango"));
            bindings.push(("H/L", "Desde"));
            bindings.push(("J/K", "Hasta"));
            bindings.push(("U/I", "Quitar desde/hasta"));
            bindings.push(("X", "Hoy"));
            bindings.push(("P", "Método"));
            bindings.push(("↑↓ Enter", "Detalle"));
        }
    }
    bindings.push(("B", "Barra"));
    bindings.push(("C", "Cerrar tienda"));

    let spans: Vec<Span> = bindings
        .into_iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(key, Style::default().fg(Theme::ACCENT).bold()),
                Span::styled(format!(" {}  ", action), Style::default().fg(Theme::MUTED)),
            ]
        })
        .collect();
    Line::from(spans)
}
