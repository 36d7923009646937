//! Pending orders as kitchen tickets, left to right by arrival

use super::clock;
use crate::app::{App, Theme};
use kds_types::Order;
use ratatui::prelude::*;
use ratatui::widgets::*;

const CARD_WIDTH: u16 = 34;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let orders = &app.view.pending;
    if orders.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No hay pedidos pendientes.",
            Style::default().fg(Theme::MUTED),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().padding(Padding::new(0, 0, area.height / 3, 0)));
        frame.render_widget(empty, area);
        return;
    }

    let visible = (area.width / CARD_WIDTH).max(1) as usize;
    let first = app.selected_card.saturating_sub(visible - 1);
    let shown: Vec<&Order> = orders.iter().skip(first).take(visible).collect();

    let constraints: Vec<Constraint> = shown.iter().map(|_| Constraint::Length(CARD_WIDTH)).collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, order) in shown.iter().enumerate() {
        let selected = first + i == app.selected_card;
        let fresh = app.view.highlighted.as_deref() == Some(order.id.as_str());
        render_card(frame, order, selected, fresh, columns[i]);
    }

    if orders.len() > visible {
        let more = Paragraph::new(Span::styled(
            format!("{}/{} ", app.selected_card + 1, orders.len()),
            Style::default().fg(Theme::MUTED),
        ))
        .alignment(Alignment::Right);
        frame.render_widget(more, Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1));
    }
}

fn render_card(frame: &mut Frame, order: &Order, selected: bool, fresh: bool, area: Rect) {
    let header_color = if order.delivery.is_home_delivery() {
        Theme::DELIVERY
    } else {
        Theme::PICKUP
    };
    let border_color = if fresh {
        Theme::HIGHLIGHT
    } else if selected {
        Theme::ACCENT
    } else {
        Theme::BORDER
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" Pedido #{} ", order.short_id()),
            Style::default().fg(Theme::BG).bg(header_color).bold(),
        ))
        .borders(Borders::ALL)
        .border_type(if selected { BorderType::Thick } else { BorderType::Rounded })
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let delivery = if order.delivery.is_home_delivery() {
        "Domicilio"
    } else {
        "Recoger"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            order.customer.display_name().to_string(),
            Style::default().fg(Theme::FG).bold(),
        )),
        Line::from(Span::styled(
            format!("{} · {} · {} prod.", clock(order.created_at), delivery, order.units()),
            Style::default().fg(header_color),
        )),
    ];
    if let Some(address) = order.delivery_address() {
        lines.push(Line::from(Span::styled(
            address.to_string(),
            Style::default().fg(Theme::MUTED),
        )));
    }
    lines.push(Line::from(""));

    for item in &order.items {
        lines.push(Line::from(Span::styled(
            format!("{}× {}", item.quantity, item.name.as_deref().unwrap_or("").to_uppercase()),
            Style::default().fg(Theme::FG).bold(),
        )));
        if let Some(comment) = &item.comment {
            lines.push(Line::from(Span::styled(
                format!("   {}", comment),
                Style::default().fg(Theme::MUTED).italic(),
            )));
        }
    }

    if let Some(notes) = &order.customer.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Referencias", Style::default().fg(Theme::MUTED))));
        lines.push(Line::from(Span::styled(notes.clone(), Style::default().fg(Theme::FG))));
    }

    if selected {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Marcar como listo",
            Style::default().fg(Theme::SUCCESS).bold(),
        )));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(body, inner);
}
