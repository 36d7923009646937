//! Overlays: the new-order alarm and the order detail

use super::{centered, clock};
use crate::app::Theme;
use kds_types::Order;
use ratatui::prelude::*;
use ratatui::widgets::*;

fn item_lines(order: &Order) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
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
    lines
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().fg(Theme::MUTED)))
}

pub fn render_new_order(frame: &mut Frame, order: &Order) {
    let area = centered(frame.area(), 52, 22);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Confirma que viste este pedido para detener la alarma.",
            Style::default().fg(Theme::FG),
        )),
        Line::from(""),
        section("CLIENTE"),
        Line::from(Span::styled(
            order.customer.display_name().to_string(),
            Style::default().fg(Theme::FG).bold(),
        )),
    ];
    if let Some(phone) = &order.customer.phone {
        lines.push(Line::from(Span::styled(phone.clone(), Style::default().fg(Theme::MUTED))));
    }
    lines.push(Line::from(""));
    lines.push(section("PRODUCTOS"));
    lines.extend(item_lines(order));
    if let Some(address) = order.delivery_address() {
        lines.push(Line::from(""));
        lines.push(section("DIRECCIÓN"));
        lines.push(Line::from(address.to_string()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] ACEPTAR",
        Style::default().fg(Theme::BG).bg(Theme::SUCCESS).bold(),
    )));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(" ¡Nuevo pedido! ", Style::default().fg(Theme::HIGHLIGHT).bold()))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Theme::SUCCESS))
                .padding(Padding::new(2, 2, 1, 1))
                .style(Style::default().bg(Theme::BG)),
        );
    frame.render_widget(modal, area);
}

pub fn render_detail(frame: &mut Frame, order: &Order) {
    let area = centered(frame.area(), 60, 26);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Cliente: ", Style::default().fg(Theme::MUTED)),
            Span::styled(order.customer.display_name().to_string(), Style::default().fg(Theme::FG).bold()),
        ]),
        Line::from(vec![
            Span::styled("Teléfono: ", Style::default().fg(Theme::MUTED)),
            Span::raw(order.customer.phone.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            Span::styled("Entrega: ", Style::default().fg(Theme::MUTED)),
            Span::raw(order.delivery.label().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Pago: ", Style::default().fg(Theme::MUTED)),
            Span::raw(order.payment.label()),
        ]),
        Line::from(vec![
            Span::styled("Creado: ", Style::default().fg(Theme::MUTED)),
            Span::raw(clock(order.created_at)),
            Span::styled("   Listo: ", Style::default().fg(Theme::MUTED)),
            Span::raw(clock(order.ready_at)),
        ]),
    ];
    if let Some(address) = order.delivery_address() {
        lines.push(Line::from(vec![
            Span::styled("Dirección: ", Style::default().fg(Theme::MUTED)),
            Span::raw(address.to_string()),
        ]));
    }
    if let Some(notes) = &order.customer.notes {
        lines.push(Line::from(vec![
            Span::styled("Referencias: ", Style::default().fg(Theme::MUTED)),
            Span::raw(notes.clone()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(section("PRODUCTOS"));
    lines.extend(item_lines(order));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("{} productos   ", order.units()), Style::default().fg(Theme::MUTED)),
        Span::styled(format!("Total ${:.2}", order.revenue()), Style::default().fg(Theme::SUCCESS).bold()),
    ]));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" Pedido #{} ", order.short_id()),
                    Style::default().fg(Theme::ACCENT).bold(),
                ))
                .title_bottom(Line::from(" [Esc] cerrar ").right_aligned())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Theme::ACCENT))
                .padding(Padding::new(2, 2, 1, 0))
                .style(Style::default().bg(Theme::BG)),
        );
    frame.render_widget(modal, area);
}
