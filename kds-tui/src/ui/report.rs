//! Ready orders: range filter, totals, product ranking and payment breakdown

use crate::app::{App, Theme};
use crate::widgets::QuantityBars;
use kds_board::{PaymentDrillDown, ProductCount, SalesReport};
use ratatui::prelude::*;
use ratatui::widgets::*;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Range and totals
            Constraint::Percentage(45), // Rankings
            Constraint::Min(5),         // Orders
        ])
        .split(area);

    render_summary(frame, app, layout[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    match &app.view.drill_down {
        Some(detail) => {
            render_products(frame, &detail.products, &format!(" PRODUCTOS · {} ", detail.summary.label), middle[0]);
            render_drill_down(frame, detail, middle[1]);
        }
        None => {
            render_products(frame, &app.view.report.products, " PRODUCTOS ", middle[0]);
            render_payments(frame, &app.view.report, middle[1]);
        }
    }

    render_orders(frame, app, layout[2]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let report = &app.view.report;
    let line = Line::from(vec![
        Span::styled("Rango: ", Style::default().fg(Theme::MUTED)),
        Span::styled(app.view.range.label(), Style::default().fg(Theme::ACCENT).bold()),
        Span::raw("     "),
        Span::styled("Pedidos: ", Style::default().fg(Theme::MUTED)),
        Span::styled(report.total_orders.to_string(), Style::default().fg(Theme::FG).bold()),
        Span::raw("   "),
        Span::styled("Productos: ", Style::default().fg(Theme::MUTED)),
        Span::styled(report.total_units.to_string(), Style::default().fg(Theme::FG).bold()),
        Span::raw("   "),
        Span::styled("Total: ", Style::default().fg(Theme::MUTED)),
        Span::styled(format!("${:.2}", report.total_revenue), Style::default().fg(Theme::SUCCESS).bold()),
    ]);

    let summary = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Theme::BORDER)),
    );
    frame.render_widget(summary, area);
}

fn render_products(frame: &mut Frame, products: &[ProductCount], title: &str, area: Rect) {
    let block = Block::default()
        .title(Span::styled(title.to_string(), Style::default().fg(Theme::FG).bold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Theme::BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if products.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Sin ventas en este rango", Style::default().fg(Theme::MUTED))),
            inner,
        );
        return;
    }

    let rows: Vec<(String, u64)> = products
        .iter()
        .take(inner.height as usize)
        .map(|p| (p.label(), p.quantity))
        .collect();
    frame.render_widget(QuantityBars::new(&rows, Theme::SUCCESS), inner);
}

fn render_payments(frame: &mut Frame, report: &SalesReport, area: Rect) {
    let header = Row::new(vec!["Método", "Pedidos", "Prod.", "Total"])
        .style(Style::default().fg(Theme::MUTED));

    let rows: Vec<Row> = report
        .payments
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.label.clone()).style(Style::default().fg(Theme::ACCENT)),
                Cell::from(p.orders.to_string()),
                Cell::from(p.units.to_string()),
                Cell::from(format!("${:.2}", p.revenue)).style(Style::default().fg(Theme::SUCCESS)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .style(Style::default().fg(Theme::FG))
    .block(
        Block::default()
            .title(Span::styled(" MÉTODOS DE PAGO [P] ", Style::default().fg(Theme::FG).bold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Theme::BORDER)),
    );
    frame.render_widget(table, area);
}

fn render_drill_down(frame: &mut Frame, detail: &PaymentDrillDown, area: Rect) {
    let summary = &detail.summary;
    let mut lines = vec![
        Line::from(Span::styled(summary.label.clone(), Style::default().fg(Theme::ACCENT).bold())),
        Line::from(vec![
            Span::styled("Pedidos: ", Style::default().fg(Theme::MUTED)),
            Span::raw(summary.orders.to_string()),
            Span::styled("   Productos: ", Style::default().fg(Theme::MUTED)),
            Span::raw(summary.units.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Total: ", Style::default().fg(Theme::MUTED)),
            Span::styled(format!("${:.2}", summary.revenue), Style::default().fg(Theme::SUCCESS).bold()),
        ]),
        Line::from(""),
    ];
    for order in &detail.orders {
        lines.push(Line::from(vec![
            Span::styled(format!("#{} ", order.short_id()), Style::default().fg(Theme::FG)),
            Span::styled(order.customer.display_name().to_string(), Style::default().fg(Theme::MUTED)),
            Span::styled(format!("  ${:.2}", order.revenue()), Style::default().fg(Theme::SUCCESS)),
        ]));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" DETALLE [P] siguiente  [Esc] cerrar ", Style::default().fg(Theme::FG).bold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Theme::ACCENT)),
    );
    frame.render_widget(panel, area);
}

fn render_orders(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Pedido", "Fecha", "Cliente", "Pago", "Prod.", "Total"])
        .style(Style::default().fg(Theme::MUTED));

    let rows: Vec<Row> = app
        .view
        .in_range
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let date = order
                .resolved_date()
                .map(|d| d.with_timezone(&chrono::Local).format("%d/%m %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            let row = Row::new(vec![
                Cell::from(format!("#{}", order.short_id())),
                Cell::from(date),
                Cell::from(order.customer.display_name().to_string()),
                Cell::from(order.payment.label()),
                Cell::from(order.units().to_string()),
                Cell::from(format!("${:.2}", order.revenue())),
            ]);
            if i == app.selected_row {
                row.style(Style::default().fg(Theme::BG).bg(Theme::ACCENT))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Min(12),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .style(Style::default().fg(Theme::FG))
    .block(
        Block::default()
            .title(Span::styled(" PEDIDOS LISTOS ", Style::default().fg(Theme::FG).bold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Theme::BORDER)),
    );

    // keep the selected row on screen
    let mut state = TableState::default().with_selected(Some(app.selected_row));
    frame.render_stateful_widget(table, area, &mut state);
}
