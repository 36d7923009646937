//! Horizontal quantity bars for product rankings

use ratatui::prelude::*;
use ratatui::widgets::Widget;

pub struct QuantityBars<'a> {
    rows: &'a [(String, u64)],
    max_qty: u64,
    color: Color,
    label_width: u16,
}

impl<'a> QuantityBars<'a> {
    pub fn new(rows: &'a [(String, u64)], color: Color) -> Self {
        let max_qty = rows.iter().map(|(_, q)| *q).max().unwrap_or(1).max(1);
        let label_width = rows
            .iter()
            .map(|(label, _)| label.chars().count() as u16)
            .max()
            .unwrap_or(0)
            .min(24);

        Self {
            rows,
            max_qty,
            color,
            label_width,
        }
    }
}

impl Widget for QuantityBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // label, gap, bar, gap, count
        let count_width = 5u16;
        let bar_space = area
            .width
            .saturating_sub(self.label_width + count_width + 2);

        for (i, (label, qty)) in self.rows.iter().enumerate() {
            if i as u16 >= area.height {
                break;
            }
            let y = area.y + i as u16;

            buf.set_stringn(
                area.x,
                y,
                label,
                self.label_width as usize,
                Style::default().fg(Color::Rgb(203, 213, 225)),
            );

            let bar_width = ((*qty as u128 * bar_space as u128) / self.max_qty as u128) as u16;
            let bar_x = area.x + self.label_width + 1;
            for x in 0..bar_width.min(bar_space) {
                buf.set_string(bar_x + x, y, "▓", Style::default().fg(self.color));
            }

            buf.set_string(
                bar_x + bar_space + 1,
                y,
                format!("{:>width$}", qty, width = count_width as usize),
                Style::default().fg(self.color).bold(),
            );
        }
    }
}
