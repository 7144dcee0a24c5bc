use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Cell, Row, Table, Widget};

use crate::store::history::HistoryEntry;
use crate::ui::theme::Theme;

pub struct HistoryTable<'a> {
    entries: &'a [&'a HistoryEntry],
    scroll: usize,
    title: String,
    theme: &'a Theme,
}

impl<'a> HistoryTable<'a> {
    pub fn new(entries: &'a [&'a HistoryEntry], scroll: usize, title: String, theme: &'a Theme) -> Self {
        Self {
            entries,
            scroll,
            title,
            theme,
        }
    }
}

fn detail(entry: &HistoryEntry) -> String {
    match &entry.arcade {
        Some(stats) => format!(
            "{} pts, Lv {}, x{}, {}",
            stats.score, stats.level, stats.max_combo, stats.tier
        ),
        None => format!("{} chars", entry.chars),
    }
}

impl Widget for HistoryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let header = Row::new(["Date", "Mode", "WPM", "Acc", "Err", "Time", "Details"])
            .style(
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            );

        let rows: Vec<Row> = self
            .entries
            .iter()
            .skip(self.scroll)
            .map(|entry| {
                let acc_color = if entry.accuracy >= 95 {
                    colors.success()
                } else if entry.accuracy >= 85 {
                    colors.warning()
                } else {
                    colors.error()
                };
                Row::new(vec![
                    Cell::from(entry.local_timestamp()),
                    Cell::from(entry.mode_label()),
                    Cell::from(entry.wpm.to_string())
                        .style(Style::default().fg(colors.accent())),
                    Cell::from(format!("{}%", entry.accuracy))
                        .style(Style::default().fg(acc_color)),
                    Cell::from(entry.errors.to_string()),
                    Cell::from(entry.time.clone()),
                    Cell::from(detail(entry)).style(Style::default().fg(colors.text_pending())),
                ])
                .style(Style::default().fg(colors.fg()))
            })
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(10),
        ];

        Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(
                Block::bordered()
                    .title(self.title)
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(area, buf);
    }
}
