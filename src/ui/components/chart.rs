use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph, Widget,
};

use crate::bus::state::ChartKind;
use crate::store::history::ChartData;
use crate::ui::theme::Theme;

/// WPM of recent tests, one series per mode.
pub struct WpmChart<'a> {
    data: &'a ChartData,
    kind: ChartKind,
    theme: &'a Theme,
}

impl<'a> WpmChart<'a> {
    pub fn new(data: &'a ChartData, kind: ChartKind, theme: &'a Theme) -> Self {
        Self { data, kind, theme }
    }

    fn series_color(&self, idx: usize) -> Color {
        let colors = &self.theme.colors;
        let palette = [
            colors.accent(),
            colors.success(),
            colors.warning(),
            colors.power_up(),
            colors.word_rising(),
        ];
        palette[idx % palette.len()]
    }

    fn max_wpm(&self) -> u32 {
        self.data
            .series
            .iter()
            .flat_map(|s| s.points.iter().flatten())
            .copied()
            .max()
            .unwrap_or(0)
            .max(10)
    }

    fn block(&self) -> Block<'a> {
        let colors = &self.theme.colors;
        let kind = match self.kind {
            ChartKind::Bar => "bars",
            ChartKind::Line => "lines",
        };
        Block::bordered()
            .title(format!(" WPM, last {} tests ({kind}) ", self.data.labels.len()))
            .border_style(Style::default().fg(colors.border()))
    }

    fn legend(&self) -> Line<'a> {
        let mut spans = Vec::new();
        for (i, series) in self.data.series.iter().enumerate() {
            spans.push(Span::styled(
                format!(" \u{25a0} {} ", series.label),
                Style::default().fg(self.series_color(i)),
            ));
        }
        Line::from(spans)
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer) {
        let mut chart = BarChart::default()
            .block(self.block().title_bottom(self.legend()))
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2)
            .max(self.max_wpm() as u64);

        for (slot, label) in self.data.labels.iter().enumerate() {
            let bars: Vec<Bar> = self
                .data
                .series
                .iter()
                .enumerate()
                .filter_map(|(i, series)| {
                    let wpm = series.points.get(slot).copied().flatten()?;
                    Some(
                        Bar::default()
                            .value(wpm as u64)
                            .text_value(wpm.to_string())
                            .style(Style::default().fg(self.series_color(i))),
                    )
                })
                .collect();
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(label.trim_start_matches("Test ").to_string()))
                    .bars(&bars),
            );
        }
        chart.render(area, buf);
    }

    fn render_lines(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let points: Vec<Vec<(f64, f64)>> = self
            .data
            .series
            .iter()
            .map(|series| {
                series
                    .points
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, wpm)| wpm.map(|w| (slot as f64 + 1.0, w as f64)))
                    .collect()
            })
            .collect();

        let datasets: Vec<Dataset> = self
            .data
            .series
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (series, data))| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.series_color(i)))
                    .data(data)
            })
            .collect();

        let max_x = self.data.labels.len().max(2) as f64;
        let max_y = self.max_wpm() as f64 * 1.1;
        Chart::new(datasets)
            .block(self.block())
            .x_axis(
                Axis::default()
                    .title("Test #")
                    .style(Style::default().fg(colors.text_pending()))
                    .bounds([1.0, max_x]),
            )
            .y_axis(
                Axis::default()
                    .title("WPM")
                    .style(Style::default().fg(colors.text_pending()))
                    .labels(["0".to_string(), format!("{:.0}", max_y)])
                    .bounds([0.0, max_y]),
            )
            .render(area, buf);
    }
}

impl Widget for WpmChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.labels.is_empty() {
            let colors = &self.theme.colors;
            Paragraph::new("No tests yet. Finish one to see it here.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(colors.text_pending()))
                .block(self.block())
                .render(area, buf);
            return;
        }
        match self.kind {
            ChartKind::Bar => self.render_bars(area, buf),
            ChartKind::Line => self.render_lines(area, buf),
        }
    }
}
