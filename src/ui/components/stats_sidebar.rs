use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::TestResult;
use crate::session::test::{TestStatus, TypingView};
use crate::store::history::HistoryEntry;
use crate::ui::theme::{Theme, ThemeColors};

pub struct StatsSidebar<'a> {
    view: &'a TypingView,
    last_result: Option<&'a TestResult>,
    /// Earlier entries of the same mode, newest first, excluding `last_result`.
    prior: &'a [&'a HistoryEntry],
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        view: &'a TypingView,
        last_result: Option<&'a TestResult>,
        prior: &'a [&'a HistoryEntry],
        theme: &'a Theme,
    ) -> Self {
        Self {
            view,
            last_result,
            prior,
            theme,
        }
    }
}

/// Format a delta value with arrow indicator
fn format_delta(delta: f64, suffix: &str) -> String {
    if delta > 0.0 {
        format!("\u{2191}+{delta:.1}{suffix}")
    } else if delta < 0.0 {
        format!("\u{2193}{delta:.1}{suffix}")
    } else {
        format!("={suffix}")
    }
}

fn format_errors(errors: usize, error_rate: u32) -> String {
    format!("{errors} ({error_rate}%)")
}

fn delta_color(colors: &ThemeColors, delta: f64) -> Color {
    if delta > 0.0 {
        colors.success()
    } else if delta < 0.0 {
        colors.error()
    } else {
        colors.text_pending()
    }
}

fn accuracy_color(colors: &ThemeColors, accuracy: u32) -> Color {
    if accuracy >= 95 {
        colors.success()
    } else if accuracy >= 85 {
        colors.warning()
    } else {
        colors.error()
    }
}

fn stat<'a>(label: &'a str, value: String, color: Color, colors: &ThemeColors) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(colors.fg())),
        Span::styled(value, Style::default().fg(color)),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let view = self.view;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(area);

        let progress = if view.mode.is_timed() {
            format!("{}s left", view.seconds_left)
        } else {
            format!("{}/{}", view.current_word_index, view.word_limit)
        };
        let live = vec![
            stat("WPM:      ", view.wpm.to_string(), colors.accent(), colors),
            stat(
                "Accuracy: ",
                format!("{}%", view.accuracy),
                accuracy_color(colors, view.accuracy),
                colors,
            ),
            stat("Errors:   ", view.errors.to_string(), colors.error(), colors),
            Line::from(""),
            stat("Progress: ", progress, colors.accent(), colors),
            stat("Time:     ", view.clock.clone(), colors.fg(), colors),
        ];
        let title = match view.status {
            TestStatus::Idle => " Ready ",
            TestStatus::Running => " Live ",
            TestStatus::Done => " Finished ",
        };
        Paragraph::new(live)
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(sections[0], buf);

        let Some(last) = self.last_result else {
            return;
        };

        let mut lines = vec![stat("WPM: ", last.wpm.to_string(), colors.accent(), colors)];
        let n = self.prior.len();
        let (wpm_delta, acc_delta) = if n > 0 {
            let avg_wpm = self.prior.iter().map(|e| e.wpm as f64).sum::<f64>() / n as f64;
            let avg_acc = self.prior.iter().map(|e| e.accuracy as f64).sum::<f64>() / n as f64;
            (last.wpm as f64 - avg_wpm, last.accuracy as f64 - avg_acc)
        } else {
            (0.0, 0.0)
        };
        if n > 0 {
            lines.push(Line::from(vec![
                Span::styled("  vs avg: ", Style::default().fg(colors.text_pending())),
                Span::styled(
                    format_delta(wpm_delta, ""),
                    Style::default().fg(delta_color(colors, wpm_delta)),
                ),
            ]));
        }
        lines.push(stat(
            "Accuracy: ",
            format!("{}%", last.accuracy),
            accuracy_color(colors, last.accuracy),
            colors,
        ));
        if n > 0 {
            lines.push(Line::from(vec![
                Span::styled("  vs avg: ", Style::default().fg(colors.text_pending())),
                Span::styled(
                    format_delta(acc_delta, "%"),
                    Style::default().fg(delta_color(colors, acc_delta)),
                ),
            ]));
        }
        lines.push(stat(
            "Errors:   ",
            format_errors(last.errors, last.error_rate),
            colors.error(),
            colors,
        ));
        lines.push(stat(
            "Chars:    ",
            format!("{}/{}", last.correct, last.total),
            colors.fg(),
            colors,
        ));
        lines.push(stat("Time:     ", last.time_display.clone(), colors.fg(), colors));
        if let Some(actual) = last.divergent_word_count() {
            lines.push(stat("Words:    ", actual.to_string(), colors.warning(), colors));
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Last Test ")
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(sections[1], buf);
    }
}
