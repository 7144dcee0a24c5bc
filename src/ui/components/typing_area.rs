use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::metrics::CharClass;
use crate::session::test::TypingView;
use crate::ui::theme::Theme;

/// Lines kept above the one holding the current word.
const LINES_BEFORE_CURRENT: usize = 1;

pub struct TypingArea<'a> {
    view: &'a TypingView,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(view: &'a TypingView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn current_word_spans(&self, target: &str) -> Vec<Span<'a>> {
        let colors = &self.theme.colors;
        let typed: Vec<char> = self.view.input.chars().collect();
        let target_chars: Vec<char> = target.chars().collect();
        let mut spans = Vec::new();

        for (i, class) in self.view.current_classes.iter().enumerate() {
            let style = match class {
                CharClass::Correct => Style::default().fg(colors.text_correct()),
                CharClass::Incorrect | CharClass::Missing => Style::default()
                    .fg(colors.text_incorrect())
                    .bg(colors.text_incorrect_bg()),
                CharClass::Extra => Style::default()
                    .fg(colors.text_incorrect())
                    .add_modifier(Modifier::UNDERLINED),
            };
            // Wrong letters show what the target expected; extras show what was typed.
            let ch = target_chars.get(i).copied().unwrap_or(typed[i]);
            spans.push(Span::styled(ch.to_string(), style));
        }

        let typed_len = self.view.current_classes.len();
        for (i, ch) in target_chars.iter().enumerate().skip(typed_len) {
            let style = if i == typed_len {
                Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_cursor_bg())
            } else {
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(ch.to_string(), style));
        }
        if typed_len >= target_chars.len() {
            spans.push(Span::styled(
                " ",
                Style::default().bg(colors.text_cursor_bg()),
            ));
        }
        spans
    }

    fn word_spans(&self, index: usize, word: &'a str) -> Vec<Span<'a>> {
        let colors = &self.theme.colors;
        if index == self.view.current_word_index {
            return self.current_word_spans(word);
        }
        let style = match self.view.committed.get(index) {
            Some(true) => Style::default().fg(colors.text_correct()),
            Some(false) => Style::default()
                .fg(colors.text_incorrect())
                .add_modifier(Modifier::UNDERLINED),
            None => Style::default().fg(colors.text_pending()),
        };
        vec![Span::styled(word, style)]
    }
}

/// Break words into rows of at most `width` columns. Returns the word
/// indices on each row.
fn wrap_words(words: &[String], width: usize) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = vec![Vec::new()];
    let mut used = 0usize;
    for (i, word) in words.iter().enumerate() {
        let len = word.chars().count() + 1;
        if used > 0 && used + len > width {
            rows.push(Vec::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push(i);
        }
        used += len;
    }
    rows
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let view = self.view;
        let block = Block::bordered()
            .title(format!(" {} ", view.mode.label()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let width = (inner.width as usize).saturating_sub(2).max(1);
        let rows = wrap_words(&view.words, width);
        let current_row = rows
            .iter()
            .position(|row| row.contains(&view.current_word_index))
            .unwrap_or(rows.len().saturating_sub(1));
        let first = current_row.saturating_sub(LINES_BEFORE_CURRENT);

        let lines: Vec<Line> = rows
            .iter()
            .skip(first)
            .take(inner.height as usize)
            .map(|row| {
                let mut spans = vec![Span::raw(" ")];
                for &i in row {
                    spans.extend(self.word_spans(i, &view.words[i]));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_wrap_words_breaks_on_width() {
        let rows = wrap_words(&words(&["one", "two", "three", "four"]), 10);
        assert_eq!(rows, vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[test]
    fn test_wrap_words_keeps_long_word_alone() {
        let rows = wrap_words(&words(&["a", "extraordinarily", "b"]), 6);
        assert_eq!(rows, vec![vec![0], vec![1], vec![2]]);
    }
}
