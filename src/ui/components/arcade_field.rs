use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::arcade::game::{ArcadeView, GamePhase, WordView};
use crate::arcade::word::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// Words past this depth are about to cost a life.
const DANGER_DEPTH: f64 = 80.0;

/// The playfield: falling words plus a one-line HUD and the input box.
pub struct ArcadeField<'a> {
    view: &'a ArcadeView,
    theme: &'a Theme,
}

impl<'a> ArcadeField<'a> {
    pub fn new(view: &'a ArcadeView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn hud_line(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let view = self.view;
        let hearts: String = (0..view.max_lives)
            .map(|i| if i < view.lives { '\u{2665}' } else { '\u{00b7}' })
            .collect();

        let mut spans = vec![
            Span::styled(format!(" {hearts} "), Style::default().fg(colors.life())),
            Span::styled(
                format!(" {} ", view.score),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" Lv {} (+{})  x{} ", view.level, view.next_level_in, view.combo),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!(" {} ", view.tier),
                Style::default().fg(colors.warning()),
            ),
        ];
        for (kind, state) in &view.power_ups {
            let (text, style) = if state.available {
                (
                    format!(" [{}] ", kind.name()),
                    Style::default()
                        .fg(colors.power_up())
                        .add_modifier(Modifier::BOLD),
                )
            } else if state.cooldown_secs > 0 {
                (
                    format!(" {} {}s ", kind.name(), state.cooldown_secs),
                    Style::default().fg(colors.text_pending()),
                )
            } else {
                continue;
            };
            spans.push(Span::styled(text, style));
        }
        if let Some(secs) = view.invincible_secs {
            spans.push(Span::styled(
                format!(" HAKI {secs}s "),
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.power_up()),
            ));
        }
        Line::from(spans)
    }

    fn draw_word(&self, word: &WordView, field: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some((col, row)) = project(word, field) else {
            return;
        };

        let base = if word.hit {
            let style = Style::default().fg(colors.word_hit());
            if word.opacity < 0.5 {
                style.add_modifier(Modifier::DIM)
            } else {
                style
            }
        } else if word.y >= DANGER_DEPTH && !word.rising {
            Style::default().fg(colors.error())
        } else if word.rising {
            Style::default().fg(colors.word_rising())
        } else {
            Style::default().fg(colors.word_falling())
        };
        let matched = Style::default()
            .fg(colors.word_matched())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

        let right = field.x + field.width;
        for (i, ch) in word.text.chars().enumerate() {
            let x = col + i as u16;
            if x >= right {
                break;
            }
            let style = if i < word.matched { matched } else { base };
            buf[(x, row)].set_char(ch).set_style(style);
        }
    }
}

/// Map field coordinates onto the terminal area. `None` when the word is
/// outside it.
fn project(word: &WordView, field: Rect) -> Option<(u16, u16)> {
    if field.width == 0 || field.height == 0 || word.y < 0.0 || word.y >= FIELD_HEIGHT {
        return None;
    }
    let len = word.text.chars().count() as u16;
    let max_col = field.width.saturating_sub(len);
    let col = ((word.x / FIELD_WIDTH) * field.width as f64) as u16;
    let row = ((word.y / FIELD_HEIGHT) * field.height as f64) as u16;
    Some((
        field.x + col.min(max_col),
        field.y + row.min(field.height - 1),
    ))
}

impl Widget for ArcadeField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Zoro Mode ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(inner);

        Paragraph::new(self.hud_line()).render(rows[0], buf);

        for word in &self.view.words {
            self.draw_word(word, rows[1], buf);
        }

        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.accent())),
            Span::styled(self.view.input.as_str(), Style::default().fg(colors.fg())),
            Span::styled(" ", Style::default().bg(colors.text_cursor_bg())),
        ]))
        .block(
            Block::bordered().border_style(Style::default().fg(colors.border())),
        );
        input.render(rows[2], buf);

        if self.view.phase == GamePhase::GameOver {
            let popup = centered_rect(36, 9, inner);
            Clear.render(popup, buf);
            let lines = vec![
                Line::from(Span::styled(
                    "GAME OVER",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!("Score {}  Level {}", self.view.score, self.view.level)),
                Line::from(format!("Best combo x{}", self.view.max_combo)),
                Line::from(format!("Reached {}", self.view.tier)),
                Line::from(""),
                Line::from(Span::styled(
                    "[r] Again  [Esc] Menu",
                    Style::default().fg(colors.text_pending()),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(
                    Block::bordered()
                        .border_style(Style::default().fg(colors.error()))
                        .style(Style::default().bg(colors.bg())),
                )
                .render(popup, buf);
        }
    }
}
