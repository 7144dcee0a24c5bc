use std::fs::{self, File};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use typesmash::app::{App, AppScreen};
use typesmash::arcade::game::GamePhase;
use typesmash::event::{AppEvent, EventHandler, FRAME_RATE};
use typesmash::session::mode::TestMode;
use typesmash::store::history::HistoryFilter;
use typesmash::store::json_store::JsonStore;
use typesmash::ui::components::arcade_field::ArcadeField;
use typesmash::ui::components::chart::WpmChart;
use typesmash::ui::components::history_table::HistoryTable;
use typesmash::ui::components::menu::{Menu, MenuAction};
use typesmash::ui::components::stats_sidebar::StatsSidebar;
use typesmash::ui::components::typing_area::TypingArea;
use typesmash::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use typesmash::ui::theme::Theme;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Timed,
    Words,
}

#[derive(Parser)]
#[command(name = "typesmash", version, about = "Terminal typing-speed trainer with a falling-word arcade mode")]
struct Cli {
    #[arg(short, long, value_enum, help = "Test mode to start in")]
    mode: Option<ModeArg>,

    #[arg(short, long, help = "Time limit in seconds for timed tests")]
    time: Option<u32>,

    #[arg(short, long, help = "Passage length for word tests")]
    words: Option<usize>,

    #[arg(long, help = "Start straight in Zoro Mode")]
    zoro: bool,

    #[arg(long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for word selection and spawns")]
    seed: Option<u64>,
}

/// Log to a file in the data dir; the terminal belongs to the UI.
fn init_logging() {
    let dir = JsonStore::default_dir();
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("typesmash.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut app = App::new(cli.seed);

    if let Some(secs) = cli.time {
        app.config.time_limit_secs = secs;
        app.config.validate();
    }
    if let Some(theme_name) = cli.theme {
        if let Some(theme) = Theme::load(&theme_name) {
            app.theme = Box::leak(Box::new(theme));
        } else {
            eprintln!("Unknown theme '{theme_name}', available: {}", Theme::available_themes().join(", "));
        }
    }

    app.menu = Menu::new(app.theme, app.config.time_limit_secs);

    let now = Instant::now();
    if cli.zoro {
        app.start_arcade(now);
    } else {
        match (cli.mode, cli.words) {
            (Some(ModeArg::Words), words) | (None, words @ Some(_)) => {
                let count = words.unwrap_or(app.config.default_word_count);
                app.start_words(count, now);
            }
            _ => app.start_timed(now),
        }
    }
    info!(mode = %app.mode, zoro = cli.zoro, "typesmash starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let events = EventHandler::new(FRAME_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    terminal.draw(|frame| render(frame, app))?;
    loop {
        let redraw = match events.next()? {
            AppEvent::Key(key) => {
                handle_key(app, key, Instant::now());
                true
            }
            AppEvent::Resize => true,
            AppEvent::Tick => false,
        };
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
        if app.effects.borrow_mut().take_bell() {
            let mut out = io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
        if app.take_dirty() || redraw {
            terminal.draw(|frame| render(frame, app))?;
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit(now);
        return;
    }

    match app.screen {
        AppScreen::Typing => handle_typing_key(app, key, now),
        AppScreen::Menu => handle_menu_key(app, key, now),
        AppScreen::History => handle_history_key(app, key),
        AppScreen::Arcade => handle_arcade_key(app, key, now),
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Tab => app.restart_test(now),
        KeyCode::Enter if app.test.is_done() => app.restart_test(now),
        KeyCode::Left | KeyCode::Right if !app.mode.is_timed() => {
            app.cycle_word_count(key.code == KeyCode::Right, now);
            if let Err(err) = app.config.save() {
                warn!(error = %err, "could not persist word count");
            }
        }
        KeyCode::Backspace => app.backspace(now),
        KeyCode::Char(ch) => app.type_char(ch, now),
        _ => {}
    }
}

fn run_menu_action(app: &mut App, action: MenuAction, now: Instant) {
    match action {
        MenuAction::Timed => app.start_timed(now),
        MenuAction::Words => {
            let count = match app.mode {
                TestMode::WordCount(n) => n,
                TestMode::Timed { .. } => app.config.default_word_count,
            };
            app.start_words(count, now);
        }
        MenuAction::Zoro => app.start_arcade(now),
        MenuAction::History => app.go_to_history(),
        MenuAction::Quit => app.quit(now),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => app.quit(now),
        KeyCode::Esc => app.go_to_typing(),
        KeyCode::Char('1') => run_menu_action(app, MenuAction::Timed, now),
        KeyCode::Char('2') => run_menu_action(app, MenuAction::Words, now),
        KeyCode::Char('3') => run_menu_action(app, MenuAction::Zoro, now),
        KeyCode::Char('h') => run_menu_action(app, MenuAction::History, now),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.selected_action();
            run_menu_action(app, action, now);
        }
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.history_confirm_clear {
        match key.code {
            KeyCode::Char('y') => app.clear_history(),
            KeyCode::Char('n') | KeyCode::Esc => app.history_confirm_clear = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Tab => app.cycle_history_filter(),
        KeyCode::Char('v') => app.toggle_chart(),
        KeyCode::Char('x') => {
            if !app.history.borrow().is_empty() {
                app.history_confirm_clear = true;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_history(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_history(false),
        _ => {}
    }
}

fn handle_arcade_key(app: &mut App, key: KeyEvent, now: Instant) {
    let game_over = app.arcade_phase() == Some(GamePhase::GameOver);
    match key.code {
        KeyCode::Esc => app.exit_arcade(now),
        KeyCode::Char('r') if game_over => app.restart_arcade(now),
        KeyCode::Enter => app.arcade_char(' ', now),
        KeyCode::Backspace => app.arcade_backspace(now),
        KeyCode::Char(ch) => app.arcade_char(ch, now),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Typing => render_typing(frame, app),
        AppScreen::Menu => frame.render_widget(&app.menu, area),
        AppScreen::History => render_history(frame, app),
        AppScreen::Arcade => render_arcade(frame, app),
    }

    if let Some(text) = &app.state.ui().notification {
        render_notification(frame, app, text);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, right: String) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " typesmash ",
            Style::default()
                .fg(colors.header_bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {right}"), Style::default().fg(colors.header_fg())),
    ]))
    .block(
        Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.header_bg())),
    );
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_typing(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    let Some(view) = app.state.typing() else {
        return;
    };

    let status = if view.mode.is_timed() {
        format!("{}  |  {} wpm  {}%  |  {}s left", view.mode, view.wpm, view.accuracy, view.seconds_left)
    } else {
        format!(
            "{}  |  {} wpm  {}%  |  {}/{}  {}",
            view.mode, view.wpm, view.accuracy, view.current_word_index, view.word_limit, view.clock
        )
    };
    render_header(frame, app, layout.header, status);
    frame.render_widget(TypingArea::new(view, app.theme), layout.main);

    if let Some(sidebar) = layout.sidebar {
        let history = app.history.borrow();
        let mode_filter = match app.last_result.as_ref() {
            Some(result) => HistoryFilter::Mode(result.to_history_entry().mode),
            None => HistoryFilter::All,
        };
        // The newest matching entry is the last result itself.
        let skip = usize::from(app.last_result.is_some());
        let prior: Vec<_> = history.filter(mode_filter).into_iter().skip(skip).collect();
        frame.render_widget(
            StatsSidebar::new(view, app.last_result.as_ref(), &prior, app.theme),
            sidebar,
        );
    }

    let mut hints = vec!["[Tab] Restart", "[Esc] Menu"];
    if !view.mode.is_timed() {
        hints.push("[\u{2190}/\u{2192}] Length");
    }
    render_footer(frame, app, layout.footer, &hints);
}

fn render_history(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::full_width(frame.area());
    let ui = app.state.ui();
    let history = app.history.borrow();
    let entries = history.filter(ui.history_filter);

    render_header(
        frame,
        app,
        layout.header,
        format!("History  |  filter: {}  |  {} entries", ui.history_filter.label(), entries.len()),
    );

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout.main);

    let chart = history.chart(ui.history_filter);
    frame.render_widget(WpmChart::new(&chart, ui.chart, app.theme), body[0]);
    frame.render_widget(
        HistoryTable::new(&entries, app.history_scroll, " Results ".to_string(), app.theme),
        body[1],
    );

    render_footer(
        frame,
        app,
        layout.footer,
        &["[Tab] Filter", "[v] Bars/Lines", "[j/k] Scroll", "[x] Clear", "[Esc] Menu"],
    );

    if app.history_confirm_clear {
        let colors = &app.theme.colors;
        let popup = centered_rect(40, 5, layout.main);
        frame.render_widget(Clear, popup);
        let dialog = Paragraph::new(vec![
            Line::from(Span::styled(
                "Delete all history?",
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("[y] Delete  [n] Keep", Style::default().fg(colors.text_pending()))),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(colors.error()))
                .style(Style::default().bg(colors.bg())),
        );
        frame.render_widget(dialog, popup);
    }
}

fn render_arcade(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::full_width(frame.area());
    let Some(view) = app.state.arcade() else {
        return;
    };
    let clock = format!("{}:{:02}", view.elapsed_secs / 60, view.elapsed_secs % 60);
    render_header(
        frame,
        app,
        layout.header,
        format!("Zoro Mode  |  {}  |  best x{}  |  {clock}", view.tier, view.max_combo),
    );
    frame.render_widget(ArcadeField::new(view, app.theme), layout.main);
    let hints: &[&str] = if view.phase == GamePhase::GameOver {
        &["[r] Again", "[Esc] Menu"]
    } else {
        &["Type a word to slash it", "[Space] Clear", "[Esc] Leave"]
    };
    render_footer(frame, app, layout.footer, hints);
}

fn render_notification(frame: &mut ratatui::Frame, app: &App, text: &str) {
    let colors = &app.theme.colors;
    let area = frame.area();
    let width = (text.chars().count() as u16 + 4).min(area.width);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + 3.min(area.height.saturating_sub(3)),
        width,
        3.min(area.height),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(colors.warning()))
                .style(Style::default().bg(colors.header_bg())),
        ),
        popup,
    );
}
