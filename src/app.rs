use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::arcade::game::{ArcadeEvent, ArcadeGame, GamePhase, InputResolution};
use crate::bus::events::{BusEvent, EventBus};
use crate::bus::guard::ReentryGuard;
use crate::bus::state::{Slice, SliceKind, StateStore};
use crate::config::Config;
use crate::effects::{TerminalEffects, cue_for};
use crate::generator::BundledSource;
use crate::session::input;
use crate::session::mode::TestMode;
use crate::session::result::TestResult;
use crate::session::test::{TestStatus, TypingTest};
use crate::session::timer::FrameClock;
use crate::store::history::{HistoryBackend, HistoryFilter, HistoryStore, MemoryBackend};
use crate::store::json_store::JsonStore;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppScreen {
    #[default]
    Typing,
    Menu,
    History,
    Arcade,
}

/// Lets bus listeners ask for a fresh test. The app applies the request on
/// its next tick; requests made while a reset is running are dropped.
#[derive(Clone)]
pub struct RestartHandle {
    pending: Rc<Cell<Option<TestMode>>>,
    guard: ReentryGuard,
}

impl RestartHandle {
    pub fn request(&self, mode: TestMode) -> bool {
        if self.guard.is_busy() {
            debug!(mode = %mode, "restart requested during a reset, ignoring");
            return false;
        }
        self.pending.set(Some(mode));
        true
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub mode: TestMode,
    pub test: TypingTest,
    pub last_result: Option<TestResult>,
    pub arcade: Option<ArcadeGame>,
    pub bus: EventBus<BusEvent>,
    pub history: Rc<RefCell<HistoryStore>>,
    pub effects: Rc<RefCell<TerminalEffects>>,
    pub state: StateStore,
    pub history_confirm_clear: bool,
    pub history_scroll: usize,
    pub should_quit: bool,
    source: BundledSource,
    frame_clock: FrameClock,
    seed: Option<u64>,
    dirty: Rc<Cell<bool>>,
    reset_guard: ReentryGuard,
    pending_restart: Rc<Cell<Option<TestMode>>>,
}

impl App {
    pub fn new(seed: Option<u64>) -> Self {
        let config = Config::load().unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default config");
            Config::default()
        });
        let backend: Box<dyn HistoryBackend> = match JsonStore::new() {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!(error = %err, "history storage unavailable, keeping it in memory");
                Box::new(MemoryBackend::new())
            }
        };
        Self::with_backend(config, backend, seed)
    }

    /// Build an app around an explicit config and history backend.
    pub fn with_backend(config: Config, backend: Box<dyn HistoryBackend>, seed: Option<u64>) -> Self {
        let theme: &'static Theme = Box::leak(Box::new(
            Theme::load(&config.theme).unwrap_or_default(),
        ));
        let history = Rc::new(RefCell::new(HistoryStore::new(backend, config.max_history)));
        let effects = Rc::new(RefCell::new(TerminalEffects::new(config.bell)));

        let bus = EventBus::new();
        let sink = Rc::clone(&history);
        bus.subscribe(move |event: &BusEvent| {
            match event {
                BusEvent::TestCompleted(result) => {
                    sink.borrow_mut().append(result.to_history_entry());
                }
                BusEvent::Arcade(ArcadeEvent::GameOver(summary))
                | BusEvent::ArcadeExited(summary) => {
                    sink.borrow_mut().append(summary.to_history_entry());
                }
                _ => {}
            }
            Ok(())
        });
        let fx = Rc::clone(&effects);
        bus.subscribe(move |event: &BusEvent| {
            if let Some(cue) = cue_for(event) {
                cue.fire(&mut *fx.borrow_mut());
            }
            Ok(())
        });

        let dirty = Rc::new(Cell::new(true));
        let mut state = StateStore::new();
        for kind in [SliceKind::Typing, SliceKind::Arcade, SliceKind::Ui] {
            let flag = Rc::clone(&dirty);
            state.watch(kind, move |_| flag.set(true));
        }

        let mode = TestMode::Timed {
            secs: config.time_limit_secs,
        };
        let menu = Menu::new(theme, config.time_limit_secs);
        let mut source = BundledSource::new(seed);
        let test = TypingTest::new(mode, &mut source);

        Self {
            screen: AppScreen::Typing,
            config,
            theme,
            menu,
            mode,
            test,
            last_result: None,
            arcade: None,
            bus,
            history,
            effects,
            state,
            history_confirm_clear: false,
            history_scroll: 0,
            should_quit: false,
            source,
            frame_clock: FrameClock::new(),
            seed,
            dirty,
            reset_guard: ReentryGuard::new(),
            pending_restart: Rc::new(Cell::new(None)),
        }
    }

    /// True when a watched slice changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    fn set_screen(&mut self, screen: AppScreen) {
        self.screen = screen;
        self.state.update_ui(|ui| ui.screen = screen);
    }

    pub fn restart_handle(&self) -> RestartHandle {
        RestartHandle {
            pending: Rc::clone(&self.pending_restart),
            guard: self.reset_guard.clone(),
        }
    }

    pub fn start_test(&mut self, mode: TestMode, now: Instant) {
        let Some(_token) = self.reset_guard.try_enter() else {
            debug!("reset already in progress, ignoring");
            return;
        };
        self.leave_arcade(now);
        self.mode = mode;
        self.test.reset(mode, &mut self.source);
        self.last_result = None;
        self.bus.publish(BusEvent::TestReset(mode));
        self.set_screen(AppScreen::Typing);
        self.sync(now);
    }

    pub fn restart_test(&mut self, now: Instant) {
        self.start_test(self.mode, now);
    }

    pub fn start_timed(&mut self, now: Instant) {
        let secs = self.config.time_limit_secs;
        self.start_test(TestMode::Timed { secs }, now);
    }

    pub fn start_words(&mut self, count: usize, now: Instant) {
        self.start_test(TestMode::WordCount(count), now);
    }

    /// Step the word-count selection and restart with it.
    pub fn cycle_word_count(&mut self, forward: bool, now: Instant) {
        let current = match self.mode {
            TestMode::WordCount(n) => n,
            TestMode::Timed { .. } => self.config.default_word_count,
        };
        let next = if forward {
            self.config.next_word_count(current)
        } else {
            self.config.prev_word_count(current)
        };
        self.config.default_word_count = next;
        self.start_words(next, now);
    }

    pub fn type_char(&mut self, ch: char, now: Instant) {
        let was_idle = self.test.status() == TestStatus::Idle;
        let committed_before = self.test.committed().len();
        let finished = input::process_char(&mut self.test, ch, now);

        if was_idle && self.test.status() != TestStatus::Idle {
            self.bus.publish(BusEvent::TestStarted(self.mode));
        }
        if self.test.committed().len() > committed_before
            && let Some(word) = self.test.last_committed()
        {
            self.bus.publish(BusEvent::WordCommitted(word.clone()));
        }
        if let Some(result) = finished {
            self.complete_test(result);
        }
        self.sync(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        input::process_backspace(&mut self.test);
        self.sync(now);
    }

    fn complete_test(&mut self, result: TestResult) {
        info!(wpm = result.wpm, accuracy = result.accuracy, "recording test");
        self.last_result = Some(result.clone());
        self.bus.publish(BusEvent::TestCompleted(result));
    }

    pub fn start_arcade(&mut self, now: Instant) {
        self.leave_arcade(now);
        self.arcade = Some(ArcadeGame::new(self.config.arcade.clone(), now, self.seed));
        self.frame_clock.reset();
        self.frame_clock.tick(now);
        self.set_screen(AppScreen::Arcade);
        self.sync(now);
    }

    /// Restart after game over. The finished game was already recorded.
    pub fn restart_arcade(&mut self, now: Instant) {
        if let Some(game) = self.arcade.as_mut() {
            game.restart(now);
            self.frame_clock.reset();
            self.frame_clock.tick(now);
            self.effects.borrow_mut().clear();
        }
        self.sync(now);
    }

    /// Tear down any arcade game, recording it if it was still running.
    fn leave_arcade(&mut self, now: Instant) {
        let Some(mut game) = self.arcade.take() else {
            return;
        };
        if let Some(summary) = game.exit(now) {
            self.bus.publish(BusEvent::ArcadeExited(summary));
        }
        self.state.clear_arcade();
        self.effects.borrow_mut().clear();
    }

    pub fn exit_arcade(&mut self, now: Instant) {
        self.leave_arcade(now);
        self.go_to_menu();
    }

    pub fn arcade_char(&mut self, ch: char, now: Instant) {
        let Some(game) = self.arcade.as_mut() else {
            return;
        };
        if ch == ' ' {
            if game.resolve(now) == InputResolution::Pending {
                game.clear_input();
            }
        } else {
            game.type_char(ch, now);
        }
        self.publish_arcade_events();
        self.sync(now);
    }

    pub fn arcade_backspace(&mut self, now: Instant) {
        if let Some(game) = self.arcade.as_mut() {
            game.backspace();
        }
        self.sync(now);
    }

    fn publish_arcade_events(&mut self) {
        let Some(game) = self.arcade.as_mut() else {
            return;
        };
        for event in game.drain_events() {
            self.bus.publish(BusEvent::Arcade(event));
        }
    }

    pub fn arcade_phase(&self) -> Option<GamePhase> {
        self.arcade.as_ref().map(ArcadeGame::phase)
    }

    /// Advance timers and the arcade frame to `now`.
    pub fn tick(&mut self, now: Instant) {
        if let Some(mode) = self.pending_restart.take() {
            self.start_test(mode, now);
        }
        if let Some(result) = self.test.tick(now) {
            self.complete_test(result);
        }
        if let Some(game) = self.arcade.as_mut() {
            let dt = self.frame_clock.tick(now);
            game.frame(now, dt, &mut self.source);
        }
        self.publish_arcade_events();
        self.sync(now);
    }

    /// Push fresh snapshots into the state store.
    fn sync(&mut self, now: Instant) {
        self.state.update(Slice::Typing(self.test.snapshot(now)));
        if let Some(game) = &self.arcade {
            self.state.update(Slice::Arcade(game.snapshot(now)));
        }
        let notification = self.effects.borrow_mut().current(now).map(str::to_string);
        self.state.update_ui(|ui| ui.notification = notification);
    }

    pub fn go_to_menu(&mut self) {
        self.history_confirm_clear = false;
        self.set_screen(AppScreen::Menu);
    }

    pub fn go_to_typing(&mut self) {
        self.set_screen(AppScreen::Typing);
    }

    pub fn go_to_history(&mut self) {
        self.history_scroll = 0;
        self.history_confirm_clear = false;
        self.set_screen(AppScreen::History);
    }

    pub fn cycle_history_filter(&mut self) {
        let current = self.state.ui().history_filter;
        let next = self.history.borrow().next_filter(current);
        self.history_scroll = 0;
        self.state.update_ui(|ui| ui.history_filter = next);
    }

    pub fn toggle_chart(&mut self) {
        self.state.update_ui(|ui| ui.chart = ui.chart.toggle());
    }

    pub fn scroll_history(&mut self, down: bool) {
        let visible = {
            let history = self.history.borrow();
            history.filter(self.state.ui().history_filter).len()
        };
        self.history_scroll = if down {
            (self.history_scroll + 1).min(visible.saturating_sub(1))
        } else {
            self.history_scroll.saturating_sub(1)
        };
    }

    pub fn clear_history(&mut self) {
        self.history.borrow_mut().clear();
        self.history_confirm_clear = false;
        self.history_scroll = 0;
        self.state.update_ui(|ui| ui.history_filter = HistoryFilter::All);
        self.bus.publish(BusEvent::HistoryCleared);
    }

    /// Leave the app, recording a running arcade game first.
    pub fn quit(&mut self, now: Instant) {
        self.leave_arcade(now);
        self.should_quit = true;
    }
}
