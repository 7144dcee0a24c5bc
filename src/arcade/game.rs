use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::arcade::powerup::{PowerUpKind, PowerUpState, PowerUps};
use crate::arcade::scoring::{level_from_score, points_for, score_to_next_level};
use crate::arcade::tier::TierProgress;
use crate::arcade::word::{Direction, FIELD_WIDTH, FallingWord};
use crate::config::ArcadeConfig;
use crate::engine::metrics;
use crate::generator::WordSource;
use crate::session::timer::Interval;
use crate::store::history::{ArcadeStats, HistoryEntry, HistoryMode};

/// Horizontal padding so words do not spawn flush against an edge.
const SPAWN_MARGIN_X: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    /// Lives ran out. Terminal until restart.
    GameOver,
    /// The player left while the game was running.
    Exited,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArcadeEvent {
    WordSpawned { text: String, direction: Direction },
    WordHit { text: String, points: u32 },
    WordMissed { text: String, shielded: bool },
    LifeLost { lives: u8 },
    ComboReset,
    LevelUp { level: u32 },
    TierAdvanced { index: usize, name: String },
    PowerUpReady(PowerUpKind),
    PowerUpActivated(PowerUpKind),
    InvincibilityEnded,
    GameOver(ArcadeSummary),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputResolution {
    PowerUp(PowerUpKind),
    Hit { text: String, points: u32 },
    /// No match yet; the buffer is kept.
    Pending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArcadeSummary {
    pub score: u32,
    pub level: u32,
    pub max_combo: u32,
    pub tier: String,
    pub words_hit: usize,
    pub words_missed: usize,
    pub chars_hit: usize,
    pub duration: Duration,
    pub wpm: u32,
    pub accuracy: u32,
    pub timestamp: DateTime<Utc>,
}

impl ArcadeSummary {
    pub fn to_history_entry(&self) -> HistoryEntry {
        let secs = self.duration.as_secs();
        HistoryEntry {
            wpm: self.wpm,
            accuracy: self.accuracy,
            mode: HistoryMode::Zoro,
            chars: self.chars_hit,
            errors: self.words_missed,
            time: format!("{}:{:02}", secs / 60, secs % 60),
            timestamp: self.timestamp,
            actual_word_count: None,
            arcade: Some(ArcadeStats {
                score: self.score,
                level: self.level,
                max_combo: self.max_combo,
                tier: self.tier.clone(),
                duration_secs: secs,
            }),
        }
    }
}

/// One falling-word game. Render-free: the owner feeds it time and keys and
/// draws from [`ArcadeGame::snapshot`].
pub struct ArcadeGame {
    config: ArcadeConfig,
    phase: GamePhase,
    score: u32,
    level: u32,
    combo: u32,
    max_combo: u32,
    lives: u8,
    tier: TierProgress,
    words: Vec<FallingWord>,
    power_ups: PowerUps,
    input: String,
    invincible_until: Option<Instant>,
    last_hit_at: Option<Instant>,
    spawn_timer: Interval,
    cooldown_timer: Interval,
    spawned: usize,
    words_hit: usize,
    words_missed: usize,
    chars_hit: usize,
    started_at: Instant,
    ended_at: Option<Instant>,
    events: Vec<ArcadeEvent>,
    rng: SmallRng,
}

impl ArcadeGame {
    pub fn new(config: ArcadeConfig, now: Instant, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut game = Self {
            phase: GamePhase::Running,
            score: 0,
            level: 1,
            combo: 0,
            max_combo: 0,
            lives: config.initial_lives,
            tier: TierProgress::new(),
            words: Vec::new(),
            power_ups: PowerUps::new(),
            input: String::new(),
            invincible_until: None,
            last_hit_at: None,
            spawn_timer: Interval::new(Duration::from_millis(config.base_spawn_interval_ms)),
            cooldown_timer: Interval::new(Duration::from_secs(1)),
            spawned: 0,
            words_hit: 0,
            words_missed: 0,
            chars_hit: 0,
            started_at: now,
            ended_at: None,
            events: Vec::new(),
            rng,
            config,
        };
        game.start_timers(now);
        game
    }

    fn start_timers(&mut self, now: Instant) {
        let period = self.spawn_interval();
        self.spawn_timer.set_period(period, now);
        self.spawn_timer.start(now);
        self.cooldown_timer.start(now);
    }

    fn stop_timers(&mut self) {
        self.spawn_timer.cancel();
        self.cooldown_timer.cancel();
    }

    /// Throw away this game and begin a fresh one. Never records history.
    pub fn restart(&mut self, now: Instant) {
        self.stop_timers();
        let config = self.config.clone();
        let rng = SmallRng::from_rng(&mut self.rng).unwrap_or_else(|_| SmallRng::from_entropy());
        *self = Self {
            rng,
            ..Self::new(config, now, Some(0))
        };
        debug!("arcade restarted");
    }

    /// Leave the game. Returns the summary to record only if the game was
    /// still running; a finished game was already recorded at game over.
    pub fn exit(&mut self, now: Instant) -> Option<ArcadeSummary> {
        self.stop_timers();
        if self.phase != GamePhase::Running {
            return None;
        }
        self.phase = GamePhase::Exited;
        self.ended_at = Some(now);
        let summary = self.summary(now);
        info!(score = summary.score, level = summary.level, "arcade exited");
        Some(summary)
    }

    pub fn spawn_interval(&self) -> Duration {
        let step = self.config.spawn_interval_step_ms.saturating_mul(self.level as u64);
        let ms = self
            .config
            .base_spawn_interval_ms
            .saturating_sub(step)
            .max(self.config.min_spawn_interval_ms);
        Duration::from_millis(ms)
    }

    pub fn word_speed(&self) -> f64 {
        self.config.base_word_speed + self.level as f64 * self.config.word_speed_per_level
    }

    fn rising_chance(&self) -> f64 {
        (self.level as f64 * self.config.rising_chance_per_level).min(self.config.max_rising_chance)
    }

    /// Advance the simulation to `now`; `dt` is the time since the last frame.
    pub fn frame(&mut self, now: Instant, dt: Duration, source: &mut dyn WordSource) {
        if self.phase != GamePhase::Running {
            return;
        }

        let due = self.spawn_timer.poll(now);
        let spawns = if self.spawned == 0 { due.max(1) } else { due };
        for _ in 0..spawns {
            self.spawn_word(now, source);
        }

        for _ in 0..self.cooldown_timer.poll(now) {
            self.power_ups.tick_cooldowns();
        }

        if let Some(until) = self.invincible_until
            && until <= now
        {
            self.invincible_until = None;
            self.events.push(ArcadeEvent::InvincibilityEnded);
            debug!("invincibility ended");
        }

        if self.combo > 0
            && self.config.combo_idle_timeout_secs > 0.0
            && let Some(last) = self.last_hit_at
            && now.saturating_duration_since(last).as_secs_f64() >= self.config.combo_idle_timeout_secs
        {
            self.reset_combo();
        }

        self.update_words(now, dt);
        self.refresh_power_ups();
    }

    fn update_words(&mut self, now: Instant, dt: Duration) {
        let fade = Duration::from_millis(self.config.hit_fade_ms);
        for word in &mut self.words {
            word.update(dt, fade);
        }

        let mut missed = Vec::new();
        self.words.retain(|w| {
            if w.is_faded() {
                return false;
            }
            if w.is_active() && w.is_off_screen() {
                missed.push(w.text.clone());
                return false;
            }
            true
        });

        for text in missed {
            let shielded = self.is_invincible(now);
            self.events.push(ArcadeEvent::WordMissed {
                text,
                shielded,
            });
            if shielded {
                continue;
            }
            self.words_missed += 1;
            self.lose_life(now);
            if self.phase != GamePhase::Running {
                return;
            }
        }
    }

    fn spawn_word(&mut self, now: Instant, source: &mut dyn WordSource) {
        let tier_name = self.tier_name().to_string();
        let text = source.themed_word(&tier_name).trim().to_lowercase();
        if text.is_empty() {
            return;
        }
        let direction = if self.rng.gen_bool(self.rising_chance().clamp(0.0, 1.0)) {
            Direction::Up
        } else {
            Direction::Down
        };
        let speed = self.word_speed() * self.rng.gen_range(0.8..1.2);
        let max_x = (FIELD_WIDTH - SPAWN_MARGIN_X - text.chars().count() as f64).max(SPAWN_MARGIN_X + 1.0);
        let x = self.rng.gen_range(SPAWN_MARGIN_X..max_x);

        self.events.push(ArcadeEvent::WordSpawned {
            text: text.clone(),
            direction,
        });
        self.words.push(FallingWord::new(text, x, speed, direction, now));
        self.spawned += 1;
    }

    fn lose_life(&mut self, now: Instant) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(ArcadeEvent::LifeLost { lives: self.lives });
        self.reset_combo();
        debug!(lives = self.lives, "life lost");
        if self.lives == 0 {
            self.game_over(now);
        }
    }

    fn reset_combo(&mut self) {
        if self.combo > 0 {
            self.combo = 0;
            self.events.push(ArcadeEvent::ComboReset);
            self.refresh_power_ups();
        }
    }

    fn game_over(&mut self, now: Instant) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.stop_timers();
        self.invincible_until = None;
        self.phase = GamePhase::GameOver;
        self.ended_at = Some(now);
        let summary = self.summary(now);
        info!(
            score = summary.score,
            level = summary.level,
            max_combo = summary.max_combo,
            tier = %summary.tier,
            "arcade game over"
        );
        self.events.push(ArcadeEvent::GameOver(summary));
    }

    pub fn summary(&self, now: Instant) -> ArcadeSummary {
        let duration = self
            .ended_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at);
        ArcadeSummary {
            score: self.score,
            level: self.level,
            max_combo: self.max_combo,
            tier: self.tier_name().to_string(),
            words_hit: self.words_hit,
            words_missed: self.words_missed,
            chars_hit: self.chars_hit,
            duration,
            wpm: metrics::calculate_gross_wpm(self.chars_hit, duration),
            accuracy: metrics::calculate_accuracy(self.words_hit, self.words_hit + self.words_missed),
            timestamp: Utc::now(),
        }
    }

    fn add_points(&mut self, points: u32, now: Instant) {
        self.score = self.score.saturating_add(points);

        let level = level_from_score(self.score, self.config.level_score_step);
        if level > self.level {
            self.level = level;
            self.spawn_timer.set_period(self.spawn_interval(), now);
            self.events.push(ArcadeEvent::LevelUp { level });
            debug!(level, "level up");
        }

        if let Some(index) = self.tier.advance(&self.config.tiers, self.score) {
            let name = self.tier_name().to_string();
            debug!(index, name, "tier advanced");
            self.events.push(ArcadeEvent::TierAdvanced { index, name });
        }
    }

    fn refresh_power_ups(&mut self) {
        for kind in self.power_ups.refresh(&self.config, self.combo, self.level) {
            self.events.push(ArcadeEvent::PowerUpReady(kind));
        }
    }

    pub fn type_char(&mut self, ch: char, now: Instant) -> InputResolution {
        if self.phase != GamePhase::Running || ch.is_control() {
            return InputResolution::Pending;
        }
        self.input.push(ch);
        self.resolve(now)
    }

    pub fn backspace(&mut self) {
        if self.phase == GamePhase::Running {
            self.input.pop();
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Match the buffer against power-up names first, then live words.
    pub fn resolve(&mut self, now: Instant) -> InputResolution {
        if self.phase != GamePhase::Running {
            return InputResolution::Pending;
        }
        let typed = self.input.trim().to_lowercase();
        if typed.is_empty() {
            return InputResolution::Pending;
        }

        if let Some(kind) = PowerUpKind::from_name(&typed)
            && self.power_ups.is_available(kind)
        {
            self.activate(kind, now);
            self.input.clear();
            return InputResolution::PowerUp(kind);
        }

        let Some(idx) = self.words.iter().position(|w| w.is_active() && w.text == typed) else {
            return InputResolution::Pending;
        };
        let points = self.hit_word(idx, now);
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.last_hit_at = Some(now);
        self.input.clear();
        self.refresh_power_ups();
        InputResolution::Hit {
            text: typed,
            points,
        }
    }

    /// Mark a word hit and score it at the current combo.
    fn hit_word(&mut self, idx: usize, now: Instant) -> u32 {
        let word = &mut self.words[idx];
        word.hit = true;
        let text = word.text.clone();
        let len = text.chars().count();
        let points = points_for(len, self.combo, self.level);
        self.words_hit += 1;
        self.chars_hit += len;
        self.events.push(ArcadeEvent::WordHit { text, points });
        self.add_points(points, now);
        points
    }

    fn activate(&mut self, kind: PowerUpKind, now: Instant) {
        if !self.power_ups.consume(&self.config, kind) {
            return;
        }
        self.events.push(ArcadeEvent::PowerUpActivated(kind));
        debug!(power_up = kind.name(), "power-up activated");
        match kind {
            PowerUpKind::Onigiri => {
                self.lives = (self.lives + 1).min(self.config.max_lives);
            }
            PowerUpKind::Haki => {
                let duration = Duration::from_secs(self.config.haki_duration_secs as u64);
                self.invincible_until = Some(now + duration);
            }
            PowerUpKind::Ashura => {
                let targets: Vec<usize> = self
                    .words
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.is_active())
                    .map(|(i, _)| i)
                    .collect();
                for idx in targets {
                    self.hit_word(idx, now);
                }
            }
        }
        self.refresh_power_ups();
    }

    pub fn drain_events(&mut self) -> Vec<ArcadeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_invincible(&self, now: Instant) -> bool {
        self.invincible_until.is_some_and(|until| until > now)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn tier_index(&self) -> usize {
        self.tier.index()
    }

    pub fn tier_name(&self) -> &str {
        self.config
            .tiers
            .get(self.tier.index())
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    pub fn words(&self) -> &[FallingWord] {
        &self.words
    }

    pub fn power_up(&self, kind: PowerUpKind) -> PowerUpState {
        self.power_ups.get(kind)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    /// Add a word directly, bypassing the spawn timer.
    pub fn push_word(&mut self, word: FallingWord) {
        self.words.push(word);
        self.spawned += 1;
    }

    pub fn snapshot(&self, now: Instant) -> ArcadeView {
        let typed = self.input.trim().to_lowercase();
        ArcadeView {
            phase: self.phase,
            score: self.score,
            level: self.level,
            next_level_in: score_to_next_level(self.score, self.config.level_score_step),
            combo: self.combo,
            max_combo: self.max_combo,
            lives: self.lives,
            max_lives: self.config.max_lives,
            tier: self.tier_name().to_string(),
            words: self
                .words
                .iter()
                .map(|w| WordView {
                    text: w.text.clone(),
                    x: w.x,
                    y: w.y,
                    hit: w.hit,
                    rising: w.direction == Direction::Up,
                    opacity: w.opacity,
                    matched: if !w.hit && !typed.is_empty() && w.text.starts_with(&typed) {
                        typed.chars().count()
                    } else {
                        0
                    },
                })
                .collect(),
            power_ups: self.power_ups.iter().collect(),
            invincible_secs: self
                .invincible_until
                .map(|until| until.saturating_duration_since(now).as_secs_f64().ceil() as u32)
                .filter(|&s| s > 0),
            input: self.input.clone(),
            elapsed_secs: self
                .ended_at
                .unwrap_or(now)
                .saturating_duration_since(self.started_at)
                .as_secs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WordView {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub hit: bool,
    pub rising: bool,
    pub opacity: f64,
    /// Leading characters already matched by the input buffer.
    pub matched: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArcadeView {
    pub phase: GamePhase,
    pub score: u32,
    pub level: u32,
    /// Points left until the next level.
    pub next_level_in: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub lives: u8,
    pub max_lives: u8,
    pub tier: String,
    pub words: Vec<WordView>,
    pub power_ups: Vec<(PowerUpKind, PowerUpState)>,
    pub invincible_secs: Option<u32>,
    pub input: String,
    pub elapsed_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::scoring::LEVEL_SCORE_STEP;
    use crate::arcade::word::FIELD_HEIGHT;
    use crate::generator::Passage;

    struct Fixed;

    impl WordSource for Fixed {
        fn random_word(&mut self) -> String {
            "sword".into()
        }
        fn random_passage(&mut self, _nominal: usize) -> Passage {
            Passage::new("sword".into())
        }
        fn themed_word(&mut self, _tier: &str) -> String {
            "Sword".into()
        }
    }

    fn game(t0: Instant) -> ArcadeGame {
        ArcadeGame::new(ArcadeConfig::default(), t0, Some(42))
    }

    fn word(text: &str, t0: Instant) -> FallingWord {
        FallingWord::new(text.into(), 50.0, 10.0, Direction::Down, t0)
    }

    fn type_str(game: &mut ArcadeGame, s: &str, now: Instant) -> InputResolution {
        let mut last = InputResolution::Pending;
        for ch in s.chars() {
            last = game.type_char(ch, now);
        }
        last
    }

    /// A word about to leave the field.
    fn doomed(text: &str, t0: Instant) -> FallingWord {
        let mut w = FallingWord::new(text.into(), 50.0, 100.0, Direction::Down, t0);
        w.y = FIELD_HEIGHT;
        w
    }

    #[test]
    fn test_first_frame_spawns_lowercased_word() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.frame(t0, Duration::ZERO, &mut Fixed);
        assert_eq!(game.words().len(), 1);
        assert_eq!(game.words()[0].text, "sword");
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, ArcadeEvent::WordSpawned { .. })));
    }

    #[test]
    fn test_spawn_timer_follows_interval() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.frame(t0, Duration::ZERO, &mut Fixed);
        // Level 1: 2000 - 100 = 1900ms
        assert_eq!(game.spawn_interval(), Duration::from_millis(1900));
        game.frame(t0 + Duration::from_millis(1800), Duration::from_millis(16), &mut Fixed);
        assert_eq!(game.words().len(), 1);
        game.frame(t0 + Duration::from_millis(1900), Duration::from_millis(16), &mut Fixed);
        assert_eq!(game.words().len(), 2);
    }

    #[test]
    fn test_spawn_interval_has_floor() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.level = 30;
        assert_eq!(game.spawn_interval(), Duration::from_millis(400));
    }

    #[test]
    fn test_hit_scores_and_builds_combo() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("zoro", t0));
        game.push_word(word("luffy", t0));

        let first = type_str(&mut game, "zoro", t0);
        assert_eq!(
            first,
            InputResolution::Hit {
                text: "zoro".into(),
                points: points_for(4, 0, 1)
            }
        );
        assert_eq!(game.combo(), 1);
        assert_eq!(game.input(), "");

        type_str(&mut game, "luffy", t0);
        assert_eq!(game.combo(), 2);
        assert_eq!(game.max_combo(), 2);
        assert_eq!(game.score(), points_for(4, 0, 1) + points_for(5, 1, 1));
    }

    #[test]
    fn test_snapshot_counts_down_to_next_level() {
        let t0 = Instant::now();
        let mut game = game(t0);
        assert_eq!(game.snapshot(t0).next_level_in, LEVEL_SCORE_STEP);

        game.push_word(word("zoro", t0));
        type_str(&mut game, "zoro", t0);
        let view = game.snapshot(t0);
        assert_eq!(view.next_level_in, LEVEL_SCORE_STEP - points_for(4, 0, 1));
        assert_eq!(view.level, 1);
    }

    #[test]
    fn test_unmatched_input_is_kept() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("sanji", t0));
        assert_eq!(type_str(&mut game, "san", t0), InputResolution::Pending);
        assert_eq!(game.input(), "san");
        assert_eq!(game.snapshot(t0).words[0].matched, 3);
        game.backspace();
        assert_eq!(game.input(), "sa");
    }

    #[test]
    fn test_input_is_trimmed_and_lowercased() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("nami", t0));
        let res = type_str(&mut game, "NAMI", t0);
        assert!(matches!(res, InputResolution::Hit { .. }));
    }

    #[test]
    fn test_hit_word_fades_then_disappears() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("usopp", t0));
        type_str(&mut game, "usopp", t0);
        assert_eq!(game.words().len(), 1);
        game.frame(t0 + Duration::from_millis(100), Duration::from_millis(100), &mut Fixed);
        game.frame(t0 + Duration::from_millis(200), Duration::from_millis(100), &mut Fixed);
        assert!(game.words().is_empty());
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn test_missed_word_costs_life_and_combo() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.combo = 4;
        game.push_word(doomed("ship", t0));
        game.frame(t0 + Duration::from_millis(100), Duration::from_millis(100), &mut Fixed);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.combo(), 0);
        let events = game.drain_events();
        assert!(events.contains(&ArcadeEvent::LifeLost { lives: 2 }));
        assert!(events.contains(&ArcadeEvent::ComboReset));
    }

    #[test]
    fn test_game_over_exactly_once() {
        let t0 = Instant::now();
        let mut game = game(t0);
        for i in 0..5 {
            game.push_word(doomed(&format!("w{i}"), t0));
        }
        game.frame(t0 + Duration::from_millis(100), Duration::from_millis(100), &mut Fixed);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.push_word(doomed("late", t0));
        game.frame(t0 + Duration::from_millis(200), Duration::from_millis(100), &mut Fixed);
        assert_eq!(game.lives(), 0);

        let overs = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, ArcadeEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
        // Already recorded at game over.
        assert!(game.exit(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_exit_running_game_records_once() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("ace", t0));
        type_str(&mut game, "ace", t0);
        let summary = game.exit(t0 + Duration::from_secs(30)).unwrap();
        assert_eq!(summary.words_hit, 1);
        assert_eq!(summary.duration, Duration::from_secs(30));
        assert_eq!(summary.accuracy, 100);
        assert!(game.exit(t0 + Duration::from_secs(31)).is_none());

        let entry = summary.to_history_entry();
        assert_eq!(entry.mode, HistoryMode::Zoro);
        assert_eq!(entry.time, "0:30");
        assert_eq!(entry.arcade.unwrap().score, summary.score);
    }

    #[test]
    fn test_restart_resets_without_summary() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("ace", t0));
        type_str(&mut game, "ace", t0);
        game.restart(t0 + Duration::from_secs(5));
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 3);
        assert!(game.words().is_empty());
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_level_up_at_step() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.add_points(LEVEL_SCORE_STEP - 1, t0);
        assert_eq!(game.level(), 1);
        game.add_points(1, t0);
        assert_eq!(game.level(), 2);
        assert_eq!(game.spawn_interval(), Duration::from_millis(1800));
        assert!(game.drain_events().contains(&ArcadeEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_tier_transition_fires_once() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.add_points(3000, t0);
        game.add_points(100, t0);
        let tiers: Vec<_> = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, ArcadeEvent::TierAdvanced { .. }))
            .collect();
        assert_eq!(
            tiers,
            vec![ArcadeEvent::TierAdvanced {
                index: 1,
                name: "Paradise".into()
            }]
        );
        assert_eq!(game.tier_name(), "Paradise");
    }

    #[test]
    fn test_combo_idle_timeout() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("zoro", t0));
        type_str(&mut game, "zoro", t0);
        game.frame(t0 + Duration::from_millis(2900), Duration::from_millis(16), &mut Fixed);
        assert_eq!(game.combo(), 1);
        game.frame(t0 + Duration::from_millis(3000), Duration::from_millis(16), &mut Fixed);
        assert_eq!(game.combo(), 0);
        assert_eq!(game.max_combo(), 1);
    }

    #[test]
    fn test_combo_timeout_disabled_with_zero() {
        let t0 = Instant::now();
        let config = ArcadeConfig {
            combo_idle_timeout_secs: 0.0,
            ..ArcadeConfig::default()
        };
        let mut game = ArcadeGame::new(config, t0, Some(1));
        game.push_word(word("zoro", t0));
        type_str(&mut game, "zoro", t0);
        game.frame(t0 + Duration::from_secs(30), Duration::from_millis(16), &mut Fixed);
        assert_eq!(game.combo(), 1);
    }

    #[test]
    fn test_power_up_name_only_when_available() {
        let t0 = Instant::now();
        let mut game = game(t0);
        assert_eq!(type_str(&mut game, "onigiri", t0), InputResolution::Pending);
        assert_eq!(game.input(), "onigiri");
    }

    #[test]
    fn test_onigiri_restores_capped_life() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.lives = 1;
        game.combo = 5;
        game.refresh_power_ups();
        assert!(game.power_up(PowerUpKind::Onigiri).available);

        assert_eq!(
            type_str(&mut game, "onigiri", t0),
            InputResolution::PowerUp(PowerUpKind::Onigiri)
        );
        assert_eq!(game.lives(), 2);
        assert_eq!(game.power_up(PowerUpKind::Onigiri).cooldown_secs, 30);
        assert!(!game.power_up(PowerUpKind::Onigiri).available);

        game.lives = 3;
        game.power_ups = PowerUps::new();
        game.refresh_power_ups();
        type_str(&mut game, "onigiri", t0);
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn test_haki_blocks_life_loss_until_expiry() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.combo = 10;
        game.refresh_power_ups();
        type_str(&mut game, "haki", t0);
        assert!(game.is_invincible(t0));

        game.push_word(doomed("kaido", t0));
        game.frame(t0 + Duration::from_millis(100), Duration::from_millis(100), &mut Fixed);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.combo(), 10);

        game.frame(t0 + Duration::from_secs(15), Duration::from_millis(16), &mut Fixed);
        assert!(!game.is_invincible(t0 + Duration::from_secs(15)));
        assert!(game.drain_events().contains(&ArcadeEvent::InvincibilityEnded));
    }

    #[test]
    fn test_ashura_hits_every_active_word() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.combo = 15;
        game.refresh_power_ups();
        assert!(game.power_up(PowerUpKind::Ashura).available);

        for text in ["luffy", "nami", "chopper"] {
            game.push_word(word(text, t0));
        }
        let expected: u32 = [5, 4, 7].iter().map(|&len| points_for(len, 15, 1)).sum();

        assert_eq!(
            type_str(&mut game, "ashura", t0),
            InputResolution::PowerUp(PowerUpKind::Ashura)
        );
        assert!(game.words().iter().all(|w| w.hit));
        assert_eq!(game.score(), expected);
        assert_eq!(game.combo(), 15);

        let state = game.power_up(PowerUpKind::Ashura);
        assert_eq!(state.cooldown_secs, 60);
        assert!(!state.available);

        // Still on cooldown after 59 seconds.
        game.frame(t0 + Duration::from_secs(59), Duration::from_millis(16), &mut Fixed);
        game.combo = 15;
        game.refresh_power_ups();
        assert!(!game.power_up(PowerUpKind::Ashura).available);

        game.frame(t0 + Duration::from_secs(60), Duration::from_millis(16), &mut Fixed);
        game.combo = 15;
        game.refresh_power_ups();
        assert!(game.power_up(PowerUpKind::Ashura).available);
    }

    #[test]
    fn test_snapshot_projects_state() {
        let t0 = Instant::now();
        let mut game = game(t0);
        game.push_word(word("zoro", t0));
        let view = game.snapshot(t0 + Duration::from_secs(2));
        assert_eq!(view.lives, 3);
        assert_eq!(view.tier, "East Blue");
        assert_eq!(view.words.len(), 1);
        assert_eq!(view.power_ups.len(), 3);
        assert_eq!(view.elapsed_secs, 2);
        assert_eq!(view.invincible_secs, None);
    }
}
