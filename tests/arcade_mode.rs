use std::time::{Duration, Instant};

use typesmash::arcade::game::{ArcadeEvent, ArcadeGame, GamePhase, InputResolution};
use typesmash::arcade::powerup::PowerUpKind;
use typesmash::arcade::word::{Direction, FallingWord};
use typesmash::config::ArcadeConfig;
use typesmash::generator::{Passage, WordSource};
use typesmash::store::history::HistoryMode;

struct Tiered;

impl WordSource for Tiered {
    fn random_word(&mut self) -> String {
        "ship".into()
    }
    fn random_passage(&mut self, _nominal: usize) -> Passage {
        Passage::new("ship".into())
    }
    fn themed_word(&mut self, tier: &str) -> String {
        if tier == "East Blue" { "Buggy".into() } else { "Kaido".into() }
    }
}

const WARMUP: [&str; 15] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar",
];

fn type_str(game: &mut ArcadeGame, text: &str, now: Instant) -> InputResolution {
    let mut last = InputResolution::Pending;
    for ch in text.chars() {
        last = game.type_char(ch, now);
    }
    last
}

fn slash(game: &mut ArcadeGame, text: &str, now: Instant) -> InputResolution {
    game.push_word(FallingWord::new(text.into(), 50.0, 10.0, Direction::Down, now));
    type_str(game, text, now)
}

#[test]
fn spawned_words_come_from_the_current_tier() {
    let t0 = Instant::now();
    let mut game = ArcadeGame::new(ArcadeConfig::default(), t0, Some(1));
    game.frame(t0, Duration::ZERO, &mut Tiered);

    assert_eq!(game.words().len(), 1);
    assert_eq!(game.words()[0].text, "buggy");
    assert_eq!(game.tier_name(), "East Blue");
}

#[test]
fn ashura_clears_the_field_after_a_fifteen_combo() {
    let t0 = Instant::now();
    let mut game = ArcadeGame::new(ArcadeConfig::default(), t0, Some(3));

    for word in WARMUP {
        assert!(matches!(slash(&mut game, word, t0), InputResolution::Hit { .. }));
    }
    assert_eq!(game.combo(), 15);
    assert!(game.power_up(PowerUpKind::Ashura).available);
    game.drain_events();

    let before = game.score();
    for text in ["papa", "quebec", "romeo"] {
        game.push_word(FallingWord::new(text.into(), 20.0, 10.0, Direction::Down, t0));
    }
    assert_eq!(
        type_str(&mut game, "ashura", t0),
        InputResolution::PowerUp(PowerUpKind::Ashura)
    );

    assert!(game.words().iter().all(|w| w.hit));
    assert!(game.score() > before);
    assert_eq!(game.combo(), 15);
    assert_eq!(game.power_up(PowerUpKind::Ashura).cooldown_secs, 60);
    assert!(!game.power_up(PowerUpKind::Ashura).available);

    let events = game.drain_events();
    assert_eq!(events[0], ArcadeEvent::PowerUpActivated(PowerUpKind::Ashura));
    let hits = events
        .iter()
        .filter(|e| matches!(e, ArcadeEvent::WordHit { .. }))
        .count();
    assert_eq!(hits, 3);
}

#[test]
fn unattended_game_ends_once_and_summarizes() {
    let t0 = Instant::now();
    let mut game = ArcadeGame::new(ArcadeConfig::default(), t0, Some(9));
    let mut now = t0;
    let mut game_overs = 0;

    for _ in 0..3000 {
        now += Duration::from_millis(50);
        game.frame(now, Duration::from_millis(50), &mut Tiered);
        game_overs += game
            .drain_events()
            .iter()
            .filter(|e| matches!(e, ArcadeEvent::GameOver(_)))
            .count();
    }

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.lives(), 0);
    assert_eq!(game_overs, 1);
    assert_eq!(game.exit(now), None);

    let entry = game.summary(now).to_history_entry();
    assert_eq!(entry.mode, HistoryMode::Zoro);
    assert_eq!(entry.errors, 3);
    assert!(entry.arcade.is_some());
}

#[test]
fn restart_after_game_over_starts_clean() {
    let t0 = Instant::now();
    let mut config = ArcadeConfig::default();
    config.initial_lives = 1;
    let mut game = ArcadeGame::new(config, t0, Some(5));
    let mut now = t0;
    while game.phase() == GamePhase::Running {
        now += Duration::from_millis(100);
        game.frame(now, Duration::from_millis(100), &mut Tiered);
    }

    game.restart(now);
    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.score(), 0);
    assert_eq!(game.lives(), 1);
    assert!(game.words().is_empty());
    assert!(game.drain_events().is_empty());
}
