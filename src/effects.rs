//! Sounds and notifications. Fire-and-forget: nothing in the core waits on
//! or reads back from an [`Effects`] implementation.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::arcade::game::ArcadeEvent;
use crate::arcade::powerup::PowerUpKind;
use crate::bus::events::BusEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Nice,
    LuffyLaugh,
    Godlike,
    Impressive,
    Perfect,
    Suspicious,
    Gomu,
    NamiSwan,
    Slash,
    Onigiri,
    Haki,
    Ashura,
    EvilLaugh,
    Knockout,
}

pub trait Effects {
    fn play_sound(&mut self, sound: Sound);
    fn show_notification(&mut self, text: &str, duration: Duration);
}

/// A sound with the message that goes with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    pub sound: Option<Sound>,
    pub text: Option<String>,
    pub duration: Duration,
}

impl Cue {
    fn new(sound: Sound, text: &str, millis: u64) -> Self {
        Self {
            sound: Some(sound),
            text: Some(text.to_string()),
            duration: Duration::from_millis(millis),
        }
    }

    fn sound(sound: Sound) -> Self {
        Self {
            sound: Some(sound),
            text: None,
            duration: Duration::ZERO,
        }
    }

    fn text(text: String, millis: u64) -> Self {
        Self {
            sound: None,
            text: Some(text),
            duration: Duration::from_millis(millis),
        }
    }

    pub fn fire(&self, effects: &mut dyn Effects) {
        if let Some(sound) = self.sound {
            effects.play_sound(sound);
        }
        if let Some(text) = &self.text {
            effects.show_notification(text, self.duration);
        }
    }
}

/// At most one reaction to a finished test, first match wins.
pub fn celebration_for(wpm: u32, accuracy: u32, total_chars: usize) -> Option<Cue> {
    if wpm == 69 || accuracy == 69 {
        Some(Cue::new(Sound::Nice, "Nice!", 2000))
    } else if wpm < 20 && total_chars > 30 {
        Some(Cue::new(Sound::LuffyLaugh, "Shishishi! Keep practicing!", 8000))
    } else if wpm > 200 && accuracy > 98 {
        Some(Cue::new(Sound::Suspicious, "Sus... are you a robot?", 3000))
    } else if wpm >= 150 {
        Some(Cue::new(Sound::Godlike, "Are you even human?!", 2000))
    } else if wpm >= 100 {
        Some(Cue::new(Sound::Impressive, "Speed demon!", 2000))
    } else if accuracy == 100 && total_chars > 50 {
        Some(Cue::new(Sound::Perfect, "Flawless victory!", 2000))
    } else {
        None
    }
}

/// Hidden words that react when committed in a typing test.
pub fn word_trigger(word: &str) -> Option<Cue> {
    match word.trim().to_lowercase().as_str() {
        "gomu" | "gomugomu" => Some(Cue::new(Sound::Gomu, "Gomu Gomu no... Typing Test!", 3000)),
        "nami" | "namiswan" => Some(Cue::new(Sound::NamiSwan, "Nami-swaaaan! Berry, berry!", 3000)),
        _ => None,
    }
}

pub fn arcade_cue(event: &ArcadeEvent) -> Option<Cue> {
    match event {
        ArcadeEvent::WordHit { .. } => Some(Cue::sound(Sound::Slash)),
        ArcadeEvent::LifeLost { lives } if *lives > 0 => Some(Cue::sound(Sound::EvilLaugh)),
        ArcadeEvent::PowerUpActivated(kind) => Some(match kind {
            PowerUpKind::Onigiri => Cue::new(Sound::Onigiri, "Onigiri! +1 life", 1500),
            PowerUpKind::Haki => Cue::new(Sound::Haki, "Haki! Invincible", 1500),
            PowerUpKind::Ashura => Cue::new(Sound::Ashura, "Kyutoryu: Ashura!", 1500),
        }),
        ArcadeEvent::PowerUpReady(kind) => {
            Some(Cue::text(format!("Type \"{}\" to use it", kind.name()), 2000))
        }
        ArcadeEvent::TierAdvanced { name, .. } => {
            Some(Cue::text(format!("Entering {}", name.to_uppercase()), 2500))
        }
        ArcadeEvent::LevelUp { level } => Some(Cue::text(format!("Level {level}"), 1200)),
        ArcadeEvent::GameOver(_) => Some(Cue::new(Sound::Knockout, "GAME OVER", 3000)),
        _ => None,
    }
}

/// Reaction to anything on the bus.
pub fn cue_for(event: &BusEvent) -> Option<Cue> {
    match event {
        BusEvent::WordCommitted(word) => word_trigger(&word.typed),
        BusEvent::TestCompleted(result) => {
            celebration_for(result.wpm, result.accuracy, result.total)
        }
        BusEvent::Arcade(event) => arcade_cue(event),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    text: String,
    duration: Duration,
}

/// Terminal effects: notifications are shown one at a time in the UI, and
/// sounds optionally ring the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalEffects {
    bell: bool,
    bell_pending: bool,
    queue: VecDeque<Pending>,
    active: Option<(String, Instant)>,
}

impl TerminalEffects {
    pub fn new(bell: bool) -> Self {
        Self {
            bell,
            ..Self::default()
        }
    }

    /// The notification to show at `now`, advancing the queue as messages
    /// expire.
    pub fn current(&mut self, now: Instant) -> Option<&str> {
        if let Some((_, until)) = &self.active
            && *until <= now
        {
            self.active = None;
        }
        if self.active.is_none()
            && let Some(next) = self.queue.pop_front()
        {
            self.active = Some((next.text, now + next.duration));
        }
        self.active.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.active = None;
    }
}

impl Effects for TerminalEffects {
    fn play_sound(&mut self, sound: Sound) {
        debug!(?sound, "sound");
        if self.bell {
            self.bell_pending = true;
        }
    }

    fn show_notification(&mut self, text: &str, duration: Duration) {
        // Keep the backlog short so stale messages do not trail the game.
        if self.queue.len() >= 3 {
            self.queue.pop_front();
        }
        self.queue.push_back(Pending {
            text: text.to_string(),
            duration,
        });
    }
}
