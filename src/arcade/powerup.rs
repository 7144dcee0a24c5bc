use serde::{Deserialize, Serialize};

use crate::config::ArcadeConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerUpKind {
    /// Restores one life.
    Onigiri,
    /// Temporary invincibility: missed words cost nothing.
    Haki,
    /// Hits every word on the field at once.
    Ashura,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Onigiri, PowerUpKind::Haki, PowerUpKind::Ashura];

    /// The word the player types to trigger it.
    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Onigiri => "onigiri",
            PowerUpKind::Haki => "haki",
            PowerUpKind::Ashura => "ashura",
        }
    }

    pub fn from_name(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == input)
    }

    pub fn description(self) -> &'static str {
        match self {
            PowerUpKind::Onigiri => "restore 1 life",
            PowerUpKind::Haki => "invincibility",
            PowerUpKind::Ashura => "slash every word",
        }
    }

    pub fn default_rule(self) -> PowerUpRule {
        match self {
            PowerUpKind::Onigiri => PowerUpRule {
                unlock_combo: 5,
                unlock_level: 3,
                cooldown_secs: 30,
            },
            PowerUpKind::Haki => PowerUpRule {
                unlock_combo: 10,
                unlock_level: 5,
                cooldown_secs: 45,
            },
            PowerUpKind::Ashura => PowerUpRule {
                unlock_combo: 15,
                unlock_level: 7,
                cooldown_secs: 60,
            },
        }
    }

    fn slot(self) -> usize {
        match self {
            PowerUpKind::Onigiri => 0,
            PowerUpKind::Haki => 1,
            PowerUpKind::Ashura => 2,
        }
    }
}

/// Unlock thresholds (either one suffices) and cooldown after use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpRule {
    pub unlock_combo: u32,
    pub unlock_level: u32,
    pub cooldown_secs: u32,
}

impl PowerUpRule {
    pub fn is_unlocked(&self, combo: u32, level: u32) -> bool {
        combo >= self.unlock_combo || level >= self.unlock_level
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerUpState {
    pub available: bool,
    pub cooldown_secs: u32,
}

#[derive(Clone, Debug, Default)]
pub struct PowerUps {
    slots: [PowerUpState; 3],
}

impl PowerUps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: PowerUpKind) -> PowerUpState {
        self.slots[kind.slot()]
    }

    pub fn is_available(&self, kind: PowerUpKind) -> bool {
        self.get(kind).available
    }

    pub fn iter(&self) -> impl Iterator<Item = (PowerUpKind, PowerUpState)> + '_ {
        PowerUpKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }

    /// Recompute availability from cooldowns and unlock rules.
    /// Returns the kinds that just became available.
    pub fn refresh(&mut self, config: &ArcadeConfig, combo: u32, level: u32) -> Vec<PowerUpKind> {
        let mut ready = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = &mut self.slots[kind.slot()];
            let available = slot.cooldown_secs == 0 && config.rule(kind).is_unlocked(combo, level);
            if available && !slot.available {
                ready.push(kind);
            }
            slot.available = available;
        }
        ready
    }

    /// One second of cooldown elapsed.
    pub fn tick_cooldowns(&mut self) {
        for slot in &mut self.slots {
            slot.cooldown_secs = slot.cooldown_secs.saturating_sub(1);
        }
    }

    /// Consume an available power-up and start its cooldown.
    /// Returns false when it was not available.
    pub fn consume(&mut self, config: &ArcadeConfig, kind: PowerUpKind) -> bool {
        let slot = &mut self.slots[kind.slot()];
        if !slot.available {
            return false;
        }
        slot.available = false;
        slot.cooldown_secs = config.rule(kind).cooldown_secs;
        true
    }
}
