use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arcade::powerup::{PowerUpKind, PowerUpRule};
use crate::arcade::scoring::{COMBO_IDLE_TIMEOUT_SECS, LEVEL_SCORE_STEP};
use crate::arcade::tier::{TierDef, default_tiers};
use crate::error::Result;

pub const AVAILABLE_WORD_COUNTS: [usize; 6] = [20, 50, 100, 200, 500, 1000];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,
    #[serde(default = "default_word_counts")]
    pub word_counts: Vec<usize>,
    #[serde(default = "default_word_count")]
    pub default_word_count: usize,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Ring the terminal bell where a sound would play.
    #[serde(default)]
    pub bell: bool,
    #[serde(default)]
    pub arcade: ArcadeConfig,
}

fn default_time_limit_secs() -> u32 {
    15
}
fn default_word_counts() -> Vec<usize> {
    AVAILABLE_WORD_COUNTS.to_vec()
}
fn default_word_count() -> usize {
    20
}
fn default_max_history() -> usize {
    100
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            word_counts: default_word_counts(),
            default_word_count: default_word_count(),
            max_history: default_max_history(),
            theme: default_theme(),
            bell: false,
            arcade: ArcadeConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typesmash")
            .join("config.toml")
    }

    /// Clamp out-of-range values left behind by hand-edited or stale files.
    pub fn validate(&mut self) {
        self.time_limit_secs = self.time_limit_secs.clamp(5, 300);

        self.word_counts.retain(|&n| n > 0);
        self.word_counts.sort_unstable();
        self.word_counts.dedup();
        if self.word_counts.is_empty() {
            self.word_counts = default_word_counts();
        }
        if !self.word_counts.contains(&self.default_word_count) {
            self.default_word_count = self.word_counts[0];
        }

        self.max_history = self.max_history.clamp(1, 1000);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        self.arcade.validate();
    }

    /// Next entry in the word-count cycle, wrapping around.
    pub fn next_word_count(&self, current: usize) -> usize {
        match self.word_counts.iter().position(|&n| n == current) {
            Some(i) => self.word_counts[(i + 1) % self.word_counts.len()],
            None => self.default_word_count,
        }
    }

    pub fn prev_word_count(&self, current: usize) -> usize {
        match self.word_counts.iter().position(|&n| n == current) {
            Some(0) => self.word_counts[self.word_counts.len() - 1],
            Some(i) => self.word_counts[i - 1],
            None => self.default_word_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcadeConfig {
    #[serde(default = "default_lives")]
    pub initial_lives: u8,
    #[serde(default = "default_lives")]
    pub max_lives: u8,
    #[serde(default = "default_base_spawn_interval_ms")]
    pub base_spawn_interval_ms: u64,
    #[serde(default = "default_spawn_interval_step_ms")]
    pub spawn_interval_step_ms: u64,
    #[serde(default = "default_min_spawn_interval_ms")]
    pub min_spawn_interval_ms: u64,
    /// Field units per second at level 0; the field is 100 units tall.
    #[serde(default = "default_base_word_speed")]
    pub base_word_speed: f64,
    #[serde(default = "default_word_speed_per_level")]
    pub word_speed_per_level: f64,
    #[serde(default = "default_rising_chance_per_level")]
    pub rising_chance_per_level: f64,
    #[serde(default = "default_max_rising_chance")]
    pub max_rising_chance: f64,
    #[serde(default = "default_hit_fade_ms")]
    pub hit_fade_ms: u64,
    /// Seconds without a hit before the combo drops to zero. 0 disables.
    #[serde(default = "default_combo_idle_timeout_secs")]
    pub combo_idle_timeout_secs: f64,
    #[serde(default = "default_level_score_step")]
    pub level_score_step: u32,
    #[serde(default = "default_haki_duration_secs")]
    pub haki_duration_secs: u32,
    #[serde(default = "default_onigiri_rule")]
    pub onigiri: PowerUpRule,
    #[serde(default = "default_haki_rule")]
    pub haki: PowerUpRule,
    #[serde(default = "default_ashura_rule")]
    pub ashura: PowerUpRule,
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierDef>,
}

fn default_lives() -> u8 {
    3
}
fn default_base_spawn_interval_ms() -> u64 {
    2000
}
fn default_spawn_interval_step_ms() -> u64 {
    100
}
fn default_min_spawn_interval_ms() -> u64 {
    400
}
fn default_base_word_speed() -> f64 {
    10.0
}
fn default_word_speed_per_level() -> f64 {
    1.3
}
fn default_rising_chance_per_level() -> f64 {
    0.02
}
fn default_max_rising_chance() -> f64 {
    0.3
}
fn default_hit_fade_ms() -> u64 {
    170
}
fn default_combo_idle_timeout_secs() -> f64 {
    COMBO_IDLE_TIMEOUT_SECS
}
fn default_level_score_step() -> u32 {
    LEVEL_SCORE_STEP
}
fn default_haki_duration_secs() -> u32 {
    15
}
fn default_onigiri_rule() -> PowerUpRule {
    PowerUpKind::Onigiri.default_rule()
}
fn default_haki_rule() -> PowerUpRule {
    PowerUpKind::Haki.default_rule()
}
fn default_ashura_rule() -> PowerUpRule {
    PowerUpKind::Ashura.default_rule()
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            initial_lives: default_lives(),
            max_lives: default_lives(),
            base_spawn_interval_ms: default_base_spawn_interval_ms(),
            spawn_interval_step_ms: default_spawn_interval_step_ms(),
            min_spawn_interval_ms: default_min_spawn_interval_ms(),
            base_word_speed: default_base_word_speed(),
            word_speed_per_level: default_word_speed_per_level(),
            rising_chance_per_level: default_rising_chance_per_level(),
            max_rising_chance: default_max_rising_chance(),
            hit_fade_ms: default_hit_fade_ms(),
            combo_idle_timeout_secs: default_combo_idle_timeout_secs(),
            level_score_step: default_level_score_step(),
            haki_duration_secs: default_haki_duration_secs(),
            onigiri: default_onigiri_rule(),
            haki: default_haki_rule(),
            ashura: default_ashura_rule(),
            tiers: default_tiers(),
        }
    }
}

impl ArcadeConfig {
    pub fn rule(&self, kind: PowerUpKind) -> &PowerUpRule {
        match kind {
            PowerUpKind::Onigiri => &self.onigiri,
            PowerUpKind::Haki => &self.haki,
            PowerUpKind::Ashura => &self.ashura,
        }
    }

    pub fn validate(&mut self) {
        self.max_lives = self.max_lives.clamp(1, 9);
        self.initial_lives = self.initial_lives.clamp(1, self.max_lives);
        self.min_spawn_interval_ms = self.min_spawn_interval_ms.max(50);
        self.base_spawn_interval_ms = self.base_spawn_interval_ms.max(self.min_spawn_interval_ms);
        if !self.base_word_speed.is_finite() || self.base_word_speed <= 0.0 {
            self.base_word_speed = default_base_word_speed();
        }
        if !self.word_speed_per_level.is_finite() || self.word_speed_per_level < 0.0 {
            self.word_speed_per_level = default_word_speed_per_level();
        }
        self.max_rising_chance = self.max_rising_chance.clamp(0.0, 1.0);
        self.rising_chance_per_level = self.rising_chance_per_level.clamp(0.0, 1.0);
        if !self.combo_idle_timeout_secs.is_finite() || self.combo_idle_timeout_secs < 0.0 {
            self.combo_idle_timeout_secs = default_combo_idle_timeout_secs();
        }
        self.level_score_step = self.level_score_step.max(1);

        self.tiers.retain(|t| !t.name.trim().is_empty());
        self.tiers.sort_by_key(|t| t.threshold);
        self.tiers.dedup_by_key(|t| t.threshold);
        if self.tiers.first().is_none_or(|t| t.threshold != 0) {
            self.tiers = default_tiers();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.time_limit_secs, 15);
        assert_eq!(config.word_counts, vec![20, 50, 100, 200, 500, 1000]);
        assert_eq!(config.max_history, 100);
        assert_eq!(config.arcade.tiers[0].name, "East Blue");
    }

    #[test]
    fn test_config_partial_arcade_section() {
        let toml_str = r#"
time_limit_secs = 30

[arcade]
combo_idle_timeout_secs = 0.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.time_limit_secs, 30);
        assert_eq!(config.arcade.combo_idle_timeout_secs, 0.0);
        assert_eq!(config.arcade.level_score_step, LEVEL_SCORE_STEP);
        assert_eq!(config.arcade.haki.cooldown_secs, 45);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.time_limit_secs = 0;
        config.word_counts = vec![0, 50, 50, 20];
        config.default_word_count = 999;
        config.max_history = 0;
        config.arcade.initial_lives = 12;
        config.arcade.tiers.clear();

        config.validate();

        assert_eq!(config.time_limit_secs, 5);
        assert_eq!(config.word_counts, vec![20, 50]);
        assert_eq!(config.default_word_count, 20);
        assert_eq!(config.max_history, 1);
        assert_eq!(config.arcade.initial_lives, 3);
        assert_eq!(config.arcade.tiers, default_tiers());
    }

    #[test]
    fn test_validate_rejects_tier_table_without_zero_threshold() {
        let mut config = Config::default();
        config.arcade.tiers = vec![TierDef::new("Late", 500)];
        config.validate();
        assert_eq!(config.arcade.tiers[0].threshold, 0);
    }

    #[test]
    fn test_word_count_cycle_wraps() {
        let config = Config::default();
        assert_eq!(config.next_word_count(20), 50);
        assert_eq!(config.next_word_count(1000), 20);
        assert_eq!(config.prev_word_count(20), 1000);
        assert_eq!(config.prev_word_count(77), 20);
    }
}
