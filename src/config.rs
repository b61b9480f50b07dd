//! Game balance tables
//!
//! Every table defaults to the shipped tuning; JSON files only need to list
//! the values they override.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Player base stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub radius: f32,
    pub max_hp: f32,
    /// Invulnerability after a contact hit (ms)
    pub iframe_ms: f64,
    pub damage: f32,
    pub projectile_speed: f32,
    /// Auto-fire cooldown (ms)
    pub projectile_cooldown_ms: f64,
    pub projectile_radius: f32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    /// Time between dashes (ms)
    pub dash_cooldown_ms: f64,
    pub dash_speed: f32,
    /// How long a dash lasts (ms)
    pub dash_duration_ms: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 270.0,
            radius: 48.0,
            max_hp: 100.0,
            iframe_ms: 650.0,
            damage: 10.0,
            projectile_speed: 360.0,
            projectile_cooldown_ms: 900.0,
            projectile_radius: 18.0,
            crit_chance: 0.05,
            crit_mult: 1.5,
            dash_cooldown_ms: 2500.0,
            dash_speed: 700.0,
            dash_duration_ms: 150.0,
        }
    }
}

/// Enemy base stats (before time scaling)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub hp: f32,
    pub contact_damage: f32,
    pub radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 85.0,
            hp: 20.0,
            contact_damage: 10.0,
            radius: 48.0,
        }
    }
}

/// Spawn pacing and difficulty phases (times in seconds of game time)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub initial_interval: f32,
    pub min_interval: f32,
    pub interval_decrease_rate: f32,
    /// Enemy hp grows by this fraction per 10 seconds
    pub hp_scale_rate: f32,
    /// Enemy speed grows by this fraction per second
    pub speed_scale_rate: f32,
    pub easy_until: f32,
    pub easy_multiplier: f32,
    pub hard_from: f32,
    pub hard_multiplier: f32,
    pub very_hard_from: f32,
    pub very_hard_multiplier: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial_interval: 1.2,
            min_interval: 0.12,
            interval_decrease_rate: 0.0016,
            hp_scale_rate: 0.015,
            speed_scale_rate: 0.002,
            easy_until: 90.0,
            easy_multiplier: 0.8,
            hard_from: 300.0,
            hard_multiplier: 1.1,
            very_hard_from: 480.0,
            very_hard_multiplier: 1.25,
        }
    }
}

/// Experience gem drops
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GemConfig {
    pub drop_chance: f64,
    pub min_xp: u32,
    pub max_xp: u32,
    pub radius: f32,
    pub pickup_radius: f32,
    pub magnet_radius: f32,
    pub magnet_speed: f32,
}

impl Default for GemConfig {
    fn default() -> Self {
        Self {
            drop_chance: 1.0,
            min_xp: 1,
            max_xp: 3,
            radius: 10.0,
            pickup_radius: 60.0,
            magnet_radius: 150.0,
            magnet_speed: 480.0,
        }
    }
}

/// Experience curve: `floor(base + level * per_level + level^power * power_scale)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    pub base_xp: f32,
    pub xp_per_level: f32,
    pub xp_power: f32,
    pub xp_power_scale: f32,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_xp: 5.0,
            xp_per_level: 1.8,
            xp_power: 1.35,
            xp_power_scale: 0.6,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Logical field width
    pub field_width: f32,
    /// Logical field height
    pub field_height: f32,
    /// Surviving this long (seconds) wins the run
    pub win_time: f32,
    /// Level-up screen with nothing to offer closes after this long (ms)
    pub auto_advance_ms: f64,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub spawn: SpawnConfig,
    pub gem: GemConfig,
    pub leveling: LevelingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field_width: 1280.0,
            field_height: 720.0,
            win_time: 600.0,
            auto_advance_ms: 1500.0,
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            spawn: SpawnConfig::default(),
            gem: GemConfig::default(),
            leveling: LevelingConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load a config file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e} ({}), using default config", path.display());
                Self::default()
            }
        }
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.field_width <= 0.0 || self.field_height <= 0.0 {
            return invalid("field dimensions must be positive");
        }
        if self.win_time <= 0.0 {
            return invalid("win_time must be positive");
        }
        if self.gem.min_xp > self.gem.max_xp {
            return invalid("gem.min_xp cannot exceed gem.max_xp");
        }
        if !(0.0..=1.0).contains(&self.gem.drop_chance) {
            return invalid("gem.drop_chance must be within [0, 1]");
        }
        let spawn = &self.spawn;
        if spawn.min_interval <= 0.0 || spawn.min_interval > spawn.initial_interval {
            return invalid("spawn.min_interval must be positive and at most initial_interval");
        }
        if !(spawn.easy_until <= spawn.hard_from && spawn.hard_from < spawn.very_hard_from) {
            return invalid("spawn phase thresholds must be increasing");
        }
        if spawn.easy_multiplier <= 0.0
            || spawn.hard_multiplier <= 0.0
            || spawn.very_hard_multiplier <= 0.0
        {
            return invalid("spawn multipliers must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.win_time, 600.0);
        assert_eq!(config.spawn.hard_from, 300.0);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config =
            SimConfig::from_json_str(r#"{ "win_time": 120.0, "enemy": { "hp": 50.0 } }"#).unwrap();
        assert_eq!(config.win_time, 120.0);
        assert_eq!(config.enemy.hp, 50.0);
        // Untouched fields keep defaults
        assert_eq!(config.enemy.speed, 85.0);
        assert_eq!(config.player.max_hp, 100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SimConfig::from_json_str(r#"{ "gem": { "min_xp": 5, "max_xp": 2 } }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = SimConfig::from_json_str("{ not json");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = SimConfig::load_or_default("/nonexistent/horde.json");
        assert_eq!(config.field_width, 1280.0);
    }
}
