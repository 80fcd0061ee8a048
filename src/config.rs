//! Game balance configuration
//!
//! Stat tables, the skill catalog and stage layout, loaded from JSON.
//! Loading never fails: a missing or broken file falls back to the
//! defaults with a warning, and a missing file is written out so it can be
//! tuned without recompiling.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::skills::{SkillCatalog, SkillDef, default_skill_defs};
use crate::sim::tables::{
    PlayerStats, PuckStats, StatTable, default_player_stats, default_puck_stats,
};

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the config file failed
    Io { path: String, source: std::io::Error },
    /// The file is not valid config JSON
    Parse(serde_json::Error),
    /// A stat table has no rows
    EmptyTable { name: &'static str },
    /// A value is outside the range the simulation can use
    InvalidValue {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "config file '{}': {}", path, source),
            ConfigError::Parse(err) => write!(f, "config parse error: {}", err),
            ConfigError::EmptyTable { name } => write!(f, "stat table '{}' has no rows", name),
            ConfigError::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "'{}' = {} is outside {}", name, value, expected),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Puck motion and bounce parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Per-tick velocity multiplier, in (0, 1]
    pub air_resistance: f32,
    /// Speed below which the puck snaps to rest
    pub min_velocity: f32,
    /// Fraction of speed kept after a bounce
    pub restitution: f32,
    pub puck_radius: f32,
    pub player_radius: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            air_resistance: AIR_RESISTANCE,
            min_velocity: MIN_VELOCITY,
            restitution: RESTITUTION,
            puck_radius: PUCK_RADIUS,
            player_radius: PLAYER_RADIUS,
        }
    }
}

/// Missile skill parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileConfig {
    /// Seconds between shots
    pub interval: f32,
    pub speed: f32,
    /// Seconds a missile flies before expiring
    pub lifetime: f32,
    pub radius: f32,
    /// Re-aim at the target every tick
    pub homing: bool,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            interval: MISSILE_INTERVAL,
            speed: MISSILE_SPEED,
            lifetime: MISSILE_LIFETIME,
            radius: MISSILE_RADIUS,
            homing: true,
        }
    }
}

/// Stage layout used by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub zone_count: u32,
    pub zone_depth: f32,
    /// Front width of the first zone
    pub first_width: f32,
    /// Each zone's back edge is this much wider than its front edge
    pub width_growth: f32,
    pub destructibles_per_zone: u32,
    pub destructible_radius: f32,
    pub base_health: f32,
    pub health_per_level: f32,
    pub base_points: u32,
    pub points_per_level: u32,
    /// Chance that an obstacle requires the zone level to be damaged
    pub tiered_chance: f32,
    pub ring_count: u32,
    pub ring_spacing: f32,
    pub ring_objects: u32,
    pub ring_health: f32,
    pub ring_points: u32,
    /// Per-zone experience multipliers, indexed by zone order (missing = 1.0)
    pub score_multipliers: Vec<f32>,
    /// Per-zone attack multipliers, indexed by zone order (missing = 1.0)
    pub damage_multipliers: Vec<f32>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            zone_count: 4,
            zone_depth: 20.0,
            first_width: 16.0,
            width_growth: 4.0,
            destructibles_per_zone: 6,
            destructible_radius: 0.8,
            base_health: 20.0,
            health_per_level: 15.0,
            base_points: 20,
            points_per_level: 15,
            tiered_chance: 0.2,
            ring_count: 3,
            ring_spacing: 18.0,
            ring_objects: 12,
            ring_health: 10.0,
            ring_points: 5,
            score_multipliers: Vec::new(),
            damage_multipliers: Vec::new(),
        }
    }
}

impl StageConfig {
    pub fn score_multiplier(&self, zone: usize) -> f32 {
        self.score_multipliers.get(zone).copied().unwrap_or(1.0)
    }

    pub fn damage_multiplier(&self, zone: usize) -> f32 {
        self.damage_multipliers.get(zone).copied().unwrap_or(1.0)
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub puck_stats: Vec<PuckStats>,
    pub player_stats: Vec<PlayerStats>,
    /// Experience required per level; `level_thresholds[n]` reaches level `n + 1`
    pub level_thresholds: Vec<u64>,
    pub skills: Vec<SkillDef>,
    pub physics: PhysicsConfig,
    pub missile: MissileConfig,
    pub stage: StageConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            puck_stats: default_puck_stats(),
            player_stats: default_player_stats(),
            level_thresholds: vec![0, 100, 300, 600, 1000, 1500, 2100],
            skills: default_skill_defs(),
            physics: PhysicsConfig::default(),
            missile: MissileConfig::default(),
            stage: StageConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse config JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from disk, falling back to defaults on any error.
    /// A missing file is created with the default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config.validated()
                }
                Err(err) => {
                    log::warn!("{}, using defaults", err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {}, writing defaults", path.display());
                let config = Self::default();
                if let Err(err) = config.save(path) {
                    log::warn!("{}", err);
                }
                config
            }
            Err(source) => {
                let err = ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                };
                log::warn!("{}, using defaults", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Problems that [`GameConfig::validated`] would repair
    pub fn check(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        if self.puck_stats.is_empty() {
            problems.push(ConfigError::EmptyTable { name: "puck_stats" });
        }
        if self.player_stats.is_empty() {
            problems.push(ConfigError::EmptyTable { name: "player_stats" });
        }
        if self.level_thresholds.is_empty() {
            problems.push(ConfigError::EmptyTable { name: "level_thresholds" });
        }
        for row in &self.puck_stats {
            if !(row.friction > 0.0 && row.friction <= 1.0) {
                problems.push(ConfigError::InvalidValue {
                    name: "puck_stats.friction",
                    value: row.friction,
                    expected: "(0, 1]",
                });
            }
            if row.mass <= 0.0 {
                problems.push(ConfigError::InvalidValue {
                    name: "puck_stats.mass",
                    value: row.mass,
                    expected: "(0, inf)",
                });
            }
        }
        for row in &self.player_stats {
            for (name, value) in player_row_values(row) {
                if !(value > 0.0) {
                    problems.push(ConfigError::InvalidValue {
                        name,
                        value,
                        expected: "(0, inf)",
                    });
                }
            }
        }
        if self.stage.destructibles_per_zone == 0 {
            problems.push(ConfigError::InvalidValue {
                name: "stage.destructibles_per_zone",
                value: 0.0,
                expected: "[1, inf)",
            });
        }
        let air = self.physics.air_resistance;
        if !(air > 0.0 && air <= 1.0) {
            problems.push(ConfigError::InvalidValue {
                name: "physics.air_resistance",
                value: air,
                expected: "(0, 1]",
            });
        }
        let restitution = self.physics.restitution;
        if !(0.0..=1.0).contains(&restitution) {
            problems.push(ConfigError::InvalidValue {
                name: "physics.restitution",
                value: restitution,
                expected: "[0, 1]",
            });
        }
        if self.missile.interval <= 0.0 {
            problems.push(ConfigError::InvalidValue {
                name: "missile.interval",
                value: self.missile.interval,
                expected: "(0, inf)",
            });
        }
        problems
    }

    /// Repair anything unusable, logging a warning per repair
    pub fn validated(mut self) -> Self {
        for problem in self.check() {
            log::warn!("Config: {}, falling back to default", problem);
        }
        let defaults = Self::default();
        if self.puck_stats.is_empty()
            || self
                .puck_stats
                .iter()
                .any(|r| !(r.friction > 0.0 && r.friction <= 1.0) || r.mass <= 0.0)
        {
            self.puck_stats = defaults.puck_stats;
        }
        if self.player_stats.is_empty()
            || self
                .player_stats
                .iter()
                .any(|r| player_row_values(r).iter().any(|(_, v)| !(*v > 0.0)))
        {
            self.player_stats = defaults.player_stats;
        }
        if self.stage.destructibles_per_zone == 0 {
            self.stage.destructibles_per_zone = defaults.stage.destructibles_per_zone;
        }
        if self.level_thresholds.is_empty() {
            self.level_thresholds = defaults.level_thresholds;
        } else if !self.level_thresholds.is_sorted() {
            log::warn!("Config: level_thresholds not ascending, sorting");
            self.level_thresholds.sort_unstable();
        }
        let air = self.physics.air_resistance;
        if !(air > 0.0 && air <= 1.0) {
            self.physics.air_resistance = defaults.physics.air_resistance;
        }
        if !(0.0..=1.0).contains(&self.physics.restitution) {
            self.physics.restitution = defaults.physics.restitution;
        }
        if self.missile.interval <= 0.0 {
            self.missile.interval = defaults.missile.interval;
        }
        self
    }

    /// Highest growth stage both tables can serve
    pub fn max_growth_stage(&self) -> u32 {
        self.puck_stats.len().min(self.player_stats.len()).max(1) as u32
    }

    pub fn puck_table(&self) -> StatTable<PuckStats> {
        StatTable::new("puck_stats", self.puck_stats.clone()).unwrap_or_else(|err| {
            log::warn!("{}, using default puck table", err);
            StatTable::fallback(default_puck_stats())
        })
    }

    pub fn player_table(&self) -> StatTable<PlayerStats> {
        StatTable::new("player_stats", self.player_stats.clone()).unwrap_or_else(|err| {
            log::warn!("{}, using default player table", err);
            StatTable::fallback(default_player_stats())
        })
    }

    pub fn skill_catalog(&self) -> SkillCatalog {
        SkillCatalog::new(self.skills.iter().cloned())
    }
}

/// Player row values that must be strictly positive
fn player_row_values(row: &PlayerStats) -> [(&'static str, f32); 4] {
    [
        ("player_stats.mass", row.mass),
        ("player_stats.max_speed", row.max_speed),
        ("player_stats.max_force", row.max_force),
        ("player_stats.collision_force", row.collision_force),
    ]
}
