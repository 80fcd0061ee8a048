//! Per-growth-stage stat tables for the puck and the player
//!
//! Tables are loaded once from config and never mutated. Every lookup
//! clamps the stage into range, so callers can pass any stage number.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};

/// One row of the puck stat table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuckStats {
    /// Base visual/collision scale before skill multipliers
    pub scale: f32,
    pub mass: f32,
    /// Per-tick velocity multiplier from surface friction, in (0, 1]
    pub friction: f32,
    pub max_speed: f32,
    pub max_force: f32,
}

/// One row of the player stat table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub scale: f32,
    pub mass: f32,
    /// Multiplier applied to the impulse the player delivers to the puck
    pub collision_force: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub attack_power: f32,
}

/// Immutable table indexed by growth stage (1-based)
#[derive(Debug, Clone, PartialEq)]
pub struct StatTable<T> {
    rows: Vec<T>,
}

impl<T> StatTable<T> {
    /// Build a table; an empty row list is a configuration error
    pub fn new(name: &'static str, rows: Vec<T>) -> ConfigResult<Self> {
        if rows.is_empty() {
            return Err(ConfigError::EmptyTable { name });
        }
        Ok(Self { rows })
    }

    /// Built-in default rows, which are never empty
    pub(crate) fn fallback(rows: Vec<T>) -> Self {
        Self { rows }
    }

    /// Row for a 1-based growth stage, clamped into the table
    pub fn row(&self, stage: u32) -> &T {
        &self.rows[stage_index(stage, self.rows.len())]
    }

    /// Number of stages (the highest valid stage number)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }
}

/// Convert a 1-based stage into a row index clamped to `[0, len-1]`
#[inline]
pub fn stage_index(stage: u32, len: usize) -> usize {
    (stage.saturating_sub(1) as usize).min(len.saturating_sub(1))
}

/// Default puck table: stage 1 caps at speed 15 and force 12
pub fn default_puck_stats() -> Vec<PuckStats> {
    vec![
        PuckStats { scale: 1.0, mass: 1.0, friction: 0.995, max_speed: 15.0, max_force: 12.0 },
        PuckStats { scale: 1.2, mass: 1.3, friction: 0.995, max_speed: 17.0, max_force: 15.0 },
        PuckStats { scale: 1.45, mass: 1.7, friction: 0.996, max_speed: 19.0, max_force: 19.0 },
        PuckStats { scale: 1.75, mass: 2.2, friction: 0.996, max_speed: 21.0, max_force: 24.0 },
        PuckStats { scale: 2.1, mass: 2.8, friction: 0.997, max_speed: 23.0, max_force: 30.0 },
    ]
}

/// Default player table, one row per growth stage
pub fn default_player_stats() -> Vec<PlayerStats> {
    vec![
        PlayerStats { scale: 1.0, mass: 1.0, collision_force: 1.0, max_speed: 10.0, max_force: 12.0, attack_power: 10.0 },
        PlayerStats { scale: 1.15, mass: 1.2, collision_force: 1.1, max_speed: 11.0, max_force: 15.0, attack_power: 15.0 },
        PlayerStats { scale: 1.3, mass: 1.45, collision_force: 1.2, max_speed: 12.0, max_force: 19.0, attack_power: 22.0 },
        PlayerStats { scale: 1.5, mass: 1.75, collision_force: 1.3, max_speed: 13.0, max_force: 24.0, attack_power: 32.0 },
        PlayerStats { scale: 1.7, mass: 2.1, collision_force: 1.45, max_speed: 14.0, max_force: 30.0, attack_power: 45.0 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_index_clamps() {
        assert_eq!(stage_index(0, 5), 0);
        assert_eq!(stage_index(1, 5), 0);
        assert_eq!(stage_index(3, 5), 2);
        assert_eq!(stage_index(99, 5), 4);
    }

    #[test]
    fn test_row_lookup_clamps_out_of_range() {
        let table = StatTable::new("puck_stats", default_puck_stats()).unwrap();
        assert_eq!(table.row(0).max_speed, 15.0);
        assert_eq!(table.row(1).max_force, 12.0);
        assert_eq!(table.row(100), table.row(5));
    }

    #[test]
    fn test_empty_table_rejected() {
        let result = StatTable::<PuckStats>::new("puck_stats", Vec::new());
        assert!(matches!(result, Err(ConfigError::EmptyTable { name: "puck_stats" })));
    }
}
