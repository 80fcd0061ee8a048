//! Experience, levels and growth stages of the player

use super::events::{EventBus, GameEvent};
use super::tables::{PlayerStats, StatTable};

/// How a bonus combines with base attack power
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackBonus {
    /// `base * m`
    Multiplier(f32),
    /// `base + p`
    Flat(f32),
}

impl AttackBonus {
    pub fn apply(&self, base: f32) -> f32 {
        match *self {
            AttackBonus::Multiplier(m) => base * m,
            AttackBonus::Flat(p) => base + p,
        }
    }
}

/// Player leveling state
#[derive(Debug, Clone)]
pub struct PlayerGrowth {
    level: u32,
    experience: u64,
    /// `thresholds[n]` is the experience needed to reach level `n + 1`
    thresholds: Vec<u64>,
    max_growth_stage: u32,
}

impl PlayerGrowth {
    pub fn new(thresholds: Vec<u64>, max_growth_stage: u32) -> Self {
        Self {
            level: 1,
            experience: 0,
            thresholds,
            max_growth_stage: max_growth_stage.max(1),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn max_level(&self) -> u32 {
        (self.thresholds.len() as u32).max(1)
    }

    /// Experience still needed for the next level, if any
    pub fn experience_to_next(&self) -> Option<u64> {
        self.thresholds
            .get(self.level as usize)
            .map(|t| t.saturating_sub(self.experience))
    }

    /// Derived from the level, never stored
    pub fn growth_stage(&self) -> u32 {
        self.level.clamp(1, self.max_growth_stage)
    }

    /// Add experience scaled by the zone multiplier and process every level
    /// threshold it crosses. One `LevelChanged` fires per level gained.
    /// Returns true if at least one level was gained.
    pub fn gain_experience(&mut self, amount: u64, zone_multiplier: f32, events: &mut EventBus) -> bool {
        let scaled = (amount as f64 * f64::from(zone_multiplier.max(0.0))).round() as u64;
        if scaled == 0 {
            return false;
        }
        self.experience = self.experience.saturating_add(scaled);
        events.push(GameEvent::ExperienceGained {
            amount: scaled,
            total: self.experience,
        });

        let mut leveled = false;
        while let Some(&threshold) = self.thresholds.get(self.level as usize) {
            if self.experience < threshold {
                break;
            }
            self.level += 1;
            leveled = true;
            log::info!("Player reached level {}", self.level);
            events.push(GameEvent::LevelChanged { level: self.level });
        }
        leveled
    }

    /// Stage attack power times the zone damage multiplier
    pub fn attack_power(&self, table: &StatTable<PlayerStats>, zone_damage_multiplier: f32) -> f32 {
        table.row(self.growth_stage()).attack_power * zone_damage_multiplier
    }

    /// Attack power with skill bonuses layered on in order
    pub fn attack_power_with(
        &self,
        table: &StatTable<PlayerStats>,
        zone_damage_multiplier: f32,
        bonuses: &[AttackBonus],
    ) -> f32 {
        bonuses
            .iter()
            .fold(self.attack_power(table, zone_damage_multiplier), |acc, b| b.apply(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::default_player_stats;

    fn growth() -> PlayerGrowth {
        PlayerGrowth::new(vec![0, 100, 300, 600, 1000], 5)
    }

    #[test]
    fn test_multi_threshold_level_up() {
        let mut g = growth();
        let mut events = EventBus::new();
        assert!(g.gain_experience(650, 1.0, &mut events));
        assert_eq!(g.level(), 4);
        assert_eq!(g.experience(), 650);

        let levels: Vec<u32> = events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::LevelChanged { level } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![2, 3, 4]);
    }

    #[test]
    fn test_no_level_up_below_threshold() {
        let mut g = growth();
        let mut events = EventBus::new();
        assert!(!g.gain_experience(99, 1.0, &mut events));
        assert_eq!(g.level(), 1);
        assert_eq!(g.experience_to_next(), Some(1));
    }

    #[test]
    fn test_zone_multiplier_rounds() {
        let mut g = growth();
        let mut events = EventBus::new();
        g.gain_experience(10, 1.25, &mut events);
        assert_eq!(g.experience(), 13); // 12.5 rounds away from zero
    }

    #[test]
    fn test_level_caps_at_table_end() {
        let mut g = growth();
        let mut events = EventBus::new();
        g.gain_experience(1_000_000, 1.0, &mut events);
        assert_eq!(g.level(), 5);
        assert_eq!(g.experience_to_next(), None);
    }

    #[test]
    fn test_growth_stage_capped() {
        let mut g = PlayerGrowth::new(vec![0, 10, 20, 30, 40, 50], 3);
        let mut events = EventBus::new();
        g.gain_experience(100, 1.0, &mut events);
        assert_eq!(g.level(), 6);
        assert_eq!(g.growth_stage(), 3);
    }

    #[test]
    fn test_attack_power_composition() {
        let table = StatTable::new("player_stats", default_player_stats()).unwrap();
        let g = growth();
        assert_eq!(g.attack_power(&table, 1.0), 10.0);
        assert_eq!(g.attack_power(&table, 2.0), 20.0);
        let power = g.attack_power_with(
            &table,
            1.0,
            &[AttackBonus::Multiplier(1.5), AttackBonus::Flat(5.0)],
        );
        assert_eq!(power, 20.0);
    }
}
