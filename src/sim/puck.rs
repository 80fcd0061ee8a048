//! The puck: force integration, friction decay and speed clamping

use glam::Vec3;

use super::tables::{PuckStats, StatTable};
use crate::consts::*;
use crate::planar;

/// The puck body
#[derive(Debug, Clone)]
pub struct Puck {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Current growth stage (1-based)
    growth_stage: u32,
    /// Stat row for the current growth stage
    stats: PuckStats,
    pub air_resistance: f32,
    pub min_velocity: f32,
    /// Radius at scale 1.0
    pub base_radius: f32,
    /// Size multiplier from skills, layered on top of the stage scale
    size_multiplier: f32,
    /// Entity that last imparted force (for damage/score attribution)
    pub last_hit_by: Option<u32>,
    /// Destructibles the puck is currently passing through
    pub inside: Vec<u32>,
}

impl Puck {
    pub fn new(table: &StatTable<PuckStats>, air_resistance: f32, min_velocity: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            growth_stage: 1,
            stats: *table.row(1),
            air_resistance: air_resistance.clamp(f32::EPSILON, 1.0),
            min_velocity: min_velocity.max(0.0),
            base_radius: PUCK_RADIUS,
            size_multiplier: 1.0,
            last_hit_by: None,
            inside: Vec::new(),
        }
    }

    pub fn growth_stage(&self) -> u32 {
        self.growth_stage
    }

    pub fn stats(&self) -> &PuckStats {
        &self.stats
    }

    pub fn max_speed(&self) -> f32 {
        self.stats.max_speed
    }

    pub fn max_force(&self) -> f32 {
        self.stats.max_force
    }

    pub fn mass(&self) -> f32 {
        self.stats.mass
    }

    /// Applied scale: stage base scale times the skill size multiplier
    pub fn scale(&self) -> f32 {
        self.stats.scale * self.size_multiplier
    }

    pub fn radius(&self) -> f32 {
        self.base_radius * self.scale()
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn set_size_multiplier(&mut self, multiplier: f32) {
        self.size_multiplier = multiplier.max(1.0);
    }

    /// Apply an impulse. The force is clamped to the stage's max force
    /// (direction preserved) and only its planar part is used.
    pub fn apply_force(&mut self, force: Vec3, attacker: Option<u32>) {
        let force = planar(force);
        if force == Vec3::ZERO {
            return;
        }
        let force = force.clamp_length_max(self.stats.max_force);
        let mass = self.stats.mass.max(f32::EPSILON);
        self.vel = planar(self.vel + force / mass);
        if attacker.is_some() {
            self.last_hit_by = attacker;
        }
    }

    /// Decay velocity, snap to rest below the threshold, clamp to max speed,
    /// then advance position.
    pub fn integrate(&mut self, dt: f32) {
        if self.vel.length() > self.min_velocity {
            self.vel *= self.air_resistance * self.stats.friction.clamp(f32::EPSILON, 1.0);
        } else {
            self.vel = Vec3::ZERO;
        }
        self.vel = planar(self.vel).clamp_length_max(self.stats.max_speed);
        self.pos = planar(self.pos + self.vel * dt);
    }

    /// Swap to a new stat row. Returns true if the stage actually changed.
    pub fn update_growth_stage(&mut self, new_stage: u32, table: &StatTable<PuckStats>) -> bool {
        if new_stage < 1 || new_stage as usize > table.len() || new_stage == self.growth_stage {
            return false;
        }
        self.growth_stage = new_stage;
        self.stats = *table.row(new_stage);
        self.vel = self.vel.clamp_length_max(self.stats.max_speed);
        true
    }

    /// Return to rest at `spawn`, forgetting pass-through state
    pub fn reset(&mut self, spawn: Vec3) {
        self.pos = planar(spawn);
        self.vel = Vec3::ZERO;
        self.inside.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::default_puck_stats;
    use proptest::prelude::*;

    fn table() -> StatTable<PuckStats> {
        StatTable::new("puck_stats", default_puck_stats()).unwrap()
    }

    fn puck() -> Puck {
        Puck::new(&table(), AIR_RESISTANCE, MIN_VELOCITY)
    }

    #[test]
    fn test_force_clamped_to_max_force() {
        let mut p = puck();
        // Stage 1: max force 12, max speed 15, mass 1
        p.apply_force(Vec3::new(20.0, 0.0, 0.0), Some(7));
        assert!((p.vel.x - 12.0).abs() < 1e-5);
        assert_eq!(p.last_hit_by, Some(7));

        p.integrate(SIM_DT);
        assert!(p.speed() <= 15.0 + 1e-4);
    }

    #[test]
    fn test_force_is_planar() {
        let mut p = puck();
        p.apply_force(Vec3::new(0.0, 50.0, 3.0), None);
        assert_eq!(p.vel.y, 0.0);
        assert!((p.vel.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_force_is_noop() {
        let mut p = puck();
        p.vel = Vec3::new(1.0, 0.0, 1.0);
        p.apply_force(Vec3::ZERO, Some(3));
        assert_eq!(p.vel, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(p.last_hit_by, None);
    }

    #[test]
    fn test_tiny_force_still_applies() {
        let mut p = puck();
        p.apply_force(Vec3::new(0.0, 0.0, 1e-3), Some(3));
        assert!(p.vel.z > 0.0);
        assert_eq!(p.last_hit_by, Some(3));
    }

    #[test]
    fn test_slow_puck_snaps_to_rest() {
        let mut p = puck();
        p.vel = Vec3::new(MIN_VELOCITY * 0.5, 0.0, 0.0);
        p.integrate(SIM_DT);
        assert_eq!(p.vel, Vec3::ZERO);
    }

    #[test]
    fn test_speed_clamp_preserves_direction() {
        let mut p = puck();
        p.vel = Vec3::new(30.0, 0.0, 40.0);
        p.integrate(SIM_DT);
        assert!(p.speed() <= 15.0 + 1e-4);
        let dir = p.vel.normalize();
        assert!((dir.x - 0.6).abs() < 1e-4);
        assert!((dir.z - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_growth_stage_update() {
        let t = table();
        let mut p = puck();
        assert!(!p.update_growth_stage(1, &t)); // Same stage
        assert!(!p.update_growth_stage(0, &t)); // Out of range
        assert!(!p.update_growth_stage(6, &t)); // Out of range
        assert!(p.update_growth_stage(3, &t));
        assert_eq!(p.growth_stage(), 3);
        assert_eq!(p.max_speed(), 19.0);
    }

    #[test]
    fn test_scale_layers_size_multiplier_on_stage_scale() {
        let t = table();
        let mut p = puck();
        p.set_size_multiplier(1.5);
        assert!((p.scale() - 1.5).abs() < 1e-6);
        p.update_growth_stage(2, &t);
        assert!((p.scale() - 1.8).abs() < 1e-5);
        // Never shrinks below the stage scale
        p.set_size_multiplier(0.5);
        assert!((p.scale() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_friction_reaches_rest() {
        let mut p = puck();
        p.apply_force(Vec3::new(0.0, 0.0, 10.0), None);
        let mut last = p.speed();
        let mut ticks = 0;
        while p.speed() > 0.0 {
            p.integrate(SIM_DT);
            assert!(p.speed() <= last);
            last = p.speed();
            ticks += 1;
            assert!(ticks < 100_000, "puck never came to rest");
        }
        assert_eq!(p.vel, Vec3::ZERO);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_stage_cap(
            stage in 1u32..=5,
            forces in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 1..40),
        ) {
            let t = table();
            let mut p = puck();
            p.update_growth_stage(stage, &t);
            for (x, z) in forces {
                p.apply_force(Vec3::new(x, 0.0, z), None);
                p.integrate(SIM_DT);
                prop_assert!(p.speed() <= p.max_speed() + 1e-3);
            }
        }

        #[test]
        fn prop_friction_is_monotonic(speed in 0.0f32..15.0, heading in 0.0f32..6.28) {
            let mut p = puck();
            p.vel = crate::heading_to_planar(heading) * speed;
            let mut last = p.speed();
            for _ in 0..200 {
                p.integrate(SIM_DT);
                prop_assert!(p.speed() <= last + 1e-6);
                last = p.speed();
            }
        }
    }
}
