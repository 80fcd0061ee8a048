//! Periodic missile fire and projectile flight

use glam::Vec3;

use super::targeting::{NearestTarget, TargetingStrategy};
use super::zone::ZoneRecord;
use crate::config::MissileConfig;
use crate::planar;

/// Shortest interval accepted, keeps the fire loop finite
const MIN_INTERVAL: f32 = 0.01;

/// An in-flight missile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub damage: f32,
    pub lifetime_remaining: f32,
    pub owner_id: u32,
    /// Destructible the missile was fired at
    pub target: Option<u32>,
    pub radius: f32,
}

/// A missile that reached an obstacle this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHit {
    pub projectile: u32,
    pub zone: usize,
    pub target: u32,
    pub damage: f32,
    pub owner_id: u32,
    pub pos: Vec3,
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerState {
    Inactive,
    /// Seconds until the next shot
    Active { until_fire: f32 },
}

/// Repeating fire timer driven by the simulation tick
#[derive(Debug)]
pub struct MissileScheduler {
    pub interval: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub radius: f32,
    pub homing: bool,
    damage: f32,
    state: SchedulerState,
    strategy: Box<dyn TargetingStrategy>,
}

impl MissileScheduler {
    pub fn new(config: &MissileConfig) -> Self {
        Self {
            interval: config.interval.max(MIN_INTERVAL),
            speed: config.speed,
            lifetime: config.lifetime,
            radius: config.radius,
            homing: config.homing,
            damage: 0.0,
            state: SchedulerState::Inactive,
            strategy: Box::new(NearestTarget),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn TargetingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn TargetingStrategy>) {
        self.strategy = strategy;
    }

    pub fn strategy_mut(&mut self) -> &mut dyn TargetingStrategy {
        self.strategy.as_mut()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SchedulerState::Active { .. })
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Start firing after one full interval. Re-activating an active
    /// scheduler only updates the damage.
    pub fn activate(&mut self, damage: f32) {
        self.damage = damage;
        if !self.is_active() {
            self.state = SchedulerState::Active {
                until_fire: self.interval,
            };
            log::debug!("Missile scheduler active, every {:.2}s", self.interval);
        }
    }

    /// Cancel every pending shot immediately
    pub fn deactivate(&mut self) {
        if self.is_active() {
            log::debug!("Missile scheduler cancelled");
        }
        self.state = SchedulerState::Inactive;
    }

    /// Advance the timer and fire every shot that came due
    pub fn tick<F>(
        &mut self,
        dt: f32,
        from: Vec3,
        owner_id: u32,
        zones: &[ZoneRecord],
        mut next_id: F,
    ) -> Vec<Projectile>
    where
        F: FnMut() -> u32,
    {
        let mut fired = Vec::new();
        let SchedulerState::Active { mut until_fire } = self.state else {
            return fired;
        };
        until_fire -= dt;
        while until_fire <= 0.0 {
            fired.push(self.fire(from, owner_id, zones, next_id()));
            until_fire += self.interval;
        }
        self.state = SchedulerState::Active { until_fire };
        fired
    }

    fn fire(&self, from: Vec3, owner_id: u32, zones: &[ZoneRecord], id: u32) -> Projectile {
        let from = planar(from);
        let target = self.strategy.find_target(from, zones);
        let dir = target
            .map(|t| planar(t.pos - from).normalize_or_zero())
            .filter(|d| *d != Vec3::ZERO)
            .unwrap_or(Vec3::Z);
        log::trace!("Missile {} fired at {:?}", id, target.map(|t| t.id));
        Projectile {
            id,
            pos: from,
            vel: dir * self.speed,
            damage: self.damage,
            lifetime_remaining: self.lifetime,
            owner_id,
            target: target.map(|t| t.id),
            radius: self.radius,
        }
    }
}

/// Move projectiles, expire old ones and resolve first hits.
/// A projectile is removed on its first hit; it never pierces.
pub fn update_projectiles(
    projectiles: &mut Vec<Projectile>,
    dt: f32,
    zones: &[ZoneRecord],
    homing: bool,
) -> Vec<ProjectileHit> {
    let mut hits = Vec::new();
    projectiles.retain_mut(|p| {
        if homing {
            let target_pos = p.target.and_then(|id| {
                zones
                    .iter()
                    .filter(|z| z.visible)
                    .find_map(|z| z.destructible(id).filter(|d| d.is_alive()).map(|d| d.pos))
            });
            if let Some(pos) = target_pos {
                let dir = planar(pos - p.pos).normalize_or_zero();
                if dir != Vec3::ZERO {
                    p.vel = dir * p.vel.length();
                }
            }
        }

        p.pos = planar(p.pos + p.vel * dt);
        p.lifetime_remaining -= dt;

        for (zone_index, zone) in zones.iter().enumerate().filter(|(_, z)| z.visible) {
            if let Some(d) = zone
                .live_destructibles()
                .find(|d| planar(d.pos - p.pos).length() < d.radius + p.radius)
            {
                hits.push(ProjectileHit {
                    projectile: p.id,
                    zone: zone_index,
                    target: d.id,
                    damage: p.damage,
                    owner_id: p.owner_id,
                    pos: p.pos,
                });
                return false;
            }
        }

        p.lifetime_remaining > 0.0
    });
    hits
}
