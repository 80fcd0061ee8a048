//! Trapezoidal zones: clearance tracking and level-gated walls

use glam::Vec3;

use super::collision::{CollisionResult, puck_segment_collision, wall_blocks};
use super::destructible::{Attacker, DamageOutcome, Destructible};
use crate::{planar, point_in_trapezoid};

/// Lifecycle of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneStatus {
    Inactive,
    Active,
    /// Terminal
    Cleared,
}

/// Which boundary of the trapezoid was touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Front,
    Back,
    Left,
    Right,
}

/// Result of routing damage to an obstacle inside a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDamage {
    pub outcome: DamageOutcome,
    /// True only on the hit that cleared the zone
    pub cleared: bool,
}

/// One trapezoidal sub-arena
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    /// Ordinal, the ordering key across the stage
    pub level: u32,
    pub front_width: f32,
    pub back_width: f32,
    pub depth: f32,
    /// World-space centre of the trapezoid
    pub center: Vec3,
    /// Minimum owner level for the puck to pass the back wall
    pub wall_required_level: u32,
    /// Experience/score multiplier hook
    pub score_multiplier: f32,
    /// Attack power multiplier hook
    pub damage_multiplier: f32,
    pub visible: bool,
    destructibles: Vec<Destructible>,
    total: u32,
    remaining: u32,
    status: ZoneStatus,
}

impl ZoneRecord {
    pub fn new(level: u32, front_width: f32, back_width: f32, depth: f32, center: Vec3) -> Self {
        Self {
            level,
            front_width: front_width.max(0.0),
            back_width: back_width.max(0.0),
            depth: depth.max(0.0),
            center: planar(center),
            wall_required_level: 0,
            score_multiplier: 1.0,
            damage_multiplier: 1.0,
            visible: false,
            destructibles: Vec::new(),
            total: 0,
            remaining: 0,
            status: ZoneStatus::Inactive,
        }
    }

    pub fn with_wall_required_level(mut self, level: u32) -> Self {
        self.wall_required_level = level;
        self
    }

    /// Add an obstacle at generation time
    pub fn add_destructible(&mut self, destructible: Destructible) {
        if destructible.counts_for_clear() && destructible.is_alive() {
            self.total += 1;
            self.remaining += 1;
        }
        self.destructibles.push(destructible);
    }

    pub fn status(&self) -> ZoneStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ZoneStatus::Active
    }

    pub fn is_cleared(&self) -> bool {
        self.status == ZoneStatus::Cleared
    }

    pub fn total_count(&self) -> u32 {
        self.total
    }

    pub fn remaining_count(&self) -> u32 {
        self.remaining
    }

    pub fn destructibles(&self) -> &[Destructible] {
        &self.destructibles
    }

    pub fn destructible(&self, id: u32) -> Option<&Destructible> {
        self.destructibles.iter().find(|d| d.id == id)
    }

    /// Obstacles that can still be hit
    pub fn live_destructibles(&self) -> impl Iterator<Item = &Destructible> {
        self.destructibles.iter().filter(|d| d.is_alive())
    }

    /// Inactive -> Active. Makes the zone visible and restores every
    /// surviving obstacle to full health. Returns false if nothing changed.
    pub fn activate(&mut self) -> bool {
        if self.status != ZoneStatus::Inactive {
            return false;
        }
        self.status = ZoneStatus::Active;
        self.visible = true;
        for d in &mut self.destructibles {
            d.restore();
        }
        true
    }

    /// Hide the zone; an active zone goes back to inactive
    pub fn deactivate(&mut self) {
        self.visible = false;
        if self.status == ZoneStatus::Active {
            self.status = ZoneStatus::Inactive;
        }
    }

    /// Count one destroyed native obstacle. Returns true exactly once, on
    /// the transition of the remaining count from 1 to 0.
    pub fn handle_destructible_destroyed(&mut self) -> bool {
        if self.status != ZoneStatus::Active || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 && self.total > 0 {
            self.status = ZoneStatus::Cleared;
            log::info!("Zone level {} cleared", self.level);
            return true;
        }
        false
    }

    /// Damage an obstacle in this zone and update clearance
    pub fn apply_damage(&mut self, id: u32, amount: f32, attacker: Attacker) -> ZoneDamage {
        let Some(target) = self.destructibles.iter_mut().find(|d| d.id == id) else {
            return ZoneDamage {
                outcome: DamageOutcome::Ignored,
                cleared: false,
            };
        };
        let counts = target.counts_for_clear();
        let outcome = target.take_damage(amount, attacker);
        let cleared = matches!(outcome, DamageOutcome::Destroyed { .. })
            && counts
            && self.handle_destructible_destroyed();
        ZoneDamage { outcome, cleared }
    }

    pub fn to_local(&self, point: Vec3) -> Vec3 {
        planar(point - self.center)
    }

    /// Point-in-trapezoid containment in world space
    pub fn contains_point(&self, point: Vec3) -> bool {
        point_in_trapezoid(self.to_local(point), self.front_width, self.back_width, self.depth)
    }

    /// True when the point lies between the front and back edges
    pub fn spans_depth(&self, point: Vec3) -> bool {
        self.to_local(point).z.abs() <= self.depth / 2.0
    }

    /// Where a reset puck is placed
    pub fn spawn_point(&self) -> Vec3 {
        self.center + Vec3::new(0.0, 0.0, -self.depth / 4.0)
    }

    fn corners(&self) -> [Vec3; 4] {
        let (fw, bw, hd) = (self.front_width / 2.0, self.back_width / 2.0, self.depth / 2.0);
        [
            self.center + Vec3::new(-fw, 0.0, -hd), // front left
            self.center + Vec3::new(fw, 0.0, -hd),  // front right
            self.center + Vec3::new(-bw, 0.0, hd),  // back left
            self.center + Vec3::new(bw, 0.0, hd),   // back right
        ]
    }

    /// Wall segments with their inward normals
    pub fn walls(&self) -> [(WallSide, Vec3, Vec3, Vec3); 4] {
        let [fl, fr, bl, br] = self.corners();
        let side_normal = |a: Vec3, b: Vec3| {
            let edge = b - a;
            let n = Vec3::new(edge.z, 0.0, -edge.x).normalize_or_zero();
            if n.dot(self.center - a) < 0.0 { -n } else { n }
        };
        [
            (WallSide::Front, fl, fr, Vec3::Z),
            (WallSide::Back, bl, br, Vec3::NEG_Z),
            (WallSide::Left, fl, bl, side_normal(fl, bl)),
            (WallSide::Right, fr, br, side_normal(fr, br)),
        ]
    }

    /// Check one wall. The back wall only blocks while the owner is below
    /// the required level; it is evaluated on every contact. `front_solid`
    /// comes from the gate of the zone in front.
    pub fn wall_contact(
        &self,
        side: WallSide,
        puck_pos: Vec3,
        puck_radius: f32,
        owner_level: u32,
        front_solid: bool,
    ) -> CollisionResult {
        let blocking = match side {
            WallSide::Left | WallSide::Right => true,
            WallSide::Front => front_solid,
            WallSide::Back => wall_blocks(self.wall_required_level, owner_level),
        };
        if !blocking {
            return CollisionResult::miss();
        }
        let Some((_, a, b, inward)) = self.walls().into_iter().find(|(s, ..)| *s == side) else {
            return CollisionResult::miss();
        };
        puck_segment_collision(puck_pos, puck_radius, a, b, inward)
    }
}
