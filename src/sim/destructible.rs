//! Breakable obstacles and their health state machine
//!
//! A destructible is either alive (accepts damage) or destroyed (terminal,
//! rejects everything). "Damaged" is only a display threshold.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::DAMAGED_THRESHOLD;

/// Size class of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

/// Behaviour parameters looked up per size class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeProfile {
    /// Multiplier applied to incoming damage
    pub damage_multiplier: f32,
    /// Debris pieces requested from the effects layer on destruction
    pub debris_count: u32,
    pub radius_scale: f32,
}

impl SizeClass {
    pub fn profile(&self) -> SizeProfile {
        match self {
            SizeClass::Small => SizeProfile {
                damage_multiplier: 1.5,
                debris_count: 4,
                radius_scale: 0.6,
            },
            SizeClass::Medium => SizeProfile {
                damage_multiplier: 1.0,
                debris_count: 8,
                radius_scale: 1.0,
            },
            SizeClass::Large => SizeProfile {
                damage_multiplier: 0.6,
                debris_count: 14,
                radius_scale: 1.6,
            },
        }
    }
}

/// Where the obstacle came from at stage generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Placed inside the zone; must be destroyed to clear it
    Native,
    /// Concentric ring object assigned to the zone by containment
    Ring,
}

/// Who is dealing damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attacker {
    pub id: u32,
    pub level: u32,
}

/// Result of [`Destructible::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Already destroyed, or a non-positive amount
    Ignored,
    /// Attacker level below the required level
    Rejected,
    /// Health went down; carries the reported health percentage
    Damaged { percentage: f32 },
    /// This hit destroyed the obstacle. Fires once per lifetime.
    Destroyed { points: u32, attacker: Attacker },
}

/// A breakable obstacle
#[derive(Debug, Clone)]
pub struct Destructible {
    pub id: u32,
    pub pos: Vec3,
    pub radius: f32,
    pub size: SizeClass,
    pub origin: Origin,
    max_health: f32,
    /// May dip below zero internally; reported clamped
    health: f32,
    pub point_value: u32,
    /// Minimum attacker level to accept damage (0 = ungated)
    pub required_level: u32,
    destroyed: bool,
}

impl Destructible {
    pub fn new(id: u32, pos: Vec3, radius: f32, max_health: f32, point_value: u32) -> Self {
        let max_health = max_health.max(f32::EPSILON);
        Self {
            id,
            pos: crate::planar(pos),
            radius,
            size: SizeClass::default(),
            origin: Origin::Native,
            max_health,
            health: max_health,
            point_value,
            required_level: 0,
            destroyed: false,
        }
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_alive(&self) -> bool {
        !self.destroyed
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Health clamped to zero
    pub fn health(&self) -> f32 {
        self.health.max(0.0)
    }

    pub fn health_percentage(&self) -> f32 {
        self.health() / self.max_health
    }

    /// Display-only threshold
    pub fn is_damaged(&self) -> bool {
        self.health_percentage() < DAMAGED_THRESHOLD
    }

    /// Returns true if this obstacle must be destroyed to clear its zone
    pub fn counts_for_clear(&self) -> bool {
        self.origin == Origin::Native
    }

    pub fn can_be_damaged_by(&self, attacker: &Attacker) -> bool {
        !self.destroyed && attacker.level >= self.required_level
    }

    /// Apply damage. The size class multiplier scales `amount`.
    pub fn take_damage(&mut self, amount: f32, attacker: Attacker) -> DamageOutcome {
        if self.destroyed || amount <= 0.0 || !amount.is_finite() {
            return DamageOutcome::Ignored;
        }
        if attacker.level < self.required_level {
            return DamageOutcome::Rejected;
        }

        self.health -= amount * self.size.profile().damage_multiplier;
        if self.health <= 0.0 {
            self.destroyed = true;
            return DamageOutcome::Destroyed {
                points: self.point_value,
                attacker,
            };
        }
        DamageOutcome::Damaged {
            percentage: self.health_percentage(),
        }
    }

    /// Restore full health. Destroyed obstacles stay destroyed.
    pub fn restore(&mut self) {
        if !self.destroyed {
            self.health = self.max_health;
        }
    }
}
