//! Puck Zones - a zone-clearing puck arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (puck physics, destructibles, zones, growth, skills)
//! - `config`: Data-driven game balance (stat tables, skill catalog, stage layout)
//!
//! The playfield is a 2.5D plane: positions live in X/Z and Y is always zero.

pub mod config;
pub mod sim;

pub use config::{ConfigError, ConfigResult, GameConfig};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz physics tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Puck defaults
    pub const PUCK_RADIUS: f32 = 0.5;
    /// Per-tick velocity multiplier from air drag (near-frictionless ice)
    pub const AIR_RESISTANCE: f32 = 0.998;
    /// Below this speed the puck snaps to rest
    pub const MIN_VELOCITY: f32 = 0.05;

    /// Fraction of speed kept after a bounce (10% energy loss)
    pub const RESTITUTION: f32 = 0.9;
    /// Normals shorter than this are treated as degenerate
    pub const NORMAL_EPSILON: f32 = 1e-4;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 0.75;

    /// Missile defaults
    pub const MISSILE_INTERVAL: f32 = 2.0;
    pub const MISSILE_SPEED: f32 = 18.0;
    pub const MISSILE_LIFETIME: f32 = 3.0;
    pub const MISSILE_RADIUS: f32 = 0.25;

    /// Health fraction below which a destructible reads as damaged
    pub const DAMAGED_THRESHOLD: f32 = 0.5;
}

/// Project a vector onto the play plane (Y forced to zero)
#[inline]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Planar unit vector at the given heading (radians, 0 = +Z)
#[inline]
pub fn heading_to_planar(angle: f32) -> Vec3 {
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Point-in-trapezoid test in zone-local coordinates.
///
/// The trapezoid is centred on the origin with its front edge at
/// `z = -depth/2` and its back edge at `z = +depth/2`. The half-width at
/// a given depth is interpolated between the front and back widths.
pub fn point_in_trapezoid(local: Vec3, front_width: f32, back_width: f32, depth: f32) -> bool {
    if depth <= 0.0 || local.z.abs() > depth / 2.0 {
        return false;
    }
    let t = ((local.z + depth / 2.0) / depth).clamp(0.0, 1.0);
    local.x.abs() <= lerp(front_width, back_width, t) / 2.0
}
