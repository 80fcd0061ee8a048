//! Contact detection and response for the puck
//!
//! Everything here is stateless given its inputs: the tick decides which
//! contacts to test, these functions decide what each contact does.

use glam::Vec3;
use rand::Rng;

use super::skills::PenetrationTracker;
use super::tables::PlayerStats;
use crate::consts::NORMAL_EPSILON;
use crate::planar;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the surface (if hit)
    pub point: Vec3,
    /// Planar surface normal pointing toward the puck
    pub normal: Vec3,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// What a puck does when it touches a destructible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    /// Passes through, a penetration charge was spent
    Penetrate,
    /// Bounces off
    Reflect,
}

/// Check overlap between the puck and a circular body on the plane
pub fn puck_circle_collision(
    puck_pos: Vec3,
    puck_radius: f32,
    center: Vec3,
    radius: f32,
) -> CollisionResult {
    let offset = planar(puck_pos - center);
    let dist = offset.length();
    let reach = puck_radius + radius;
    if dist >= reach {
        return CollisionResult::miss();
    }
    // Normal is left at zero when centres coincide; bounce() substitutes one
    let normal = if dist > NORMAL_EPSILON {
        offset / dist
    } else {
        Vec3::ZERO
    };
    CollisionResult {
        hit: true,
        point: planar(center) + normal * radius,
        normal,
        penetration: reach - dist,
    }
}

/// Check the puck against a wall segment from `a` to `b`.
///
/// `inward` is the side of the wall the puck is meant to stay on.
pub fn puck_segment_collision(
    puck_pos: Vec3,
    puck_radius: f32,
    a: Vec3,
    b: Vec3,
    inward: Vec3,
) -> CollisionResult {
    let (a, b, p) = (planar(a), planar(b), planar(puck_pos));
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < NORMAL_EPSILON {
        return CollisionResult::miss(); // Degenerate segment
    }
    let inward = planar(inward).normalize_or_zero();
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = a + seg * t;
    // Signed distance on the inward side; negative means the puck crossed
    let signed = (p - closest).dot(inward);
    if signed >= puck_radius {
        return CollisionResult::miss();
    }
    // Only the span of the segment blocks, not its infinite extension
    let along = (p - a).dot(seg) / len_sq;
    if !(0.0..=1.0).contains(&along) {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        point: closest,
        normal: inward,
        penetration: puck_radius - signed,
    }
}

/// Standard reflection on the plane: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    let (v, n) = (planar(velocity), planar(normal));
    v - 2.0 * v.dot(n) * n
}

/// Random unit vector on the play plane
pub fn random_planar_unit<R: Rng>(rng: &mut R) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    crate::heading_to_planar(angle)
}

/// Reflect and attenuate. A degenerate normal is replaced with a random
/// planar direction so the puck can never stick.
pub fn bounce<R: Rng>(velocity: Vec3, normal: Vec3, restitution: f32, rng: &mut R) -> Vec3 {
    let normal = planar(normal);
    let normal = if normal.length() < NORMAL_EPSILON {
        random_planar_unit(rng)
    } else {
        normal.normalize()
    };
    reflect_velocity(velocity, normal) * restitution.clamp(0.0, 1.0)
}

/// Impulse the player delivers to the puck on contact.
///
/// Magnitude is player speed times the stage collision force and mass;
/// direction points from the player to the puck.
pub fn player_hit_impulse<R: Rng>(
    player_vel: Vec3,
    player_stats: &PlayerStats,
    puck_pos: Vec3,
    player_pos: Vec3,
    rng: &mut R,
) -> Vec3 {
    let magnitude = planar(player_vel).length() * player_stats.collision_force * player_stats.mass;
    let offset = planar(puck_pos - player_pos);
    let dir = if offset.length() > NORMAL_EPSILON {
        offset.normalize()
    } else if planar(player_vel).length() > NORMAL_EPSILON {
        planar(player_vel).normalize()
    } else {
        random_planar_unit(rng)
    };
    dir * magnitude
}

/// Decide between passing through and bouncing off a destructible
pub fn resolve_obstacle_contact(tracker: &mut PenetrationTracker, obstacle_id: u32) -> ContactResponse {
    if tracker.try_penetrate(obstacle_id) {
        ContactResponse::Penetrate
    } else {
        ContactResponse::Reflect
    }
}

/// A level-gated wall blocks the puck while its owner is under-levelled
#[inline]
pub fn wall_blocks(required_level: u32, owner_level: u32) -> bool {
    owner_level < required_level
}
