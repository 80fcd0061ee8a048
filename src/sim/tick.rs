//! Fixed timestep simulation tick
//!
//! One call advances the game deterministically in a fixed order:
//! input forces, integration, missiles, collision detection, damage
//! application, then event delivery.

use glam::Vec3;

use super::collision::{
    ContactResponse, CollisionResult, bounce, player_hit_impulse, puck_circle_collision, resolve_obstacle_contact,
};
use super::events::{EffectKind, GameEvent};
use super::missile::update_projectiles;
use super::state::{GamePhase, GameState};
use super::zone::WallSide;
use crate::planar;

/// Launch command for the puck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub direction: Vec3,
    /// Force magnitude, clamped by the puck's max force
    pub strength: f32,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// World position the player moves toward
    pub move_to: Option<Vec3>,
    /// Direct force on the puck, attributed to the player
    pub launch: Option<Launch>,
    /// Put the puck back at the current zone's spawn point
    pub reset_puck: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Damage queued during collision detection, applied afterwards
#[derive(Debug, Clone, Copy)]
struct PendingDamage {
    zone: usize,
    id: u32,
    amount: f32,
    pos: Vec3,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::StageCleared => {}
        }
    }

    if state.phase != GamePhase::Playing {
        state.events.dispatch();
        return;
    }

    state.time_ticks += 1;

    // 1. Input and forces
    apply_input(state, input, dt);

    // 2. Integration
    let before = state.puck.pos;
    state.puck.integrate(dt);
    let fired = fire_missiles(state, dt);
    let hits = update_projectiles(
        &mut state.projectiles,
        dt,
        state.progression.zones(),
        state.missiles.homing,
    );

    // 3. Collision detection
    player_contact(state);
    wall_contacts(state, before);
    let mut pending = obstacle_contacts(state);
    // Contact responses may add speed; the cap holds after every tick
    state.puck.vel = planar(state.puck.vel).clamp_length_max(state.puck.max_speed());

    // 4. Damage application
    pending.extend(hits.iter().map(|hit| PendingDamage {
        zone: hit.zone,
        id: hit.target,
        amount: hit.damage,
        pos: hit.pos,
    }));
    log::trace!("Tick {}: {} fired, {} damage", state.time_ticks, fired, pending.len());
    for damage in pending {
        if state.phase != GamePhase::Playing {
            break;
        }
        state.apply_damage(damage.zone, damage.id, damage.amount, damage.pos);
    }

    // 5. Event notification
    state.events.dispatch();
}

fn apply_input(state: &mut GameState, input: &TickInput, dt: f32) {
    match input.move_to {
        Some(target) => {
            let max_speed = state.player_stats().max_speed;
            state.player.move_toward(target, dt, max_speed);
        }
        None => state.player.halt(),
    }

    if input.reset_puck {
        state.reset_puck();
    }

    if let Some(launch) = input.launch {
        let force = planar(launch.direction).normalize_or_zero() * launch.strength.max(0.0);
        let owner = state.player.id;
        state.puck.apply_force(force, Some(owner));
    }
}

/// Fire every missile that came due this tick. Returns how many fired.
fn fire_missiles(state: &mut GameState, dt: f32) -> usize {
    let next_id = &mut state.next_id;
    let fired = state.missiles.tick(
        dt,
        state.puck.pos,
        state.player.id,
        state.progression.zones(),
        || {
            let id = *next_id;
            *next_id += 1;
            id
        },
    );
    let count = fired.len();
    for projectile in fired {
        state.events.push(GameEvent::ProjectileFired {
            id: projectile.id,
            target: projectile.target,
        });
        state.projectiles.push(projectile);
    }
    count
}

/// Player striking the puck
fn player_contact(state: &mut GameState) {
    let contact = puck_circle_collision(
        state.puck.pos,
        state.puck.radius(),
        state.player.pos,
        state.player.radius,
    );
    if !contact.hit {
        return;
    }
    separate(state, &contact);

    let stats = *state.player_stats();
    let impulse = player_hit_impulse(
        state.player.vel,
        &stats,
        state.puck.pos,
        state.player.pos,
        &mut state.rng,
    );
    if impulse != Vec3::ZERO {
        let owner = state.player.id;
        state.puck.apply_force(impulse, Some(owner));
    } else if state.puck.vel.dot(contact.normal) < 0.0 {
        // A standing player acts like a post
        state.puck.vel = bounce(state.puck.vel, contact.normal, state.physics.restitution, &mut state.rng);
    }
    state.events.push(GameEvent::PlayEffect {
        kind: EffectKind::PlayerHit,
        pos: contact.point,
    });
}

/// Walls of the zone the puck is in. Gates are re-checked against the
/// player's level on every contact and block from either side.
fn wall_contacts(state: &mut GameState, before: Vec3) {
    let Some(mut zone_index) = state.progression.zone_index_near(state.puck.pos) else {
        return;
    };
    let level = state.growth.level();
    // A puck that skipped across a closed gate this tick is held by the
    // walls of the zone it left
    if let Some(previous) = state.progression.zone_index_near(before) {
        if previous != zone_index && state.progression.gate_closed_between(previous, zone_index, level) {
            zone_index = previous;
        }
    }
    let front_solid = state.progression.front_wall_blocks(zone_index, level);
    for side in [WallSide::Left, WallSide::Right, WallSide::Front, WallSide::Back] {
        let Some(zone) = state.progression.zone(zone_index) else {
            return;
        };
        let contact = zone.wall_contact(side, state.puck.pos, state.puck.radius(), level, front_solid);
        if !contact.hit {
            continue;
        }
        separate(state, &contact);
        if state.puck.vel.dot(contact.normal) < 0.0 {
            state.puck.vel = bounce(state.puck.vel, contact.normal, state.physics.restitution, &mut state.rng);
            state.events.push(GameEvent::PlayEffect {
                kind: EffectKind::WallBounce,
                pos: contact.point,
            });
        }
    }
}

/// Puck against every live obstacle in the active zones. Returns the
/// damage to apply once detection has finished.
fn obstacle_contacts(state: &mut GameState) -> Vec<PendingDamage> {
    let radius = state.puck.radius();
    let attacker = state.attacker();
    let mut contacts: Vec<(usize, u32, bool, CollisionResult)> = Vec::new();
    for zone_index in state.progression.active_indices() {
        let Some(zone) = state.progression.zone(zone_index) else {
            continue;
        };
        for d in zone.live_destructibles() {
            let contact = puck_circle_collision(state.puck.pos, radius, d.pos, d.radius);
            if contact.hit {
                contacts.push((zone_index, d.id, d.can_be_damaged_by(&attacker), contact));
            }
        }
    }

    // Leaving an obstacle ends the pass through it
    state
        .puck
        .inside
        .retain(|id| contacts.iter().any(|(_, cid, ..)| cid == id));

    let mut pending = Vec::new();
    let mut reflected = false;
    for (zone, id, damageable, contact) in contacts {
        if state.puck.inside.contains(&id) {
            continue;
        }
        // Only a puck someone has struck deals damage
        if state.puck.last_hit_by.is_some() {
            pending.push(PendingDamage {
                zone,
                id,
                amount: state.attack_power(zone),
                pos: contact.point,
            });
        }

        let response = if damageable {
            resolve_obstacle_contact(&mut state.penetration, id)
        } else {
            ContactResponse::Reflect
        };
        match response {
            ContactResponse::Penetrate => state.puck.inside.push(id),
            ContactResponse::Reflect => {
                separate(state, &contact);
                // One reflection per tick
                if !reflected && state.puck.vel.dot(contact.normal) <= 0.0 {
                    state.puck.vel =
                        bounce(state.puck.vel, contact.normal, state.physics.restitution, &mut state.rng);
                    reflected = true;
                }
            }
        }
    }
    pending
}

/// Push the puck out of an overlap along the contact normal
fn separate(state: &mut GameState, contact: &CollisionResult) {
    if contact.normal != Vec3::ZERO {
        state.puck.pos = planar(state.puck.pos + contact.normal * contact.penetration);
    }
}
