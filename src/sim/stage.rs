//! Stage generation
//!
//! Lays zones out back to back along +Z: each zone's front edge matches the
//! previous zone's back edge. Obstacles are placed from the seeded RNG so a
//! seed always yields the same stage.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::destructible::{Destructible, Origin, SizeClass};
use super::zone::ZoneRecord;
use crate::config::StageConfig;
use crate::{heading_to_planar, lerp};

/// Placement attempts per obstacle before giving up on it
const PLACEMENT_ATTEMPTS: u32 = 16;
/// Keep obstacles this far inside the zone walls
const EDGE_MARGIN: f32 = 1.0;
/// Clear area around the spawn point
const SPAWN_CLEARANCE: f32 = 3.0;

/// Zones of a generated stage plus the first id not handed out
#[derive(Debug, Clone)]
pub struct StageLayout {
    pub zones: Vec<ZoneRecord>,
    pub next_id: u32,
}

/// Generate every zone of a stage, ids starting at `first_id`
pub fn generate_stage(config: &StageConfig, rng: &mut Pcg32, first_id: u32) -> StageLayout {
    let mut next_id = first_id;
    let mut alloc = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let depth = config.zone_depth.max(1.0);
    let count = config.zone_count;
    let mut zones = Vec::with_capacity(count as usize);

    for i in 0..count {
        let level = i + 1;
        let front_width = config.first_width + i as f32 * config.width_growth;
        let back_width = front_width + config.width_growth;
        let center = Vec3::new(0.0, 0.0, i as f32 * depth + depth / 2.0);
        // Passing into the next zone needs that zone's level; the far end is sealed
        let wall_level = if level < count { level + 1 } else { u32::MAX };

        let mut zone = ZoneRecord::new(level, front_width, back_width, depth, center)
            .with_wall_required_level(wall_level);
        zone.score_multiplier = config.score_multiplier(i as usize);
        zone.damage_multiplier = config.damage_multiplier(i as usize);

        let health = config.base_health + config.health_per_level * i as f32;
        let points = config.base_points + config.points_per_level * i;
        for _ in 0..config.destructibles_per_zone.max(1) {
            let pos = match place_in_zone(&zone, rng) {
                Some(pos) => pos,
                // Every zone needs at least one obstacle to clear
                None if zone.total_count() == 0 => fallback_point(&zone),
                None => {
                    log::debug!("No room for another obstacle in zone {}", level);
                    continue;
                }
            };
            let size = random_size(rng);
            let radius = config.destructible_radius * size.profile().radius_scale;
            let mut obstacle = Destructible::new(alloc(), pos, radius, health, points).with_size(size);
            if rng.random::<f32>() < config.tiered_chance {
                obstacle = obstacle.with_required_level(level);
            }
            zone.add_destructible(obstacle);
        }

        log::debug!(
            "Zone {} widths {:.1}/{:.1}, {} obstacles",
            level,
            front_width,
            back_width,
            zone.total_count()
        );
        zones.push(zone);
    }

    place_rings(config, &mut zones, depth * count as f32, &mut alloc);

    StageLayout { zones, next_id }
}

fn random_size(rng: &mut Pcg32) -> SizeClass {
    match rng.random_range(0..3) {
        0 => SizeClass::Small,
        1 => SizeClass::Medium,
        _ => SizeClass::Large,
    }
}

/// Random point inside the trapezoid, away from walls and the spawn point
fn place_in_zone(zone: &ZoneRecord, rng: &mut Pcg32) -> Option<Vec3> {
    let half_depth = zone.depth / 2.0 - EDGE_MARGIN;
    if half_depth <= 0.0 {
        return None;
    }
    let spawn = zone.spawn_point();
    for _ in 0..PLACEMENT_ATTEMPTS {
        let z = rng.random_range(-half_depth..=half_depth);
        let t = (z + zone.depth / 2.0) / zone.depth;
        let half_width = lerp(zone.front_width, zone.back_width, t) / 2.0 - EDGE_MARGIN;
        if half_width <= 0.0 {
            continue;
        }
        let x = rng.random_range(-half_width..=half_width);
        let pos = zone.center + Vec3::new(x, 0.0, z);
        if (pos - spawn).length() >= SPAWN_CLEARANCE {
            return Some(pos);
        }
    }
    None
}

/// Middle of the zone's far half, opposite the spawn point
fn fallback_point(zone: &ZoneRecord) -> Vec3 {
    zone.center + Vec3::new(0.0, 0.0, zone.depth / 4.0)
}

/// Concentric rings around the middle of the stage. Each object joins the
/// zone whose trapezoid contains it; objects outside every zone are dropped.
fn place_rings(config: &StageConfig, zones: &mut [ZoneRecord], length: f32, alloc: &mut impl FnMut() -> u32) {
    let origin = Vec3::new(0.0, 0.0, length / 2.0);
    let per_ring = config.ring_objects;
    if per_ring == 0 {
        return;
    }
    let mut placed = 0;
    for ring in 1..=config.ring_count {
        let radius = config.ring_spacing * ring as f32;
        for k in 0..per_ring {
            let angle = std::f32::consts::TAU * k as f32 / per_ring as f32;
            let pos = origin + heading_to_planar(angle) * radius;
            let Some(zone) = zones.iter_mut().find(|z| z.contains_point(pos)) else {
                continue;
            };
            if (pos - zone.spawn_point()).length() < SPAWN_CLEARANCE {
                continue;
            }
            zone.add_destructible(
                Destructible::new(
                    alloc(),
                    pos,
                    config.destructible_radius * SizeClass::Small.profile().radius_scale,
                    config.ring_health,
                    config.ring_points,
                )
                .with_size(SizeClass::Small)
                .with_origin(Origin::Ring),
            );
            placed += 1;
        }
    }
    log::debug!("Placed {} ring objects", placed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(seed: u64) -> StageLayout {
        let mut rng = Pcg32::seed_from_u64(seed);
        generate_stage(&StageConfig::default(), &mut rng, 1)
    }

    #[test]
    fn test_zones_are_contiguous() {
        let layout = generate(7);
        assert_eq!(layout.zones.len(), 4);
        for pair in layout.zones.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(b.level, a.level + 1);
            assert!((a.back_width - b.front_width).abs() < 1e-5);
            assert!(((a.center.z + a.depth / 2.0) - (b.center.z - b.depth / 2.0)).abs() < 1e-4);
            assert_eq!(a.wall_required_level, b.level);
        }
        assert_eq!(layout.zones[3].wall_required_level, u32::MAX);
    }

    #[test]
    fn test_obstacles_inside_their_zone() {
        let layout = generate(11);
        for zone in &layout.zones {
            assert!(zone.total_count() > 0);
            for d in zone.destructibles() {
                assert!(zone.contains_point(d.pos), "obstacle {} outside zone {}", d.id, zone.level);
                assert!(d.required_level <= zone.level);
            }
        }
    }

    #[test]
    fn test_ring_objects_never_count_for_clear() {
        let layout = generate(3);
        let rings: usize = layout
            .zones
            .iter()
            .map(|z| z.destructibles().iter().filter(|d| d.origin == Origin::Ring).count())
            .sum();
        assert!(rings > 0);
        for zone in &layout.zones {
            let native = zone.destructibles().iter().filter(|d| d.origin == Origin::Native).count();
            assert_eq!(zone.total_count() as usize, native);
        }
    }

    #[test]
    fn test_ids_unique_and_next_id_past_them() {
        let layout = generate(5);
        let mut ids: Vec<u32> = layout
            .zones
            .iter()
            .flat_map(|z| z.destructibles().iter().map(|d| d.id))
            .collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|&id| id >= 1 && id < layout.next_id));
    }

    #[test]
    fn test_same_seed_same_stage() {
        let a = generate(42);
        let b = generate(42);
        let positions = |l: &StageLayout| -> Vec<Vec3> {
            l.zones.iter().flat_map(|z| z.destructibles().iter().map(|d| d.pos)).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_every_zone_gets_an_obstacle() {
        // Too shallow for regular placement, and nothing requested
        let config = StageConfig {
            zone_depth: 1.0,
            destructibles_per_zone: 0,
            ring_count: 0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let layout = generate_stage(&config, &mut rng, 1);
        for zone in &layout.zones {
            assert_eq!(zone.total_count(), 1);
            assert!(zone.destructibles().iter().all(|d| zone.spans_depth(d.pos)));
        }
    }

    #[test]
    fn test_multiplier_hooks_applied() {
        let config = StageConfig {
            score_multipliers: vec![1.0, 2.0],
            damage_multipliers: vec![1.5],
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let layout = generate_stage(&config, &mut rng, 1);
        assert_eq!(layout.zones[1].score_multiplier, 2.0);
        assert_eq!(layout.zones[0].damage_multiplier, 1.5);
        assert_eq!(layout.zones[2].score_multiplier, 1.0);
    }
}
