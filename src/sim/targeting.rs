//! Target acquisition for homing projectiles

use glam::Vec3;

use super::zone::ZoneRecord;
use crate::planar;

/// A destructible picked as a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRef {
    pub zone: usize,
    pub id: u32,
    pub pos: Vec3,
}

/// Pluggable nearest-target search
pub trait TargetingStrategy: std::fmt::Debug {
    /// Nearest eligible live destructible, or `None`
    fn find_target(&self, from: Vec3, zones: &[ZoneRecord]) -> Option<TargetRef>;

    /// Called when the current zone changes
    fn on_zone_changed(&mut self, _index: usize) {}
}

/// Linear scan keeping the first candidate at the minimum distance
fn nearest_in<'a>(from: Vec3, candidates: impl Iterator<Item = (usize, &'a ZoneRecord)>) -> Option<TargetRef> {
    let from = planar(from);
    let mut best: Option<(f32, TargetRef)> = None;
    for (zone_index, zone) in candidates {
        for d in zone.live_destructibles() {
            let dist_sq = planar(d.pos - from).length_squared();
            if best.as_ref().is_none_or(|(best_sq, _)| dist_sq < *best_sq) {
                best = Some((
                    dist_sq,
                    TargetRef {
                        zone: zone_index,
                        id: d.id,
                        pos: d.pos,
                    },
                ));
            }
        }
    }
    best.map(|(_, target)| target)
}

/// Nearest live destructible on the field (every visible zone)
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestTarget;

impl TargetingStrategy for NearestTarget {
    fn find_target(&self, from: Vec3, zones: &[ZoneRecord]) -> Option<TargetRef> {
        nearest_in(from, zones.iter().enumerate().filter(|(_, z)| z.visible))
    }
}

/// Nearest live destructible within one zone, native and ring objects alike
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneTarget {
    pub zone: usize,
}

impl ZoneTarget {
    pub fn new(zone: usize) -> Self {
        Self { zone }
    }
}

impl TargetingStrategy for ZoneTarget {
    fn find_target(&self, from: Vec3, zones: &[ZoneRecord]) -> Option<TargetRef> {
        nearest_in(from, zones.iter().enumerate().filter(|(i, _)| *i == self.zone))
    }

    fn on_zone_changed(&mut self, index: usize) {
        self.zone = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::destructible::{Attacker, Destructible, Origin};

    fn zones() -> Vec<ZoneRecord> {
        let mut a = ZoneRecord::new(1, 10.0, 10.0, 10.0, Vec3::ZERO);
        a.add_destructible(Destructible::new(1, Vec3::new(3.0, 0.0, 0.0), 0.5, 10.0, 1));
        a.add_destructible(Destructible::new(2, Vec3::new(-2.0, 0.0, 0.0), 0.5, 10.0, 1));
        let mut b = ZoneRecord::new(2, 10.0, 10.0, 10.0, Vec3::new(0.0, 0.0, 10.0));
        b.add_destructible(Destructible::new(3, Vec3::new(0.0, 0.0, 6.0), 0.5, 10.0, 1));
        b.add_destructible(
            Destructible::new(4, Vec3::new(0.0, 0.0, 12.0), 0.5, 10.0, 1).with_origin(Origin::Ring),
        );
        a.activate();
        b.activate();
        vec![a, b]
    }

    #[test]
    fn test_nearest_over_all_zones() {
        let z = zones();
        let target = NearestTarget.find_target(Vec3::new(0.0, 0.0, 4.0), &z).unwrap();
        assert_eq!(target.id, 3);
        assert_eq!(target.zone, 1);
    }

    #[test]
    fn test_zone_restricted() {
        let z = zones();
        let target = ZoneTarget::new(0).find_target(Vec3::new(0.0, 0.0, 4.0), &z).unwrap();
        assert_eq!(target.id, 2);

        let mut strategy = ZoneTarget::new(0);
        strategy.on_zone_changed(1);
        let target = strategy.find_target(Vec3::new(0.0, 0.0, 11.0), &z).unwrap();
        assert_eq!(target.id, 4); // Ring objects are targetable
    }

    #[test]
    fn test_skips_destroyed_and_hidden() {
        let mut z = zones();
        let attacker = Attacker { id: 1, level: 1 };
        z[1].apply_damage(3, 100.0, attacker);
        z[1].apply_damage(4, 100.0, attacker);
        let target = NearestTarget.find_target(Vec3::new(0.0, 0.0, 9.0), &z).unwrap();
        assert_eq!(target.zone, 0);

        z[0].deactivate();
        assert!(NearestTarget.find_target(Vec3::ZERO, &z).is_none());
    }

    #[test]
    fn test_tie_keeps_first() {
        let mut zone = ZoneRecord::new(1, 10.0, 10.0, 10.0, Vec3::ZERO);
        zone.add_destructible(Destructible::new(7, Vec3::new(1.0, 0.0, 0.0), 0.5, 10.0, 1));
        zone.add_destructible(Destructible::new(8, Vec3::new(-1.0, 0.0, 0.0), 0.5, 10.0, 1));
        zone.activate();
        let target = NearestTarget.find_target(Vec3::ZERO, &[zone]).unwrap();
        assert_eq!(target.id, 7);
    }

    #[test]
    fn test_empty_field() {
        assert!(NearestTarget.find_target(Vec3::ZERO, &[]).is_none());
        assert!(ZoneTarget::new(3).find_target(Vec3::ZERO, &[]).is_none());
    }
}
