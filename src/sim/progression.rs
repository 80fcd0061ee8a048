//! Zone progression across a stage
//!
//! Owns the ordered zone list and the single current-zone pointer, which
//! only ever moves forward.

use glam::Vec3;

use super::collision::wall_blocks;
use super::destructible::{Attacker, DamageOutcome};
use super::events::{EventBus, GameEvent};
use super::zone::{ZoneDamage, ZoneRecord};

/// Progression controller
#[derive(Debug, Clone)]
pub struct Progression {
    /// Sorted by ascending zone level
    zones: Vec<ZoneRecord>,
    current: usize,
    started: bool,
    all_cleared: bool,
}

impl Progression {
    pub fn new(mut zones: Vec<ZoneRecord>) -> Self {
        zones.sort_by_key(|z| z.level);
        Self {
            zones,
            current: 0,
            started: false,
            all_cleared: false,
        }
    }

    pub fn zones(&self) -> &[ZoneRecord] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&ZoneRecord> {
        self.zones.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_zone(&self) -> Option<&ZoneRecord> {
        self.zones.get(self.current)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_all_cleared(&self) -> bool {
        self.all_cleared
    }

    /// Activate the first zone. Only the first call does anything.
    pub fn activate_first_zone(&mut self, events: &mut EventBus) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        if self.zones.is_empty() {
            log::warn!("Stage has no zones, nothing to activate");
            self.all_cleared = true;
            events.push(GameEvent::AllZonesCleared);
            return false;
        }
        self.current = 0;
        self.activate_current(events);
        true
    }

    /// Activate the current zone, stepping over zones with nothing to
    /// clear since those could never finish
    fn activate_current(&mut self, events: &mut EventBus) {
        while self.zones[self.current].total_count() == 0 {
            log::warn!("Zone {} has no destructibles, skipping it", self.current);
            if self.current + 1 < self.zones.len() {
                self.current += 1;
            } else {
                self.all_cleared = true;
                events.push(GameEvent::AllZonesCleared);
                return;
            }
        }
        let index = self.current;
        let zone = &mut self.zones[index];
        if zone.activate() {
            log::info!(
                "Zone {} (level {}) active with {} destructibles",
                index,
                zone.level,
                zone.total_count()
            );
            events.push(GameEvent::ZoneActivated {
                index,
                level: zone.level,
            });
            events.push(GameEvent::ZoneChanged { index });
        }
    }

    /// Advance past a cleared zone. Stale events from any zone other than the
    /// current one, or after the stage is done, are ignored.
    pub fn handle_zone_cleared(&mut self, index: usize, events: &mut EventBus) -> bool {
        if self.all_cleared || !self.started || index != self.current {
            return false;
        }
        self.zones[self.current].deactivate();
        if self.current + 1 < self.zones.len() {
            self.current += 1;
            self.activate_current(events);
        } else {
            log::info!("All {} zones cleared", self.zones.len());
            self.all_cleared = true;
            events.push(GameEvent::AllZonesCleared);
        }
        true
    }

    /// Route damage to an obstacle in one zone
    pub fn apply_damage(&mut self, zone_index: usize, id: u32, amount: f32, attacker: Attacker) -> ZoneDamage {
        match self.zones.get_mut(zone_index) {
            Some(zone) => zone.apply_damage(id, amount, attacker),
            None => ZoneDamage {
                outcome: DamageOutcome::Ignored,
                cleared: false,
            },
        }
    }

    /// Announce a zone cleared by [`Progression::apply_damage`] and advance
    pub fn complete_zone(&mut self, index: usize, events: &mut EventBus) -> bool {
        events.push(GameEvent::ZoneCleared { index });
        self.handle_zone_cleared(index, events)
    }

    /// Indices of zones currently on the field
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.is_active())
            .map(|(i, _)| i)
    }

    /// The front edge of a zone is the back wall of the zone before it and
    /// is gated the same way from this side. The first zone's front is solid.
    pub fn front_wall_blocks(&self, index: usize, owner_level: u32) -> bool {
        match index.checked_sub(1).and_then(|i| self.zones.get(i)) {
            Some(previous) => wall_blocks(previous.wall_required_level, owner_level),
            None => true,
        }
    }

    /// True if a closed gate lies anywhere between the two zones
    pub fn gate_closed_between(&self, a: usize, b: usize, owner_level: u32) -> bool {
        self.zones
            .get(a.min(b)..a.max(b))
            .is_some_and(|between| between.iter().any(|z| wall_blocks(z.wall_required_level, owner_level)))
    }

    /// Zone whose depth band contains the point
    pub fn zone_index_at(&self, point: Vec3) -> Option<usize> {
        self.zones.iter().position(|z| z.spans_depth(point))
    }

    /// Stage-wide wall lookup: the zone the puck is in, or the nearest one
    pub fn zone_index_near(&self, point: Vec3) -> Option<usize> {
        self.zone_index_at(point).or_else(|| {
            self.zones
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let da = (a.center.z - point.z).abs();
                    let db = (b.center.z - point.z).abs();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
        })
    }
}
