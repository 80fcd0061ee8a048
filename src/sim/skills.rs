//! Skill acquisition and composition
//!
//! The composed multipliers are always rebuilt from the full set of owned
//! skills. Nothing is patched incrementally, so removal and reset can never
//! leave a stale multiplier behind.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Catalog key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u32);

/// What a skill does to the puck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    SizeUp,
    DamageUp,
    Penetration,
    /// Periodic homing projectile; effect value is projectile damage
    Missile,
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: SkillId,
    pub kind: SkillKind,
    pub max_level: u32,
    /// Effect value per level, indexed by `level - 1`
    pub effect_values: Vec<f32>,
}

impl SkillDef {
    /// Effect value for a level, clamped into the table.
    /// `None` when no values are configured.
    pub fn effect_value(&self, level: u32) -> Option<f32> {
        if self.effect_values.is_empty() {
            return None;
        }
        let index = (level.saturating_sub(1) as usize).min(self.effect_values.len() - 1);
        Some(self.effect_values[index])
    }
}

/// Read-only skill catalog
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    defs: BTreeMap<SkillId, SkillDef>,
}

impl SkillCatalog {
    pub fn new(defs: impl IntoIterator<Item = SkillDef>) -> Self {
        let mut map = BTreeMap::new();
        for def in defs {
            if map.contains_key(&def.id) {
                log::warn!("Duplicate skill id {:?} in catalog, keeping the first", def.id);
                continue;
            }
            map.insert(def.id, def);
        }
        Self { defs: map }
    }

    pub fn get(&self, id: SkillId) -> Option<&SkillDef> {
        self.defs.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDef> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Default catalog: one skill of each kind
pub fn default_skill_defs() -> Vec<SkillDef> {
    vec![
        SkillDef {
            id: SkillId(1),
            kind: SkillKind::SizeUp,
            max_level: 3,
            effect_values: vec![1.2, 1.4, 1.7],
        },
        SkillDef {
            id: SkillId(2),
            kind: SkillKind::DamageUp,
            max_level: 3,
            effect_values: vec![1.25, 1.5, 2.0],
        },
        SkillDef {
            id: SkillId(3),
            kind: SkillKind::Penetration,
            max_level: 3,
            effect_values: vec![1.0, 2.0, 3.0],
        },
        SkillDef {
            id: SkillId(4),
            kind: SkillKind::Missile,
            max_level: 3,
            effect_values: vec![15.0, 25.0, 40.0],
        },
    ]
}

/// Derived multipliers; never persisted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillComposition {
    pub size_multiplier: f32,
    pub damage_multiplier: f32,
    pub penetration_count: u32,
    /// Projectile damage when the missile skill is owned and configured
    pub missile_damage: Option<f32>,
}

impl Default for SkillComposition {
    fn default() -> Self {
        Self {
            size_multiplier: 1.0,
            damage_multiplier: 1.0,
            penetration_count: 0,
            missile_damage: None,
        }
    }
}

/// Owned skills plus their composition
#[derive(Debug, Clone)]
pub struct SkillSet {
    catalog: SkillCatalog,
    owned: BTreeMap<SkillId, u32>,
    composition: SkillComposition,
}

impl SkillSet {
    pub fn new(catalog: SkillCatalog) -> Self {
        Self {
            catalog,
            owned: BTreeMap::new(),
            composition: SkillComposition::default(),
        }
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn composition(&self) -> &SkillComposition {
        &self.composition
    }

    pub fn level_of(&self, id: SkillId) -> Option<u32> {
        self.owned.get(&id).copied()
    }

    pub fn owned(&self) -> impl Iterator<Item = (SkillId, u32)> + '_ {
        self.owned.iter().map(|(id, level)| (*id, *level))
    }

    /// Acquire or level up a skill. Returns the new level, or `None` when the
    /// id is unknown or the skill is already at max level.
    pub fn acquire(&mut self, id: SkillId) -> Option<u32> {
        let Some(def) = self.catalog.get(id) else {
            log::warn!("Unknown skill id {:?}, ignoring", id);
            return None;
        };
        let max_level = def.max_level.max(1);
        let next = match self.owned.get(&id) {
            None => 1,
            Some(&level) if level < max_level => level + 1,
            Some(_) => return None,
        };
        self.owned.insert(id, next);
        self.recompose();
        Some(next)
    }

    /// Drop a skill entirely. Returns false if it was not owned.
    pub fn remove(&mut self, id: SkillId) -> bool {
        if self.owned.remove(&id).is_none() {
            return false;
        }
        self.recompose();
        true
    }

    pub fn reset(&mut self) {
        self.owned.clear();
        self.recompose();
    }

    /// Rebuild every multiplier from the baseline
    fn recompose(&mut self) {
        let mut comp = SkillComposition::default();
        for (&id, &level) in &self.owned {
            let Some(def) = self.catalog.get(id) else {
                continue;
            };
            let level = level.clamp(1, def.max_level.max(1));
            let Some(value) = def.effect_value(level) else {
                log::warn!("Skill {:?} ({:?}) has no effect values, it does nothing", id, def.kind);
                continue;
            };
            match def.kind {
                SkillKind::SizeUp => comp.size_multiplier = value.max(1.0),
                SkillKind::DamageUp => comp.damage_multiplier = value.max(1.0),
                SkillKind::Penetration => comp.penetration_count = value.max(0.0).round() as u32,
                SkillKind::Missile => {
                    if value > 0.0 {
                        comp.missile_damage = Some(value);
                    }
                }
            }
        }
        self.composition = comp;
    }
}

/// Per-puck penetration charges and the set of obstacles already passed
#[derive(Debug, Clone, Default)]
pub struct PenetrationTracker {
    remaining: u32,
    penetrated: BTreeSet<u32>,
}

impl PenetrationTracker {
    /// Refill charges to `count` and forget penetrated obstacles
    pub fn rearm(&mut self, count: u32) {
        self.remaining = count;
        self.penetrated.clear();
    }

    /// Refill charges without forgetting what was already passed
    pub fn replenish(&mut self, count: u32) {
        self.remaining = count;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn has_penetrated(&self, id: u32) -> bool {
        self.penetrated.contains(&id)
    }

    /// Spend a charge on `id` if one is left and `id` was not passed yet
    pub fn try_penetrate(&mut self, id: u32) -> bool {
        if self.remaining == 0 || self.penetrated.contains(&id) {
            return false;
        }
        self.remaining -= 1;
        self.penetrated.insert(id);
        true
    }
}
