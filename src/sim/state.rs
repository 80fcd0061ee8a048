//! Game state and the simulation root
//!
//! `GameState` owns every piece of the simulation: the puck, the player,
//! the zones (through `Progression`), growth, skills and the event queue.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::destructible::{Attacker, DamageOutcome};
use super::events::{EffectKind, EventBus, GameEvent};
use super::growth::{AttackBonus, PlayerGrowth};
use super::missile::{MissileScheduler, Projectile};
use super::progression::Progression;
use super::puck::Puck;
use super::skills::{PenetrationTracker, SkillId, SkillSet};
use super::stage::generate_stage;
use super::tables::{PlayerStats, PuckStats, StatTable};
use super::zone::ZoneRecord;
use crate::config::{GameConfig, PhysicsConfig};
use crate::planar;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Every zone is cleared. Terminal.
    StageCleared,
}

/// The player-controlled striker
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub pos: Vec3,
    /// Velocity of the last move, used for the hit impulse
    pub vel: Vec3,
    pub radius: f32,
}

impl Player {
    pub fn new(id: u32, pos: Vec3, radius: f32) -> Self {
        Self {
            id,
            pos: planar(pos),
            vel: Vec3::ZERO,
            radius,
        }
    }

    /// Step toward `target`, covering at most `max_speed * dt`
    pub fn move_toward(&mut self, target: Vec3, dt: f32, max_speed: f32) {
        let delta = planar(target - self.pos);
        let step = delta.clamp_length_max(max_speed.max(0.0) * dt);
        self.vel = if dt > 0.0 { step / dt } else { Vec3::ZERO };
        self.pos += step;
    }

    /// Stand still this tick
    pub fn halt(&mut self) {
        self.vel = Vec3::ZERO;
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub score: u64,
    pub puck: Puck,
    pub player: Player,
    pub growth: PlayerGrowth,
    pub skills: SkillSet,
    pub penetration: PenetrationTracker,
    pub progression: Progression,
    pub missiles: MissileScheduler,
    pub projectiles: Vec<Projectile>,
    pub events: EventBus,
    pub physics: PhysicsConfig,
    puck_table: StatTable<PuckStats>,
    player_table: StatTable<PlayerStats>,
    pub(crate) next_id: u32,
}

impl GameState {
    /// Generate a stage from the config and start its first zone
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = generate_stage(&config.stage, &mut rng, 1);
        Self::build(config, seed, rng, layout.zones, layout.next_id)
    }

    /// Start from zones built elsewhere. Ids handed out later start past
    /// the highest obstacle id.
    pub fn with_zones(config: &GameConfig, seed: u64, zones: Vec<ZoneRecord>) -> Self {
        let next_id = zones
            .iter()
            .flat_map(|z| z.destructibles().iter().map(|d| d.id))
            .max()
            .map_or(1, |id| id + 1);
        Self::build(config, seed, Pcg32::seed_from_u64(seed), zones, next_id)
    }

    fn build(config: &GameConfig, seed: u64, rng: Pcg32, zones: Vec<ZoneRecord>, next_id: u32) -> Self {
        let puck_table = config.puck_table();
        let player_table = config.player_table();
        let physics = config.physics.clone();

        let mut puck = Puck::new(&puck_table, physics.air_resistance, physics.min_velocity);
        puck.base_radius = physics.puck_radius;

        let mut state = Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            time_ticks: 0,
            score: 0,
            puck,
            player: Player::new(0, Vec3::ZERO, physics.player_radius),
            growth: PlayerGrowth::new(config.level_thresholds.clone(), config.max_growth_stage()),
            skills: SkillSet::new(config.skill_catalog()),
            penetration: PenetrationTracker::default(),
            progression: Progression::new(zones),
            missiles: MissileScheduler::new(&config.missile),
            projectiles: Vec::new(),
            events: EventBus::new(),
            physics,
            puck_table,
            player_table,
            next_id,
        };

        state.player.id = state.next_entity_id();
        state.progression.activate_first_zone(&mut state.events);
        if state.progression.is_all_cleared() {
            state.phase = GamePhase::StageCleared;
        }
        state.reset_puck();
        state.place_player();
        log::info!(
            "New game (seed {}), {} zones",
            seed,
            state.progression.zones().len()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn puck_table(&self) -> &StatTable<PuckStats> {
        &self.puck_table
    }

    pub fn player_table(&self) -> &StatTable<PlayerStats> {
        &self.player_table
    }

    /// Player stat row for the current growth stage
    pub fn player_stats(&self) -> &PlayerStats {
        self.player_table.row(self.growth.growth_stage())
    }

    pub fn attacker(&self) -> Attacker {
        Attacker {
            id: self.player.id,
            level: self.growth.level(),
        }
    }

    /// Damage a puck hit deals inside a zone: stage attack power, zone hook,
    /// then the skill damage multiplier
    pub fn attack_power(&self, zone_index: usize) -> f32 {
        let zone_mult = self.progression.zone(zone_index).map_or(1.0, |z| z.damage_multiplier);
        self.growth.attack_power_with(
            &self.player_table,
            zone_mult,
            &[AttackBonus::Multiplier(self.skills.composition().damage_multiplier)],
        )
    }

    /// Acquire or level up a skill. Returns the new level.
    pub fn acquire_skill(&mut self, id: SkillId) -> Option<u32> {
        let level = self.skills.acquire(id)?;
        if let Some(def) = self.skills.catalog().get(id) {
            let kind = def.kind;
            log::info!("Skill {:?} now level {}", kind, level);
            self.events.push(GameEvent::SkillAcquired { kind, level });
            self.events.push(GameEvent::PlayEffect {
                kind: EffectKind::Skill(kind),
                pos: self.puck.pos,
            });
        }
        self.sync_skills();
        Some(level)
    }

    pub fn remove_skill(&mut self, id: SkillId) -> bool {
        let kind = self.skills.catalog().get(id).map(|d| d.kind);
        if !self.skills.remove(id) {
            return false;
        }
        if let Some(kind) = kind {
            self.events.push(GameEvent::SkillRemoved { kind });
        }
        self.sync_skills();
        true
    }

    pub fn reset_skills(&mut self) {
        let removed: Vec<_> = self
            .skills
            .owned()
            .filter_map(|(id, _)| self.skills.catalog().get(id).map(|d| d.kind))
            .collect();
        self.skills.reset();
        for kind in removed {
            self.events.push(GameEvent::SkillRemoved { kind });
        }
        self.sync_skills();
    }

    /// Push the current composition into the puck, the penetration charges
    /// and the missile scheduler
    fn sync_skills(&mut self) {
        let comp = *self.skills.composition();
        self.puck.set_size_multiplier(comp.size_multiplier);
        self.penetration.replenish(comp.penetration_count);
        match comp.missile_damage {
            Some(damage) if self.phase != GamePhase::StageCleared => self.missiles.activate(damage),
            _ => self.missiles.deactivate(),
        }
    }

    /// Re-derive the growth stage from the level and push it to the puck
    pub fn sync_growth_stage(&mut self) {
        let stage = self.growth.growth_stage();
        if self.puck.update_growth_stage(stage, &self.puck_table) {
            log::info!("Growth stage {}", stage);
            self.events.push(GameEvent::GrowthStageChanged { stage });
        }
    }

    /// Put the puck back at the current zone's spawn point, at rest, with
    /// fresh penetration charges
    pub fn reset_puck(&mut self) {
        let spawn = self
            .progression
            .current_zone()
            .map_or(Vec3::ZERO, |z| z.spawn_point());
        self.puck.reset(spawn);
        self.penetration.rearm(self.skills.composition().penetration_count);
    }

    /// Route damage to one obstacle and fan out every consequence: health
    /// and destruction events, score, experience, growth and zone clearing
    pub fn apply_damage(&mut self, zone_index: usize, id: u32, amount: f32, pos: Vec3) -> DamageOutcome {
        let attacker = self.attacker();
        let result = self.progression.apply_damage(zone_index, id, amount, attacker);
        match result.outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Rejected => {
                log::trace!("Obstacle {} needs a higher level", id);
            }
            DamageOutcome::Damaged { percentage } => {
                self.events.push(GameEvent::HealthChanged { id, percentage });
            }
            DamageOutcome::Destroyed { points, .. } => {
                let (zone_level, multiplier) = self
                    .progression
                    .zone(zone_index)
                    .map_or((0, 1.0), |z| (z.level, z.score_multiplier));
                self.events.push(GameEvent::HealthChanged { id, percentage: 0.0 });
                self.events.push(GameEvent::ObjectDestroyed {
                    id,
                    points,
                    zone_level,
                    pos,
                });
                self.events.push(GameEvent::PlayEffect {
                    kind: EffectKind::Destruction,
                    pos,
                });

                let delta = (f64::from(points) * f64::from(multiplier.max(0.0))).round() as u64;
                if delta > 0 {
                    self.score += delta;
                    self.events.push(GameEvent::ScoreChanged {
                        delta,
                        total: self.score,
                    });
                }
                if self
                    .growth
                    .gain_experience(u64::from(points), multiplier, &mut self.events)
                {
                    self.sync_growth_stage();
                }
            }
        }

        if result.cleared {
            let before = self.progression.current_index();
            self.progression.complete_zone(zone_index, &mut self.events);
            let after = self.progression.current_index();
            if after != before {
                self.enter_zone(after);
            }
            if self.progression.is_all_cleared() {
                self.finish_stage();
            }
        }
        result.outcome
    }

    /// Start a new zone from its spawn point. The puck may sit behind a
    /// wall the player cannot pass yet, so it is always brought along.
    fn enter_zone(&mut self, index: usize) {
        self.missiles.strategy_mut().on_zone_changed(index);
        self.reset_puck();
        self.place_player();
    }

    /// Stand the player just in front of the puck
    fn place_player(&mut self) {
        let gap = self.player.radius + self.puck.radius() + 1.0;
        self.player.pos = self.puck.pos - Vec3::Z * gap;
        self.player.halt();
    }

    fn finish_stage(&mut self) {
        log::info!("Stage cleared with score {}", self.score);
        self.phase = GamePhase::StageCleared;
        self.missiles.deactivate();
        self.projectiles.clear();
    }
}
