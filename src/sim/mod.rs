//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (zones by level, obstacles by insertion)
//! - No rendering or platform dependencies

pub mod collision;
pub mod destructible;
pub mod events;
pub mod growth;
pub mod missile;
pub mod progression;
pub mod puck;
pub mod skills;
pub mod stage;
pub mod state;
pub mod tables;
pub mod targeting;
pub mod tick;
pub mod zone;

pub use collision::{CollisionResult, ContactResponse, bounce, reflect_velocity};
pub use destructible::{Attacker, DamageOutcome, Destructible, Origin, SizeClass, SizeProfile};
pub use events::{Delivery, EffectKind, EventBus, GameEvent, SubscriberId};
pub use growth::{AttackBonus, PlayerGrowth};
pub use missile::{MissileScheduler, Projectile, ProjectileHit, SchedulerState};
pub use progression::Progression;
pub use puck::Puck;
pub use skills::{PenetrationTracker, SkillCatalog, SkillComposition, SkillDef, SkillId, SkillKind, SkillSet};
pub use stage::{StageLayout, generate_stage};
pub use state::{GamePhase, GameState, Player};
pub use tables::{PlayerStats, PuckStats, StatTable};
pub use targeting::{NearestTarget, TargetRef, TargetingStrategy, ZoneTarget};
pub use tick::{Launch, TickInput, tick};
pub use zone::{WallSide, ZoneDamage, ZoneRecord, ZoneStatus};
