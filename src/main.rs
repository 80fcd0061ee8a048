//! Puck Zones headless driver
//!
//! Loads the balance config, generates a stage and lets a simple autopilot
//! play it on the fixed-timestep loop, logging what happens.
//!
//! Usage: `puck-zones [config.json] [seed]`

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use glam::Vec3;

use puck_zones::GameConfig;
use puck_zones::consts::*;
use puck_zones::sim::{
    Delivery, GameEvent, GamePhase, GameState, Launch, NearestTarget, SkillId, TargetingStrategy, TickInput, tick,
};

/// Rendered frame length the driver pretends to run at
const FRAME_DT: f32 = 1.0 / 30.0;
/// Give up after this much simulated time
const MAX_SECONDS: f32 = 600.0;
/// Below this speed the autopilot strikes again
const STRIKE_SPEED: f32 = 1.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().map_or_else(|| PathBuf::from("puck_zones.json"), PathBuf::from);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE);

    let config = GameConfig::load(&path);
    let mut state = GameState::new(&config, seed);

    let destroyed = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&destroyed);
    state.events.subscribe(move |event| {
        match event {
            GameEvent::ObjectDestroyed { id, points, zone_level, .. } => {
                counter.set(counter.get() + 1);
                log::debug!("Destroyed {} in zone {} (+{})", id, zone_level, points);
            }
            GameEvent::LevelChanged { level } => log::info!("Level up: {}", level),
            GameEvent::ZoneActivated { index, level } => log::info!("Zone {} (level {}) active", index, level),
            GameEvent::SkillAcquired { kind, level } => log::info!("Skill {:?} level {}", kind, level),
            GameEvent::AllZonesCleared => log::info!("All zones cleared"),
            _ => {}
        }
        Delivery::Keep
    });

    let skill_ids: Vec<SkillId> = state.skills.catalog().iter().map(|d| d.id).collect();
    let mut last_level = state.growth.level();
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;

    while state.phase == GamePhase::Playing && elapsed < MAX_SECONDS {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = autopilot(&state);
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        // Each level gained buys the next skill in catalog order
        while last_level < state.growth.level() {
            if !skill_ids.is_empty() {
                let id = skill_ids[(last_level as usize - 1) % skill_ids.len()];
                state.acquire_skill(id);
            }
            last_level += 1;
        }
    }

    log::info!(
        "Finished after {:.1}s: phase {:?}, score {}, level {}, {} destroyed",
        elapsed,
        state.phase,
        state.score,
        state.growth.level(),
        destroyed.get()
    );
}

/// Walk behind the puck and strike it toward the nearest obstacle once it
/// has slowed down
fn autopilot(state: &GameState) -> TickInput {
    let zones = state.progression.zones();
    let target = NearestTarget
        .find_target(state.puck.pos, zones)
        .map_or(state.puck.pos + Vec3::Z, |t| t.pos);
    let aim = (target - state.puck.pos).normalize_or_zero();
    let behind = state.puck.pos - aim * (state.player.radius + state.puck.radius() + 0.5);

    let ready = state.puck.speed() < STRIKE_SPEED && (state.player.pos - behind).length() < 0.25;
    TickInput {
        move_to: Some(behind),
        launch: ready.then_some(Launch {
            direction: aim,
            strength: state.puck.max_force(),
        }),
        ..Default::default()
    }
}
