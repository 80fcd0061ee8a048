//! End-to-end runs of the simulation through `tick()`

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use puck_zones::GameConfig;
use puck_zones::consts::SIM_DT;
use puck_zones::sim::{
    Delivery, Destructible, GameEvent, GamePhase, GameState, Launch, SkillId, TickInput, ZoneRecord, tick,
};

/// Two 10x10 zones back to back along +Z
fn two_zones(first: Vec<Destructible>, second: Vec<Destructible>) -> Vec<ZoneRecord> {
    let mut a = ZoneRecord::new(1, 10.0, 10.0, 10.0, Vec3::new(0.0, 0.0, 5.0)).with_wall_required_level(2);
    for d in first {
        a.add_destructible(d);
    }
    let mut b = ZoneRecord::new(2, 10.0, 10.0, 10.0, Vec3::new(0.0, 0.0, 15.0)).with_wall_required_level(u32::MAX);
    for d in second {
        b.add_destructible(d);
    }
    vec![a, b]
}

fn record(state: &mut GameState) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    state.events.subscribe(move |event| {
        sink.borrow_mut().push(event.clone());
        Delivery::Keep
    });
    seen
}

fn run(state: &mut GameState, ticks: u32) {
    for _ in 0..ticks {
        tick(state, &TickInput::default(), SIM_DT);
    }
}

fn strike(state: &mut GameState) {
    let input = TickInput {
        launch: Some(Launch {
            direction: Vec3::Z,
            strength: 12.0,
        }),
        ..Default::default()
    };
    tick(state, &input, SIM_DT);
}

#[test]
fn test_stage_playthrough_event_order() {
    let zones = two_zones(
        vec![Destructible::new(1, Vec3::new(0.0, 0.0, 7.0), 0.5, 5.0, 120)],
        vec![Destructible::new(2, Vec3::new(0.0, 0.0, 17.0), 0.5, 5.0, 40)],
    );
    let mut state = GameState::with_zones(&GameConfig::default(), 1, zones);
    let seen = record(&mut state);

    strike(&mut state);
    run(&mut state, 60);
    assert_eq!(state.progression.current_index(), 1);
    assert_eq!(state.puck.pos, state.progression.zones()[1].spawn_point());

    strike(&mut state);
    run(&mut state, 60);
    assert_eq!(state.phase, GamePhase::StageCleared);
    assert_eq!(state.score, 160);
    assert!(state.events.pending().is_empty());

    let seen = seen.borrow();
    let position = |wanted: &GameEvent| seen.iter().position(|e| e == wanted);
    let cleared_first = position(&GameEvent::ZoneCleared { index: 0 });
    let activated_second = position(&GameEvent::ZoneActivated { index: 1, level: 2 });
    let cleared_second = position(&GameEvent::ZoneCleared { index: 1 });
    let all_cleared = position(&GameEvent::AllZonesCleared);
    assert!(cleared_first.is_some());
    assert!(cleared_first < activated_second);
    assert!(activated_second < cleared_second);
    assert!(cleared_second < all_cleared);
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, GameEvent::ObjectDestroyed { .. }))
            .count(),
        2
    );
}

#[test]
fn test_back_wall_gated_by_level() {
    let zones = two_zones(
        vec![Destructible::new(1, Vec3::new(4.0, 0.0, 1.5), 0.5, 50.0, 10)],
        vec![Destructible::new(2, Vec3::new(4.0, 0.0, 18.0), 0.5, 50.0, 10)],
    );
    let mut state = GameState::with_zones(&GameConfig::default(), 1, zones);

    state.puck.pos = Vec3::new(0.0, 0.0, 7.0);
    state.puck.vel = Vec3::new(0.0, 0.0, 10.0);
    run(&mut state, 30);
    assert!(state.puck.pos.z < 10.0);
    assert!(state.puck.vel.z < 0.0);

    // Level 2 opens the wall
    state.growth.gain_experience(100, 1.0, &mut state.events);
    assert_eq!(state.growth.level(), 2);
    state.puck.pos = Vec3::new(0.0, 0.0, 7.0);
    state.puck.vel = Vec3::new(0.0, 0.0, 10.0);
    run(&mut state, 30);
    assert!(state.puck.pos.z > 10.0);
}

#[test]
fn test_back_wall_gated_from_behind() {
    let zones = two_zones(
        vec![Destructible::new(1, Vec3::new(4.0, 0.0, 1.5), 0.5, 50.0, 10)],
        vec![Destructible::new(2, Vec3::new(4.0, 0.0, 18.0), 0.5, 50.0, 10)],
    );
    let mut state = GameState::with_zones(&GameConfig::default(), 1, zones);

    // Coming back from the far zone while under-levelled
    state.puck.pos = Vec3::new(0.0, 0.0, 11.0);
    state.puck.vel = Vec3::new(0.0, 0.0, -10.0);
    for _ in 0..30 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.puck.pos.z >= 10.0, "puck got behind the gate: z={}", state.puck.pos.z);
    }
    assert!(state.puck.vel.z > 0.0);

    state.growth.gain_experience(100, 1.0, &mut state.events);
    state.puck.pos = Vec3::new(0.0, 0.0, 11.0);
    state.puck.vel = Vec3::new(0.0, 0.0, -10.0);
    run(&mut state, 30);
    assert!(state.puck.pos.z < 10.0);
}

#[test]
fn test_stage_without_requested_obstacles_still_finishes() {
    let config = GameConfig::from_json(r#"{ "stage": { "destructibles_per_zone": 0 } }"#).expect("valid json");
    let state = GameState::new(&config, 4);
    assert!(state.progression.zones().iter().all(|z| z.total_count() > 0));
    assert_eq!(state.phase, GamePhase::Playing);
    assert!(state.progression.current_zone().is_some_and(|z| z.is_active()));
}

#[test]
fn test_missiles_clear_a_zone_on_their_own() {
    let mut zone = ZoneRecord::new(1, 10.0, 10.0, 10.0, Vec3::new(0.0, 0.0, 5.0)).with_wall_required_level(u32::MAX);
    zone.add_destructible(Destructible::new(1, Vec3::new(0.0, 0.0, 8.0), 0.5, 30.0, 10));
    let mut state = GameState::with_zones(&GameConfig::default(), 1, vec![zone]);
    let seen = record(&mut state);

    assert_eq!(state.acquire_skill(SkillId(4)), Some(1));
    run(&mut state, 300);

    assert_eq!(state.phase, GamePhase::StageCleared);
    assert!(!state.missiles.is_active());
    assert!(state.projectiles.is_empty());
    let fired = seen
        .borrow()
        .iter()
        .filter(|e| matches!(e, GameEvent::ProjectileFired { target: Some(1), .. }))
        .count();
    assert_eq!(fired, 2);
}

#[test]
fn test_tiered_obstacle_rejects_low_level_hits() {
    let mut zone = ZoneRecord::new(1, 10.0, 10.0, 10.0, Vec3::new(0.0, 0.0, 5.0)).with_wall_required_level(u32::MAX);
    zone.add_destructible(Destructible::new(1, Vec3::new(0.0, 0.0, 7.0), 0.5, 5.0, 10).with_required_level(3));
    let mut state = GameState::with_zones(&GameConfig::default(), 1, vec![zone]);
    state.acquire_skill(SkillId(3));
    let seen = record(&mut state);

    strike(&mut state);
    run(&mut state, 30);

    let zone = &state.progression.zones()[0];
    assert!(zone.destructible(1).is_some_and(|d| d.is_alive() && d.health() == 5.0));
    // Invulnerable obstacles are never passed through
    assert_eq!(state.penetration.remaining(), 1);
    assert!(state.puck.vel.z < 0.0);
    assert!(
        !seen
            .borrow()
            .iter()
            .any(|e| matches!(e, GameEvent::HealthChanged { .. }))
    );
}

#[test]
fn test_subscriber_can_leave_during_dispatch() {
    let mut state = GameState::new(&GameConfig::default(), 5);
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    state.events.subscribe(move |_| {
        *counter.borrow_mut() += 1;
        Delivery::Unsubscribe
    });
    state.acquire_skill(SkillId(1));
    tick(&mut state, &TickInput::default(), SIM_DT);
    tick(&mut state, &TickInput::default(), SIM_DT);
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(state.events.subscriber_count(), 0);
}

#[test]
fn test_partial_config_file() {
    let config = GameConfig::from_json(r#"{ "stage": { "zone_count": 2 }, "physics": { "restitution": 0.5 } }"#)
        .expect("valid json");
    let state = GameState::new(&config, 8);
    assert_eq!(state.progression.zones().len(), 2);
    assert_eq!(state.physics.restitution, 0.5);
    assert_eq!(state.puck.max_speed(), 15.0);
}
