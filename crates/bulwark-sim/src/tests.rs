//! Tests for the combat engine, spawn pipeline, asset cache and shield.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use glam::{DQuat, DVec3};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_attack::profiles::model_id;
use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::*;
use bulwark_core::config::{CombatConfig, ShieldConfig};
use bulwark_core::enums::*;
use bulwark_core::events::CombatEvent;
use bulwark_core::types::{ModelId, NodeId};

use crate::assets::{AssetCache, ScriptedAssetSource};
use crate::engine::CombatEngine;
use crate::scene::HeadlessScene;
use crate::shield::{collapse_opacity, collapse_scale, Shield};
use crate::slots::{SlotConstraints, SlotPool};
use crate::systems::movement;
use crate::HitOutcome;

type Engine = CombatEngine<HeadlessScene, ScriptedAssetSource>;

/// 60 Hz frame.
const FRAME_MS: f64 = 1000.0 / 60.0;

fn make_engine(config: CombatConfig, latency_polls: u32) -> Engine {
    CombatEngine::new(config, HeadlessScene::default(), ScriptedAssetSource::new(latency_polls))
        .unwrap()
}

/// No automatic spawning: ships only appear through the test helpers.
fn quiet_config() -> CombatConfig {
    let mut config = CombatConfig::default();
    config.spawn.min_active_ships = 0;
    config.spawn.spawn_interval_secs = 1.0e9;
    config
}

fn all_models() -> Vec<ModelId> {
    ShipType::ALL.iter().map(|t| model_id(*t)).collect()
}

/// Freeze a ship in its paused phase so it keeps attacking.
fn hold_still(engine: &mut Engine, entity: hecs::Entity) {
    let mut movement = engine.world_mut().get::<&mut Movement>(entity).unwrap();
    movement.phase = MovePhase::Paused;
    movement.phase_remaining = 1.0e9;
}

fn set_attack(engine: &mut Engine, entity: hecs::Entity, state: AttackState) {
    *engine.world_mut().get::<&mut AttackState>(entity).unwrap() = state;
}

fn attack_state(engine: &Engine, entity: hecs::Entity) -> AttackState {
    *engine.world().get::<&AttackState>(entity).unwrap()
}

fn lifecycle(engine: &Engine, entity: hecs::Entity) -> LifecycleState {
    engine.world().get::<&Lifecycle>(entity).unwrap().state
}

/// Advance until `entity` is despawned. Panics if it never is.
fn run_until_reaped(engine: &mut Engine, entity: hecs::Entity) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    for _ in 0..200 {
        events.extend(engine.advance(200.0).events);
        if !engine.world().contains(entity) {
            return events;
        }
    }
    panic!("ship was never reaped");
}

fn shoot_down(engine: &mut Engine, node: NodeId) {
    for _ in 0..20 {
        if let HitOutcome::Downed { .. } = engine.apply_player_damage(node) {
            return;
        }
    }
    panic!("ship never went down");
}

// ---- End-to-end scenarios ----

#[test]
fn test_medium_burst_drains_shield() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, _) = engine.spawn_alive_ship(ShipType::Medium).unwrap();
    hold_still(&mut engine, entity);
    set_attack(&mut engine, entity, AttackState::Cooldown { remaining: 0.0 });

    // Cooldown expires: beam comes up, no damage yet.
    let snap = engine.advance(200.0);
    assert_eq!(engine.scene().active_beams(), 1);
    assert_eq!(engine.shield().health(), 100.0);
    assert_eq!(snap.shield.emissive_intensity, 3.0, "engaging flashes the shield");
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::BeamStarted { .. })));

    // 0.6s of fire at 12/s.
    for _ in 0..3 {
        engine.advance(200.0);
    }
    assert!(
        (engine.shield().health() - 92.8).abs() < 1e-9,
        "health {}",
        engine.shield().health()
    );
    assert_eq!(engine.scene().active_beams(), 0);
    match attack_state(&engine, entity) {
        AttackState::Cooldown { remaining } => assert!((2.0..=4.0).contains(&remaining)),
        other => panic!("expected cooldown after burst, got {other:?}"),
    }
}

#[test]
fn test_light_ship_dies_on_second_hit_and_frees_slot() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, node) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    let slot = engine.world().get::<&SlotRef>(entity).unwrap().0;
    let ship = engine.world().get::<&Ship>(entity).unwrap().id;

    assert_eq!(
        engine.apply_player_damage(node),
        HitOutcome::Damaged { ship, health: 15.0 }
    );
    assert_eq!(engine.apply_player_damage(node), HitOutcome::Downed { ship });
    assert_eq!(lifecycle(&engine, entity), LifecycleState::Dying);
    assert_eq!(engine.world().get::<&Health>(entity).unwrap().current, 0.0);
    assert!(engine.world().get::<&AttackState>(entity).is_err());

    // Third hit lands on a falling wreck.
    assert_eq!(engine.apply_player_damage(node), HitOutcome::Ignored);
    assert!(engine.slots().get(slot).unwrap().occupied);

    let events = run_until_reaped(&mut engine, entity);
    assert!(!engine.slots().get(slot).unwrap().occupied);
    assert_eq!(engine.score().score, 10);
    assert_eq!(engine.score().kills_by_type, [1, 0, 0]);
    assert!(!engine.scene().contains(node));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ShipDestroyed {
            ship_type: ShipType::Light,
            points: 10,
            ..
        }
    )));
}

#[test]
fn test_spawn_at_capacity_is_noop() {
    let mut config = quiet_config();
    config.spawn.max_active_ships = 2;
    let mut engine = make_engine(config, 0);
    engine.spawn_alive_ship(ShipType::Light).unwrap();
    engine.spawn_alive_ship(ShipType::Heavy).unwrap();
    assert_eq!(engine.active_ship_count(), 2);

    assert!(engine.try_spawn().is_none());
    assert_eq!(engine.world().len(), 2);
    assert_eq!(engine.slots().occupied_count(), 2);
    assert_eq!(engine.in_flight_loads(), 0);
    assert!(engine.source_mut().begun().is_empty());
}

// ---- Spawning and loading ----

#[test]
fn test_spawn_tops_up_and_resolves_next_frame() {
    let mut engine = make_engine(CombatConfig::default(), 0);

    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.in_flight_loads, 2, "min_active_ships loads requested");
    assert_eq!(snap.active_ship_count, 0);
    assert!(snap.ships.iter().all(|s| s.state == LifecycleState::Loading));
    assert!(snap.ships.iter().all(|s| s.node.is_none()));

    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.active_ship_count, 2);
    assert_eq!(snap.in_flight_loads, 0);
    for ship in snap.ships.iter().filter(|s| s.state == LifecycleState::Alive) {
        assert!(ship.node.is_some());
        assert!(ship.attack.is_some());
        assert_eq!(ship.beam_active, ship.attack == Some(AttackMode::Firing));
    }
}

#[test]
fn test_active_band_respected_over_long_run() {
    let mut engine = make_engine(CombatConfig::default(), 3);
    for frame in 0..3000 {
        let snap = engine.advance(FRAME_MS);
        assert!(snap.in_flight_loads <= 2, "frame {frame}");
        assert!(
            snap.active_ship_count + snap.in_flight_loads <= 4,
            "frame {frame}: {} active, {} loading",
            snap.active_ship_count,
            snap.in_flight_loads
        );
    }
    assert_eq!(engine.active_ship_count(), 4, "periodic spawns fill the band");
}

#[test]
fn test_failed_loads_release_reservations() {
    let mut engine = make_engine(CombatConfig::default(), 0);
    for model in all_models() {
        engine.source_mut().fail_model(model);
    }

    engine.advance(FRAME_MS);
    assert_eq!(engine.slots().occupied_count(), 2);

    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.score.loads_failed, 2);
    assert_eq!(snap.active_ship_count, 0);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::ShipLoadFailed { .. })));
    // Failures are retried by the next top-up; only live reservations hold slots.
    assert_eq!(engine.slots().occupied_count(), engine.world().len() as usize);

    engine.source_mut().clear_failures();
    engine.advance(FRAME_MS);
    engine.advance(FRAME_MS);
    assert_eq!(engine.active_ship_count(), 2);
}

#[test]
fn test_reset_discards_abandoned_loads() {
    let mut engine = make_engine(CombatConfig::default(), 0);
    for model in all_models() {
        engine.source_mut().stall_model(model);
    }
    engine.advance(FRAME_MS);
    assert_eq!(engine.in_flight_loads(), 2);

    engine.reset();
    assert_eq!(engine.session(), 1);
    assert_eq!(engine.world().len(), 0);
    assert_eq!(engine.slots().occupied_count(), 0);

    engine.source_mut().release_stalled();
    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.session, 1);
    assert_eq!(snap.active_ship_count, 0, "old-session models never attach");
    assert_eq!(engine.scene().node_count(), 0);
    assert!(snap.ships.iter().all(|s| s.state == LifecycleState::Loading));

    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.active_ship_count, 2);
    assert_eq!(engine.scene().node_count(), 2 * 3);
}

#[test]
fn test_slot_occupancy_matches_ships() {
    let mut engine = make_engine(CombatConfig::default(), 2);
    for frame in 0..2000 {
        let snap = engine.advance(FRAME_MS);
        if frame % 30 == 0 {
            if let Some(node) = snap
                .ships
                .iter()
                .find(|s| s.state == LifecycleState::Alive)
                .and_then(|s| s.node)
            {
                engine.queue_command(PlayerCommand::Fire { node });
            }
        }

        let mut held = HashSet::new();
        for (_entity, slot) in engine.world().query::<&SlotRef>().iter() {
            assert!(held.insert(slot.0), "frame {frame}: slot {} shared", slot.0);
        }
        for (index, slot) in engine.slots().iter().enumerate() {
            assert_eq!(slot.occupied, held.contains(&index), "frame {frame}: slot {index}");
        }
    }
    assert!(engine.score().total_kills() > 0);
}

// ---- Attack behaviour ----

#[test]
fn test_moving_tears_down_beam_same_frame() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, _) = engine.spawn_alive_ship(ShipType::Heavy).unwrap();
    hold_still(&mut engine, entity);
    set_attack(&mut engine, entity, AttackState::Cooldown { remaining: 0.0 });

    engine.advance(FRAME_MS);
    assert!(attack_state(&engine, entity).beam().is_some());
    assert_eq!(engine.scene().active_beams(), 1);

    // Pause phase ends this frame; the ship starts moving.
    engine.world_mut().get::<&mut Movement>(entity).unwrap().phase_remaining = 0.0;
    let snap = engine.advance(FRAME_MS);

    assert_eq!(engine.scene().active_beams(), 0);
    assert_eq!(
        attack_state(&engine, entity),
        AttackState::Cooldown { remaining: 0.0 }
    );
    let view = snap.ships.iter().find(|s| s.node.is_some()).unwrap();
    assert!(view.moving);
    assert!(!view.beam_active);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::BeamStopped { .. })));
}

#[test]
fn test_downed_ship_releases_beam() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, node) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    hold_still(&mut engine, entity);
    set_attack(&mut engine, entity, AttackState::Cooldown { remaining: 0.0 });
    engine.advance(FRAME_MS);
    assert_eq!(engine.scene().active_beams(), 1);

    shoot_down(&mut engine, node);
    assert_eq!(engine.scene().active_beams(), 0);
}

#[test]
fn test_no_new_beams_after_shield_destroyed() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, _) = engine.spawn_alive_ship(ShipType::Heavy).unwrap();
    hold_still(&mut engine, entity);
    assert!(engine.damage_shield(500.0));

    set_attack(&mut engine, entity, AttackState::Cooldown { remaining: 0.0 });
    engine.advance(FRAME_MS);
    assert_eq!(engine.scene().beams_requested(), 0);
    assert!(matches!(
        attack_state(&engine, entity),
        AttackState::Cooldown { .. }
    ));
}

// ---- Player damage ----

#[test]
fn test_hit_on_sub_part_resolves_to_ship() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, root) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    let part = engine.scene().children_of(root)[0];

    assert!(matches!(
        engine.apply_player_damage(part),
        HitOutcome::Damaged { health, .. } if health == 15.0
    ));
    assert!(matches!(
        engine.apply_player_damage(part),
        HitOutcome::Downed { .. }
    ));
    run_until_reaped(&mut engine, entity);

    // Stale reference to a part of a removed ship.
    assert_eq!(engine.apply_player_damage(part), HitOutcome::Ignored);
    assert_eq!(engine.apply_player_damage(NodeId(9999)), HitOutcome::Ignored);
}

#[test]
fn test_destroyed_hook_replace_and_clear() {
    let mut engine = make_engine(quiet_config(), 0);
    let first = Arc::new(AtomicU32::new(0));
    let second = Arc::new(AtomicU32::new(0));

    let counter = first.clone();
    engine.on_ship_destroyed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = second.clone();
    engine.on_ship_destroyed(move |ship_type| {
        assert_eq!(ship_type, ShipType::Medium);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let (entity, node) = engine.spawn_alive_ship(ShipType::Medium).unwrap();
    shoot_down(&mut engine, node);
    run_until_reaped(&mut engine, entity);
    assert_eq!(first.load(Ordering::SeqCst), 0, "replaced hook is not called");
    assert_eq!(second.load(Ordering::SeqCst), 1);

    engine.clear_ship_destroyed_hook();
    let (entity, node) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    shoot_down(&mut engine, node);
    run_until_reaped(&mut engine, entity);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(engine.score().total_kills(), 2);
}

// ---- Commands and frames ----

#[test]
fn test_pause_freezes_simulation() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, node) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    engine.advance(FRAME_MS);
    let frame = engine.time().frame;

    engine.queue_command(PlayerCommand::Pause);
    engine.queue_command(PlayerCommand::Fire { node });
    let snap = engine.advance(FRAME_MS);
    assert!(snap.paused);
    assert_eq!(snap.time.frame, frame);
    assert_eq!(engine.world().get::<&Health>(entity).unwrap().current, 30.0);

    engine.queue_command(PlayerCommand::Resume);
    engine.queue_command(PlayerCommand::Fire { node });
    let snap = engine.advance(FRAME_MS);
    assert!(!snap.paused);
    assert_eq!(snap.time.frame, frame + 1);
    assert_eq!(engine.world().get::<&Health>(entity).unwrap().current, 15.0);
}

#[test]
fn test_reset_command_restores_shield() {
    let mut engine = make_engine(CombatConfig::default(), 0);
    for _ in 0..120 {
        engine.advance(FRAME_MS);
    }
    engine.damage_shield(40.0);
    engine.queue_command(PlayerCommand::Reset);
    let snap = engine.advance(FRAME_MS);
    assert_eq!(snap.session, 1);
    assert_eq!(snap.shield.health, 100.0);
    assert_eq!(snap.score.ships_spawned, 2, "only the new session's top-up");
    assert_eq!(engine.scene().active_beams(), 0);
}

#[test]
fn test_frame_delta_is_sanitized() {
    let mut engine = make_engine(quiet_config(), 0);
    engine.advance(10_000.0);
    assert_eq!(engine.time().elapsed_secs, 0.25);
    engine.advance(-16.0);
    engine.advance(f64::NAN);
    assert_eq!(engine.time().elapsed_secs, 0.25);
    assert_eq!(engine.time().frame, 3);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = CombatConfig::default();
    config.spawn.min_active_ships = 9;
    let result = CombatEngine::new(config, HeadlessScene::default(), ScriptedAssetSource::new(0));
    assert!(result.is_err());
}

#[test]
fn test_determinism_same_seed() {
    let run = |seed: u64| {
        let config = CombatConfig {
            seed,
            ..Default::default()
        };
        let mut engine = make_engine(config, 1);
        let mut frames = Vec::new();
        for frame in 0..900 {
            let snap = engine.advance(FRAME_MS);
            if frame % 25 == 0 {
                if let Some(node) = snap.ships.iter().find_map(|s| s.node) {
                    engine.queue_command(PlayerCommand::Fire { node });
                }
            }
            frames.push(serde_json::to_string(&snap).unwrap());
        }
        frames
    };
    assert_eq!(run(12345), run(12345), "snapshots diverged with same seed");
    assert_ne!(run(1), run(2));
}

// ---- Shield ----

#[test]
fn test_shield_destroyed_is_sticky() {
    let mut shield = Shield::new(&ShieldConfig::default());
    assert!(!shield.take_damage(60.0));
    assert!(shield.take_damage(60.0));
    assert_eq!(shield.health(), 0.0);
    assert_eq!(shield.phase(), ShieldPhase::Destroyed);

    for _ in 0..100 {
        assert!(!shield.take_damage(10.0));
    }
    assert_eq!(shield.health(), 0.0);
    assert!(shield.is_destroyed());
    assert_eq!(shield.ratio(), 0.0);
}

#[test]
fn test_shield_ignores_bad_amounts() {
    let mut shield = Shield::new(&ShieldConfig::default());
    shield.take_damage(-5.0);
    shield.take_damage(0.0);
    shield.take_damage(f64::NAN);
    shield.take_damage(f64::INFINITY);
    assert_eq!(shield.health(), 100.0);
}

#[test]
fn test_shield_destruction_timeline() {
    let mut shield = Shield::new(&ShieldConfig::default());
    shield.take_damage(100.0);

    let mut samples = vec![(shield.scale(), shield.opacity())];
    assert_eq!(shield.scale(), 1.0);
    assert_eq!(shield.opacity(), 0.2);
    assert!((shield.camera_shake() - 0.15).abs() < 1e-12);

    shield.advance(0.25);
    assert!((shield.emissive_intensity() - 2.5).abs() < 1e-9, "ramp 1 -> 4");
    assert!(!shield.advance(0.25));
    samples.push((shield.scale(), shield.opacity()));
    assert_eq!(shield.scale(), 1.0);

    assert!(!shield.advance(0.4));
    samples.push((shield.scale(), shield.opacity()));
    assert!((shield.scale() - 0.525).abs() < 1e-9);
    assert!((shield.opacity() - 0.1).abs() < 1e-9);
    assert!(!shield.is_gone());

    assert!(shield.advance(0.45), "collapse finishes at 1.3s");
    samples.push((shield.scale(), shield.opacity()));
    assert!(shield.is_gone());
    assert_eq!(shield.opacity(), 0.0);
    assert!((shield.scale() - 0.05).abs() < 1e-12);
    assert_eq!(shield.camera_shake(), 0.0);
    assert!(!shield.advance(1.0), "gone is reported once");

    for pair in samples.windows(2) {
        assert!(pair[1].0 <= pair[0].0, "scale increased: {samples:?}");
        assert!(pair[1].1 <= pair[0].1, "opacity increased: {samples:?}");
    }
}

#[test]
fn test_collapse_curves_are_clamped() {
    assert_eq!(collapse_scale(0.0), 1.0);
    assert_eq!(collapse_scale(10.0), collapse_scale(1.3));
    assert_eq!(collapse_opacity(-1.0), 0.2);
    assert_eq!(collapse_opacity(5.0), 0.0);
}

#[test]
fn test_hit_flash_then_ease_to_baseline() {
    let mut shield = Shield::new(&ShieldConfig::default());
    assert_eq!(shield.emissive_intensity(), 0.9);

    shield.trigger_hit_flash();
    assert!(shield.is_hot());
    assert_eq!(shield.emissive_intensity(), 3.0);
    shield.advance(0.1);
    assert!(shield.is_hot());
    shield.advance(0.1);
    assert!(!shield.is_hot());
    assert_eq!(shield.emissive_intensity(), 3.0);

    shield.advance(1.0 / 60.0);
    assert!((shield.emissive_intensity() - (3.0 - 2.1 * 0.14)).abs() < 1e-9);

    for _ in 0..600 {
        shield.advance(1.0 / 60.0);
    }
    assert!((shield.emissive_intensity() - 0.9).abs() < 1e-6);
}

#[test]
fn test_snapshot_reports_shield_radius() {
    let mut config = quiet_config();
    config.shield.radius = 9.5;
    let mut engine = make_engine(config, 0);
    assert_eq!(engine.advance(FRAME_MS).shield.radius, 9.5);
}

#[test]
fn test_hit_flash_timer_runs_after_destruction() {
    let mut shield = Shield::new(&ShieldConfig::default());
    shield.take_damage(100.0);
    let emissive = shield.emissive_intensity();

    shield.trigger_hit_flash();
    assert_eq!(shield.hit_flash_remaining(), 0.15);
    assert_eq!(shield.emissive_intensity(), emissive, "collapse ramp keeps emissive");

    shield.advance(0.1);
    assert!((shield.hit_flash_remaining() - 0.05).abs() < 1e-9);
    assert!((shield.emissive_intensity() - 1.6).abs() < 1e-9);
    shield.advance(0.1);
    assert_eq!(shield.hit_flash_remaining(), 0.0);
}

#[test]
fn test_ease_is_frame_rate_independent() {
    let mut fast = Shield::new(&ShieldConfig::default());
    let mut slow = Shield::new(&ShieldConfig::default());
    for shield in [&mut fast, &mut slow] {
        shield.trigger_hit_flash();
        shield.advance(0.2);
    }
    fast.advance(1.0 / 120.0);
    fast.advance(1.0 / 120.0);
    slow.advance(1.0 / 60.0);
    assert!((fast.emissive_intensity() - slow.emissive_intensity()).abs() < 1e-9);
}

#[test]
fn test_shield_gone_event_emitted_once() {
    let mut engine = make_engine(quiet_config(), 0);
    assert!(engine.damage_shield(100.0));
    assert!(!engine.damage_shield(100.0));

    let mut gone_events = 0;
    let mut destroyed_events = 0;
    for _ in 0..200 {
        let snap = engine.advance(FRAME_MS);
        for event in &snap.events {
            match event {
                CombatEvent::ShieldGone => gone_events += 1,
                CombatEvent::ShieldDestroyed => destroyed_events += 1,
                _ => {}
            }
        }
    }
    assert!(engine.is_shield_gone());
    assert_eq!(gone_events, 1);
    assert_eq!(destroyed_events, 1);
    assert_eq!(engine.shield_ratio(), 0.0);
}

// ---- Asset cache ----

#[test]
fn test_cache_deduplicates_and_memoizes() {
    let model = ModelId::new("/models/probe.glb");
    let mut source = ScriptedAssetSource::new(0);
    let mut cache = AssetCache::new(4);

    let a = cache.acquire(&mut source, &model).unwrap();
    let b = cache.acquire(&mut source, &model).unwrap();
    assert_ne!(a, b);
    assert_eq!(source.begun().len(), 1);
    assert_eq!(cache.in_flight(), 2);

    let resolved = cache.pump(&mut source);
    assert_eq!(resolved.len(), 2);
    let handles: Vec<u64> = resolved
        .iter()
        .map(|r| r.result.as_ref().unwrap().handle)
        .collect();
    assert_eq!(handles[0], handles[1], "waiters share one result");
    assert_eq!(cache.in_flight(), 0);
    assert!(cache.is_cached(&model));

    let c = cache.acquire(&mut source, &model).unwrap();
    assert_eq!(source.begun().len(), 1, "cached models are not reloaded");
    let resolved = cache.pump(&mut source);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].ticket, c);
    assert!(resolved[0].result.is_ok());
}

#[test]
fn test_cache_respects_in_flight_cap() {
    let mut source = ScriptedAssetSource::new(5);
    let mut cache = AssetCache::new(2);
    assert!(cache.acquire(&mut source, &ModelId::new("a")).is_some());
    assert!(cache.acquire(&mut source, &ModelId::new("b")).is_some());
    assert!(cache.acquire(&mut source, &ModelId::new("c")).is_none());
    assert!(!cache.has_capacity());
    assert_eq!(source.begun().len(), 2);
}

#[test]
fn test_cache_latency_in_polls() {
    let model = ModelId::new("slow");
    let mut source = ScriptedAssetSource::new(2);
    let mut cache = AssetCache::new(1);
    cache.acquire(&mut source, &model).unwrap();
    assert!(cache.pump(&mut source).is_empty());
    assert!(cache.pump(&mut source).is_empty());
    assert_eq!(cache.pump(&mut source).len(), 1);
}

#[test]
fn test_cache_does_not_memoize_failures() {
    let model = ModelId::new("broken");
    let mut source = ScriptedAssetSource::new(0);
    source.fail_model(model.clone());
    let mut cache = AssetCache::new(2);

    cache.acquire(&mut source, &model).unwrap();
    let resolved = cache.pump(&mut source);
    assert!(resolved[0].result.is_err());
    assert!(!cache.is_cached(&model));
    assert_eq!(cache.in_flight(), 0);

    source.clear_failures();
    cache.acquire(&mut source, &model).unwrap();
    assert_eq!(source.begun().len(), 2, "failed model is retried");
    assert!(cache.pump(&mut source)[0].result.is_ok());
    assert_eq!(cache.loads_started(), 2);
}

// ---- Slot pool ----

fn test_constraints(live: &[DVec3]) -> SlotConstraints<'_> {
    SlotConstraints {
        weapon_position: DVec3::new(0.0, 10.0, 20.0),
        min_weapon_distance: 8.0,
        shield_center: DVec3::ZERO,
        forward: DVec3::Z,
        cone_half_angle: 1.745,
        relaxed_cone_half_angle: 2.443,
        relaxation_elevation: 6.0,
        min_separation: 6.0,
        live_positions: live,
    }
}

#[test]
fn test_slot_filter() {
    let pool = SlotPool::from_positions([
        DVec3::new(0.0, 0.0, 15.0),    // in front
        DVec3::new(0.0, 0.0, -15.0),   // behind, low
        DVec3::new(10.0, 7.0, -10.0),  // 135 degrees, elevated
        DVec3::new(10.0, 2.0, -10.0),  // 135 degrees, low
        DVec3::new(0.0, 10.0, 18.0),   // next to the weapon
    ]);
    assert_eq!(pool.candidates(&test_constraints(&[])), vec![0, 2]);

    let live = [DVec3::new(0.0, 0.0, 13.0)];
    assert_eq!(pool.candidates(&test_constraints(&live)), vec![2]);
}

#[test]
fn test_slot_reserve_release() {
    let mut pool = SlotPool::from_positions([DVec3::new(0.0, 0.0, 15.0)]);
    assert!(pool.reserve(0));
    assert!(!pool.reserve(0));
    assert!(!pool.reserve(7));
    assert!(pool.candidates(&test_constraints(&[])).is_empty());
    pool.release(0);
    assert!(pool.reserve(0));
    pool.release_all();
    assert_eq!(pool.occupied_count(), 0);
}

#[test]
fn test_grid_layout_size() {
    let pool = SlotPool::grid(DVec3::ZERO, 20.0, &[0.2, 0.5, 0.8], 8);
    assert_eq!(pool.len(), 24);
    for slot in pool.iter() {
        assert!((slot.position.length() - 20.0).abs() < 1e-9);
    }
}

// ---- Ship motion ----

#[test]
fn test_move_pause_schedule_drift_and_bob() {
    let config = CombatConfig::default();
    let ships = &config.ships;
    let anchor = DVec3::new(0.0, 8.0, 25.0);
    let dt = 1.0 / 60.0;
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut world = hecs::World::new();
    let entity = world.spawn((
        Lifecycle {
            state: LifecycleState::Alive,
        },
        Movement {
            phase: MovePhase::Paused,
            phase_remaining: dt / 2.0,
            velocity: DVec3::ZERO,
            anchor,
            drift: DVec3::ZERO,
            bob_phase: 0.0,
        },
        Transform {
            position: anchor,
            orientation: DQuat::IDENTITY,
        },
    ));

    let mut phase = MovePhase::Paused;
    let mut frames_in_phase = 0u32;
    let mut completed = Vec::new();
    let mut paused_heights: Vec<f64> = Vec::new();
    let mut first_switch_seen = false;

    for _ in 0..6000 {
        let bob_before = world.get::<&Movement>(entity).unwrap().bob_phase;
        movement::run(&mut world, ships, config.shield.center, &mut rng, dt);
        frames_in_phase += 1;

        let movement = *world.get::<&Movement>(entity).unwrap();
        let position = world.get::<&Transform>(entity).unwrap().position;
        assert_ne!(movement.bob_phase, bob_before, "bob runs in both phases");
        assert!(
            movement.drift.length() <= ships.max_drift + 1e-9,
            "drift {} left the envelope",
            movement.drift.length()
        );

        if movement.phase != phase {
            if first_switch_seen {
                completed.push((phase, f64::from(frames_in_phase) * dt));
                if phase == MovePhase::Paused {
                    let (lo, hi) = paused_heights
                        .iter()
                        .fold((f64::MAX, f64::MIN), |(lo, hi), y| (lo.min(*y), hi.max(*y)));
                    assert!(hi - lo > 0.01, "no bob while paused");
                }
            }
            first_switch_seen = true;
            phase = movement.phase;
            frames_in_phase = 0;
            paused_heights.clear();
        } else if movement.phase == MovePhase::Paused {
            paused_heights.push(position.y);
        }
    }

    assert!(completed.len() > 10, "only {} phases completed", completed.len());
    for (phase, secs) in &completed {
        let range = match phase {
            MovePhase::Moving => ships.move_phase,
            MovePhase::Paused => ships.pause_phase,
        };
        assert!(
            *secs >= range.min - 1e-9 && *secs <= range.max + dt + 1e-9,
            "{phase:?} lasted {secs}s"
        );
    }
    assert!(completed.iter().any(|(p, _)| *p == MovePhase::Moving));
    assert!(completed.iter().any(|(p, _)| *p == MovePhase::Paused));
}

#[test]
fn test_death_fall_accelerates_and_spins() {
    let mut engine = make_engine(quiet_config(), 0);
    let (entity, node) = engine.spawn_alive_ship(ShipType::Light).unwrap();
    shoot_down(&mut engine, node);

    let dt = FRAME_MS / 1000.0;
    let mut previous = *engine.world().get::<&Fall>(entity).unwrap();
    let mut previous_y = engine.world().get::<&Transform>(entity).unwrap().position.y;
    let mut frames = 0u32;

    loop {
        engine.advance(FRAME_MS);
        let Ok(fall) = engine.world().get::<&Fall>(entity).map(|fall| *fall) else {
            break;
        };
        frames += 1;
        let y = engine.world().get::<&Transform>(entity).unwrap().position.y;

        assert!(fall.speed > previous.speed, "fall speed must grow every frame");
        assert!(y < previous_y, "wreck must keep dropping");
        let expected_spin = fall.spin_rate * (f64::from(frames) * dt);
        assert!((fall.spin - expected_spin).length() < 1e-9);

        previous = fall;
        previous_y = y;
        assert!(frames < 10_000, "wreck never left the world");
    }

    assert!(frames > 10);
    assert!(!engine.world().contains(entity));
}

// ---- Properties ----

proptest! {
    #[test]
    fn prop_in_flight_never_exceeds_cap(cap in 1usize..=4, extra in 0usize..=5, seed in any::<u64>()) {
        let mut config = quiet_config();
        config.seed = seed;
        config.spawn.max_concurrent_loads = cap;
        config.spawn.max_active_ships = 10;
        let mut engine = make_engine(config, 1000);

        for _ in 0..cap + extra {
            engine.try_spawn();
            prop_assert!(engine.in_flight_loads() <= cap);
        }
        prop_assert_eq!(engine.in_flight_loads(), cap);
        prop_assert_eq!(engine.slots().occupied_count(), cap);
    }

    #[test]
    fn prop_ship_health_stays_clamped(damage in 0.5f64..100.0, hits in 1usize..12) {
        let mut config = quiet_config();
        config.ships.player_hit_damage = damage;
        let mut engine = make_engine(config, 0);
        let (entity, node) = engine.spawn_alive_ship(ShipType::Heavy).unwrap();

        for _ in 0..hits {
            engine.apply_player_damage(node);
            let health = *engine.world().get::<&Health>(entity).unwrap();
            prop_assert!(health.current >= 0.0 && health.current <= health.max);
        }
    }

    #[test]
    fn prop_shield_health_stays_clamped(amounts in prop::collection::vec(-20.0f64..60.0, 1..30)) {
        let mut shield = Shield::new(&ShieldConfig::default());
        let mut destroyed = false;
        for amount in amounts {
            shield.take_damage(amount);
            prop_assert!(shield.health() >= 0.0 && shield.health() <= shield.max_health());
            prop_assert!(!destroyed || shield.is_destroyed());
            destroyed = shield.is_destroyed();
        }
    }
}
