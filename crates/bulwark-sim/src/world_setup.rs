//! Spawn factories and shared setup helpers.
//!
//! Each factory establishes every component invariant for the state it
//! creates, so systems never need to patch in defaults.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use hecs::{Entity, World};
use rand::Rng;

use bulwark_attack::fsm;
use bulwark_attack::profiles::get_profile;
use bulwark_core::components::*;
use bulwark_core::config::{CombatConfig, SecondsRange, ShipConfig};
use bulwark_core::enums::{LifecycleState, MovePhase, ShipType};
use bulwark_core::types::ShipId;

use crate::slots::SlotPool;

/// Build the engine's slot pool from the configured layout.
pub fn build_slot_pool(config: &CombatConfig, rng: &mut impl Rng) -> SlotPool {
    SlotPool::from_layout(&config.spawn.layout, config.shield.center, rng)
}

/// Spawn a ship entity that holds `slot` but has no model yet.
pub fn spawn_reserved_ship(
    world: &mut World,
    id: ShipId,
    ship_type: ShipType,
    slot: usize,
    position: DVec3,
    shield_center: DVec3,
) -> Entity {
    let profile = get_profile(ship_type);
    world.spawn((
        Ship {
            id,
            ship_type,
            points: profile.points,
        },
        Health {
            current: profile.max_health,
            max: profile.max_health,
        },
        Lifecycle {
            state: LifecycleState::Reserved,
        },
        SlotRef(slot),
        Transform {
            position,
            orientation: facing(position, shield_center),
        },
    ))
}

/// Orientation whose local +Z points from `from` toward `target`.
pub fn facing(from: DVec3, target: DVec3) -> DQuat {
    let direction = (target - from).normalize_or_zero();
    if direction == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    DQuat::from_rotation_arc(DVec3::Z, direction)
}

/// Movement and attack components for a ship that just became Alive.
///
/// Ships arrive holding still, so the first attack can land before the
/// first drift.
pub fn alive_components(
    anchor: DVec3,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> (Movement, AttackState) {
    let movement = Movement {
        phase: MovePhase::Paused,
        phase_remaining: roll(config.ships.pause_phase, rng),
        velocity: DVec3::ZERO,
        anchor,
        drift: DVec3::ZERO,
        bob_phase: rng.gen_range(0.0..TAU),
    };
    (movement, fsm::initial_state(&config.attack, rng))
}

/// Random drift velocity for a new move phase.
pub fn new_drift_velocity(config: &ShipConfig, rng: &mut impl Rng) -> DVec3 {
    let heading = rng.gen_range(0.0..TAU);
    let climb: f64 = rng.gen_range(-1.0..=1.0);
    DVec3::new(
        heading.sin() * config.drift_speed_horizontal,
        climb * config.drift_speed_vertical,
        heading.cos() * config.drift_speed_horizontal,
    )
}

/// Per-axis spin rates for a falling wreck.
pub fn random_spin(max: f64, rng: &mut impl Rng) -> DVec3 {
    if max <= 0.0 {
        return DVec3::ZERO;
    }
    DVec3::new(
        rng.gen_range(-max..=max),
        rng.gen_range(-max..=max),
        rng.gen_range(-max..=max),
    )
}

/// Uniform draw from a closed range; degenerate ranges return `min`.
pub fn roll(range: SecondsRange, rng: &mut impl Rng) -> f64 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}
