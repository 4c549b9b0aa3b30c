//! Alive-ship movement: move/pause schedule, bounded drift, bob.

use std::f64::consts::TAU;

use glam::DVec3;
use hecs::World;
use rand::Rng;

use bulwark_core::components::{Lifecycle, Movement, Transform};
use bulwark_core::config::ShipConfig;
use bulwark_core::enums::{LifecycleState, MovePhase};

use crate::world_setup;

/// Advance every Alive ship's schedule and place it.
pub fn run(world: &mut World, config: &ShipConfig, shield_center: DVec3, rng: &mut impl Rng, dt: f64) {
    for (_entity, (lifecycle, movement, transform)) in
        world.query_mut::<(&Lifecycle, &mut Movement, &mut Transform)>()
    {
        if lifecycle.state != LifecycleState::Alive {
            continue;
        }

        movement.phase_remaining -= dt;
        if movement.phase_remaining <= 0.0 {
            switch_phase(movement, config, rng);
        }

        if movement.phase == MovePhase::Moving {
            let next = movement.drift + movement.velocity * dt;
            if next.length() > config.max_drift {
                // Turn back at the edge of the drift envelope.
                movement.velocity = -movement.velocity;
                movement.drift = movement.drift.clamp_length_max(config.max_drift);
            } else {
                movement.drift = next;
            }
        }

        movement.bob_phase = (movement.bob_phase + config.bob_rate * dt) % TAU;
        let bob = DVec3::new(0.0, config.bob_amplitude * movement.bob_phase.sin(), 0.0);

        transform.position = movement.anchor + movement.drift + bob;
        transform.orientation = world_setup::facing(transform.position, shield_center);
    }
}

fn switch_phase(movement: &mut Movement, config: &ShipConfig, rng: &mut impl Rng) {
    match movement.phase {
        MovePhase::Moving => {
            movement.phase = MovePhase::Paused;
            movement.phase_remaining = world_setup::roll(config.pause_phase, rng);
            movement.velocity = DVec3::ZERO;
        }
        MovePhase::Paused => {
            movement.phase = MovePhase::Moving;
            movement.phase_remaining = world_setup::roll(config.move_phase, rng);
            movement.velocity = world_setup::new_drift_velocity(config, rng);
        }
    }
}
