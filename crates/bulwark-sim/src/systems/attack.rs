//! Attack system: runs each Alive ship's attack FSM and applies its effects.
//!
//! The FSM in `bulwark-attack` is pure; this system owns the side effects:
//! requesting and releasing beam visuals, shield damage and the hit flash.

use glam::DVec3;
use hecs::Entity;

use bulwark_attack::fsm::{self, AttackContext, AttackTransition};
use bulwark_core::components::*;
use bulwark_core::enums::{LifecycleState, MovePhase, ShipType};
use bulwark_core::events::CombatEvent;
use bulwark_core::types::ShipId;

use crate::context::SimContext;
use crate::scene::SceneGraph;

struct Attacker {
    entity: Entity,
    id: ShipId,
    ship_type: ShipType,
    is_alive: bool,
    is_moving: bool,
    position: DVec3,
    state: AttackState,
}

pub fn run(ctx: &mut SimContext, scene: &mut impl SceneGraph, dt: f64) {
    let attackers: Vec<Attacker> = ctx
        .world
        .query::<(&Ship, &Lifecycle, &Movement, &Transform, &AttackState)>()
        .iter()
        .map(|(entity, (ship, lifecycle, movement, transform, state))| Attacker {
            entity,
            id: ship.id,
            ship_type: ship.ship_type,
            is_alive: lifecycle.state == LifecycleState::Alive,
            is_moving: movement.phase == MovePhase::Moving,
            position: transform.position,
            state: *state,
        })
        .collect();

    for attacker in attackers {
        let step = fsm::evaluate(
            &AttackContext {
                state: attacker.state,
                ship_type: attacker.ship_type,
                is_alive: attacker.is_alive,
                is_moving: attacker.is_moving,
                dt,
            },
            &ctx.config.attack,
            &mut ctx.rng,
        );

        if let Some(beam) = step.release_beam {
            scene.release_beam(beam);
            ctx.events.push(CombatEvent::BeamStopped { ship: attacker.id });
            tracing::debug!(ship = %attacker.id, "beam stopped");
        }

        if step.shield_damage > 0.0 && ctx.shield.take_damage(step.shield_damage) {
            ctx.events.push(CombatEvent::ShieldDestroyed);
            tracing::info!(ship = %attacker.id, "shield destroyed");
        }

        let next = match step.transition {
            AttackTransition::Stay(state) => state,
            AttackTransition::Engage => {
                // Nothing left to shoot at once the dome is down.
                let beam = if ctx.shield.is_destroyed() {
                    None
                } else {
                    scene.request_beam(attacker.position, ctx.shield.center())
                };
                if beam.is_some() {
                    ctx.shield.trigger_hit_flash();
                    ctx.events.push(CombatEvent::BeamStarted { ship: attacker.id });
                    tracing::debug!(ship = %attacker.id, "beam started");
                }
                fsm::engage(beam, &ctx.config.attack, &mut ctx.rng)
            }
        };

        if let Ok(mut state) = ctx.world.get::<&mut AttackState>(attacker.entity) {
            *state = next;
        }
    }
}
