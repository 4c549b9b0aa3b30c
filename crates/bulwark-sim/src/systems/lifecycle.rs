//! Ship lifecycle transitions driven by damage, plus the death fall.

use std::collections::HashMap;

use glam::{DQuat, EulerRot};
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use bulwark_core::components::*;
use bulwark_core::config::ShipConfig;
use bulwark_core::constants::MAX_PARENT_WALK;
use bulwark_core::enums::LifecycleState;
use bulwark_core::events::CombatEvent;
use bulwark_core::types::{NodeId, ShipId};

use crate::context::SimContext;
use crate::scene::SceneGraph;
use crate::world_setup;

/// Result of a player hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// No Alive ship behind the node (unknown, stale, or not Alive).
    Ignored,
    Damaged { ship: ShipId, health: f64 },
    /// The hit took the ship to zero; it is now Dying.
    Downed { ship: ShipId },
}

/// Map a hit-tested node to the ship that owns it.
///
/// Renderers may report any sub-part of a model, so parent links are walked
/// up to a bounded depth until a ship root is found.
pub fn resolve_target(
    scene: &impl SceneGraph,
    node_index: &HashMap<NodeId, Entity>,
    node: NodeId,
) -> Option<Entity> {
    let mut current = node;
    for _ in 0..=MAX_PARENT_WALK {
        if let Some(entity) = node_index.get(&current) {
            return Some(*entity);
        }
        current = scene.parent_of(current)?;
    }
    None
}

/// Player hit on a scene node: the fixed per-hit damage to its ship.
pub fn apply_player_damage(
    ctx: &mut SimContext,
    scene: &mut impl SceneGraph,
    node: NodeId,
) -> HitOutcome {
    let Some(entity) = resolve_target(&*scene, &ctx.node_index, node) else {
        return HitOutcome::Ignored;
    };
    let amount = ctx.config.ships.player_hit_damage;
    damage_ship(ctx, scene, entity, amount)
}

/// Subtract `amount` from an Alive ship and take it down at zero.
pub fn damage_ship(
    ctx: &mut SimContext,
    scene: &mut impl SceneGraph,
    entity: Entity,
    amount: f64,
) -> HitOutcome {
    if !amount.is_finite() || amount <= 0.0 {
        return HitOutcome::Ignored;
    }

    let (ship, health) = {
        let Ok((ship, health, lifecycle)) = ctx
            .world
            .query_one_mut::<(&Ship, &mut Health, &Lifecycle)>(entity)
        else {
            return HitOutcome::Ignored;
        };
        if lifecycle.state != LifecycleState::Alive {
            return HitOutcome::Ignored;
        }
        health.current = (health.current - amount).clamp(0.0, health.max);
        (*ship, health.current)
    };

    ctx.events.push(CombatEvent::ShipHit {
        ship: ship.id,
        health,
    });

    if health <= 0.0 {
        begin_dying(ctx, scene, entity);
        HitOutcome::Downed { ship: ship.id }
    } else {
        HitOutcome::Damaged {
            ship: ship.id,
            health,
        }
    }
}

/// Alive -> Dying: tear down the attack, stop drifting, start falling.
fn begin_dying(ctx: &mut SimContext, scene: &mut impl SceneGraph, entity: Entity) {
    let Ok(ship) = ctx.world.get::<&Ship>(entity).map(|ship| *ship) else {
        return;
    };

    if let Ok(attack) = ctx.world.remove_one::<AttackState>(entity) {
        if let Some(beam) = attack.beam() {
            scene.release_beam(beam);
            ctx.events.push(CombatEvent::BeamStopped { ship: ship.id });
        }
    }
    let _ = ctx.world.remove_one::<Movement>(entity);

    let base_orientation = ctx
        .world
        .get::<&Transform>(entity)
        .map(|transform| transform.orientation)
        .unwrap_or(DQuat::IDENTITY);
    let fall = Fall {
        speed: ctx.config.ships.fall_initial_speed,
        spin_rate: world_setup::random_spin(ctx.config.ships.fall_spin_max, &mut ctx.rng),
        spin: glam::DVec3::ZERO,
        base_orientation,
    };
    let _ = ctx.world.insert_one(entity, fall);
    if let Ok(mut lifecycle) = ctx.world.get::<&mut Lifecycle>(entity) {
        lifecycle.state = LifecycleState::Dying;
    }
    if let Ok(renderable) = ctx.world.get::<&Renderable>(entity) {
        ctx.node_index.remove(&renderable.node);
    }

    ctx.events.push(CombatEvent::ShipDowned {
        ship: ship.id,
        ship_type: ship.ship_type,
    });
    tracing::info!(ship = %ship.id, ship_type = ?ship.ship_type, "ship shot down");
}

/// Dying ships fall and tumble; past the depth threshold they are Removed.
pub fn update_dying(world: &mut World, config: &ShipConfig, dt: f64) {
    for (_entity, (transform, fall, lifecycle)) in
        world.query_mut::<(&mut Transform, &mut Fall, &mut Lifecycle)>()
    {
        if lifecycle.state != LifecycleState::Dying {
            continue;
        }
        transform.position.y -= fall.speed * dt;
        fall.speed += config.fall_gravity * dt;
        fall.spin += fall.spin_rate * dt;
        transform.orientation = fall.base_orientation
            * DQuat::from_euler(EulerRot::XYZ, fall.spin.x, fall.spin.y, fall.spin.z);

        if transform.position.y < config.death_depth {
            lifecycle.state = LifecycleState::Removed;
        }
    }
}
