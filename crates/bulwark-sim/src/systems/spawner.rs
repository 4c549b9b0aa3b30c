//! Spawn system: slot reservation, model requests and load resolution.
//!
//! A spawn attempt reserves a slot and requests the ship's model in one step.
//! The ship stays Loading until the asset cache resolves its ticket on a
//! later frame.

use hecs::Entity;
use rand::seq::SliceRandom;

use bulwark_attack::profiles::{model_id, pick_ship_type};
use bulwark_core::components::*;
use bulwark_core::enums::LifecycleState;
use bulwark_core::error::AssetError;
use bulwark_core::events::CombatEvent;
use bulwark_core::types::{ModelTemplate, NodeId, ShipId};

use crate::assets::{AssetSource, LoadResolution};
use crate::context::{PendingSpawn, SimContext};
use crate::scene::SceneGraph;
use crate::world_setup;

/// True while another ship may be requested.
pub fn has_capacity(ctx: &SimContext) -> bool {
    let in_flight = ctx.assets.in_flight();
    ctx.alive_count() + in_flight < ctx.config.spawn.max_active_ships && ctx.assets.has_capacity()
}

/// Attempt to create one ship. Silent no-op when a cap is reached or no slot
/// passes the geometric filter.
pub fn try_spawn(ctx: &mut SimContext, source: &mut impl AssetSource) -> Option<ShipId> {
    if !has_capacity(ctx) {
        return None;
    }

    let live = ctx.live_positions();
    let candidates = ctx.slots.candidates(&ctx.slot_constraints(&live));
    let slot = *candidates.choose(&mut ctx.rng)?;
    let position = ctx.slots.get(slot)?.position;
    if !ctx.slots.reserve(slot) {
        return None;
    }

    let ship_type = pick_ship_type(&mut ctx.rng);
    let id = ctx.next_ship_id();
    let entity = world_setup::spawn_reserved_ship(
        &mut ctx.world,
        id,
        ship_type,
        slot,
        position,
        ctx.config.shield.center,
    );
    ctx.events.push(CombatEvent::ShipReserved { ship: id, ship_type });

    let model = model_id(ship_type);
    let cached = ctx.assets.is_cached(&model);
    let Some(ticket) = ctx.assets.acquire(source, &model) else {
        ctx.slots.release(slot);
        let _ = ctx.world.despawn(entity);
        return None;
    };

    let _ = ctx.world.insert_one(entity, PendingLoad { ticket, model });
    if let Ok(mut lifecycle) = ctx.world.get::<&mut Lifecycle>(entity) {
        lifecycle.state = LifecycleState::Loading;
    }
    ctx.spawn.pending.insert(
        ticket,
        PendingSpawn {
            entity,
            session: ctx.session,
        },
    );
    ctx.score.ships_spawned += 1;

    tracing::debug!(ship = %id, ?ship_type, slot, ticket = ticket.0, cached, "ship reserved");
    Some(id)
}

/// Keep the active count inside the configured band.
///
/// Tops up while below the minimum, then makes one extra attempt whenever
/// the periodic spawn timer has elapsed.
pub fn spawn_if_needed(ctx: &mut SimContext, source: &mut impl AssetSource) {
    while ctx.alive_count() + ctx.assets.in_flight() < ctx.config.spawn.min_active_ships {
        if try_spawn(ctx, source).is_none() {
            break;
        }
    }

    if ctx.spawn.timer <= 0.0 {
        try_spawn(ctx, source);
        ctx.spawn.timer = ctx.config.spawn.spawn_interval_secs;
    }
}

/// Apply load resolutions from the asset cache.
///
/// Resolutions for tickets from an earlier session, or for ships that are
/// gone, are dropped.
pub fn resolve_loads(
    ctx: &mut SimContext,
    scene: &mut impl SceneGraph,
    resolutions: Vec<LoadResolution>,
) {
    for resolution in resolutions {
        let Some(pending) = ctx.spawn.pending.remove(&resolution.ticket) else {
            continue;
        };
        if pending.session != ctx.session {
            tracing::debug!(
                ticket = resolution.ticket.0,
                model = %resolution.model,
                "discarding load from an abandoned session"
            );
            continue;
        }
        let still_loading = ctx
            .world
            .get::<&Lifecycle>(pending.entity)
            .map(|lifecycle| lifecycle.state == LifecycleState::Loading)
            .unwrap_or(false);
        if !still_loading {
            continue;
        }

        match resolution.result {
            Ok(template) => {
                make_alive(ctx, scene, pending.entity, &template);
            }
            Err(error) => fail_load(ctx, pending.entity, error),
        }
    }
}

/// Attach the model and bring a Loading ship into play.
pub(crate) fn make_alive(
    ctx: &mut SimContext,
    scene: &mut impl SceneGraph,
    entity: Entity,
    template: &ModelTemplate,
) -> Option<NodeId> {
    let ship = *ctx.world.get::<&Ship>(entity).ok()?;
    let position = ctx.world.get::<&Transform>(entity).ok()?.position;
    let orientation = world_setup::facing(position, ctx.config.shield.center);

    let node = scene.attach(template, position, orientation);
    let (movement, attack) = world_setup::alive_components(position, &ctx.config, &mut ctx.rng);

    if ctx
        .world
        .insert(
            entity,
            (
                Renderable { node },
                movement,
                attack,
                Transform {
                    position,
                    orientation,
                },
            ),
        )
        .is_err()
    {
        scene.remove(node);
        return None;
    }
    let _ = ctx.world.remove_one::<PendingLoad>(entity);
    if let Ok(mut lifecycle) = ctx.world.get::<&mut Lifecycle>(entity) {
        lifecycle.state = LifecycleState::Alive;
    }
    ctx.node_index.insert(node, entity);
    ctx.events.push(CombatEvent::ShipArrived {
        ship: ship.id,
        ship_type: ship.ship_type,
    });

    tracing::debug!(ship = %ship.id, node = node.0, "ship arrived");
    Some(node)
}

/// Release the reservation of a ship whose model could not be loaded.
fn fail_load(ctx: &mut SimContext, entity: Entity, error: AssetError) {
    let ship = ctx.world.get::<&Ship>(entity).ok().map(|ship| ship.id);
    let slot = ctx.world.get::<&SlotRef>(entity).ok().map(|slot| slot.0);

    if let Some(slot) = slot {
        ctx.slots.release(slot);
    }
    let _ = ctx.world.despawn(entity);
    ctx.score.loads_failed += 1;

    tracing::warn!(ship = ?ship, %error, "ship model failed to load; reservation released");
    if let Some(ship) = ship {
        ctx.events.push(CombatEvent::ShipLoadFailed {
            ship,
            model: error.model().clone(),
        });
    }
}
