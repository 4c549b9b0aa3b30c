//! Cleanup system: reaps Removed ships.

use hecs::Entity;

use bulwark_core::components::{Lifecycle, Renderable, Ship, SlotRef};
use bulwark_core::enums::{LifecycleState, ShipType};
use bulwark_core::events::CombatEvent;

use crate::context::SimContext;
use crate::scene::SceneGraph;

/// Release slots, score kills, drop scene nodes and despawn every Removed
/// ship. Returns the types of the ships reaped, for the destroyed hook.
pub fn run(
    ctx: &mut SimContext,
    scene: &mut impl SceneGraph,
    despawn_buffer: &mut Vec<Entity>,
) -> Vec<ShipType> {
    despawn_buffer.clear();
    let mut reaped = Vec::new();

    for (entity, (ship, lifecycle, slot, renderable)) in ctx
        .world
        .query::<(&Ship, &Lifecycle, &SlotRef, Option<&Renderable>)>()
        .iter()
    {
        if lifecycle.state != LifecycleState::Removed {
            continue;
        }
        ctx.slots.release(slot.0);
        ctx.score.record_kill(ship.ship_type, ship.points);
        if let Some(renderable) = renderable {
            scene.remove(renderable.node);
            ctx.node_index.remove(&renderable.node);
        }
        ctx.events.push(CombatEvent::ShipDestroyed {
            ship: ship.id,
            ship_type: ship.ship_type,
            points: ship.points,
        });
        tracing::info!(ship = %ship.id, points = ship.points, "ship destroyed");

        reaped.push(ship.ship_type);
        despawn_buffer.push(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = ctx.world.despawn(entity);
    }
    reaped
}
